//! # flowviz-core
//!
//! Graph model and algorithms behind flowviz: random graph generation, BFS/DFS
//! traversal recording, and Ford–Fulkerson maximum flow.
//!
//! Data flows one way: a [`Graph`] is generated or built once, then shared read-only
//! by every traversal or flow run, each of which owns its own recorded history.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod builder;
pub mod error;
pub mod flow;
pub mod generator;
pub mod graph;
pub mod metrics;
pub mod traversal;

pub use builder::{GraphBuilder, example_flow_network, random_flow_network};
pub use error::{Error, Result};
pub use flow::{
    Augmentation, EdgeFlow, FlowNetwork, FlowRun, PathSearch, max_flow,
    max_flow_between_terminals, terminals,
};
pub use generator::{GeneratorConfig, generate, generate_with_rng};
pub use graph::{Edge, Graph, NodeId, NodeKind};
pub use metrics::{MetricsTracker, SearchMetrics};
pub use traversal::{Algorithm, NodeState, Trace, TraversalStep, record_bfs, record_dfs};
