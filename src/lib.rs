#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # flowviz
//!
//! Animated BFS/DFS traversals and max-flow runs over generated graphs.
//!
//! The graph model and algorithms live in [`flowviz_core`], drawing and GIF export
//! in [`flowviz_render`]. This crate wires them into a configurable pipeline and CLI.

pub use flowviz_core;
pub use flowviz_render;

pub mod cli;
pub mod commands;
pub mod compare;
pub mod config;
pub mod pipeline;
