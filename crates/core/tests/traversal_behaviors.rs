//! Traversal Behavioral Tests - BDD Style
//!
//! Following BDD naming convention: given_<context>_when_<action>_then_<outcome>

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use flowviz_core::{Algorithm, Error, Graph, NodeId, NodeState, record_bfs, record_dfs};

const A: NodeId = 0;
const B: NodeId = 1;
const C: NodeId = 2;
const D: NodeId = 3;

fn chain_with_isolated_node() -> Graph {
    //   A --> B --> C      D
    let mut graph = Graph::new();
    for id in [A, B, C, D] {
        graph.add_node(id).expect("Should add node");
    }
    graph.add_edge(A, B, 1.0).expect("Should add A->B");
    graph.add_edge(B, C, 1.0).expect("Should add B->C");
    graph
}

// ============================================================================
// ORDERING
// ============================================================================

#[test]
fn given_chain_when_bfs_from_a_then_order_is_a_b_c() {
    // GIVEN: A -> B -> C
    let graph = chain_with_isolated_node();

    // WHEN: BFS starts at A
    let trace = record_bfs(&graph, A).expect("BFS should succeed");

    // THEN: Nodes become current in chain order
    assert_eq!(trace.order(), vec![A, B, C]);
    assert_eq!(trace.algorithm(), Algorithm::Bfs);
    assert_eq!(trace.start(), A);
}

#[test]
fn given_chain_when_dfs_from_a_then_order_is_a_b_c() {
    let graph = chain_with_isolated_node();

    let trace = record_dfs(&graph, A).expect("DFS should succeed");

    assert_eq!(trace.order(), vec![A, B, C]);
    assert_eq!(trace.algorithm(), Algorithm::Dfs);
}

#[test]
fn given_binary_tree_when_traversed_then_bfs_is_level_order_and_dfs_is_preorder() {
    //        0
    //      /   \
    //     1     2
    //    / \   / \
    //   3   4 5   6
    let mut graph = Graph::new();
    for id in 0..7 {
        graph.add_node(id).expect("Should add node");
    }
    for (from, to) in [(0, 1), (0, 2), (1, 3), (1, 4), (2, 5), (2, 6)] {
        graph.add_edge(from, to, 1.0).expect("Should add edge");
    }

    assert_eq!(record_bfs(&graph, 0).unwrap().order(), vec![0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(record_dfs(&graph, 0).unwrap().order(), vec![0, 1, 3, 4, 2, 5, 6]);
}

// ============================================================================
// UNREACHABLE NODES
// ============================================================================

#[test]
fn given_isolated_node_when_traversed_then_it_never_becomes_current() {
    // GIVEN: D has no edges
    let graph = chain_with_isolated_node();

    for algorithm in Algorithm::ALL {
        // WHEN: Traversal starts at A
        let trace = algorithm.record(&graph, A).expect("Traversal should succeed");

        // THEN: D never appears as current, visited or frontier
        assert!(!trace.order().contains(&D), "{algorithm}: D must not be current");
        for step in &trace {
            assert_eq!(step.state_of(D), NodeState::Unvisited);
            assert!(!step.visited().contains(&D));
            assert!(!step.frontier().contains(&D));
        }
    }
}

#[test]
fn given_start_downstream_when_traversed_then_upstream_nodes_stay_unvisited() {
    let graph = chain_with_isolated_node();

    let trace = record_bfs(&graph, B).expect("BFS should succeed");

    assert_eq!(trace.order(), vec![B, C]);
    let last = trace.steps().last().expect("Trace should not be empty");
    assert_eq!(last.state_of(A), NodeState::Unvisited);
    assert_eq!(last.state_of(B), NodeState::Visited);
    assert_eq!(last.state_of(C), NodeState::Current);
}

// ============================================================================
// STEP SNAPSHOTS
// ============================================================================

#[test]
fn given_fan_out_when_bfs_then_frontier_holds_queue_in_id_order() {
    //   0 -> 3, 0 -> 1, 0 -> 2
    let mut graph = Graph::new();
    for id in 0..4 {
        graph.add_node(id).expect("Should add node");
    }
    for to in [3, 1, 2] {
        graph.add_edge(0, to, 1.0).expect("Should add edge");
    }

    let trace = record_bfs(&graph, 0).expect("BFS should succeed");

    let frontier: Vec<NodeId> = trace.steps()[0].frontier().iter().copied().collect();
    assert_eq!(frontier, vec![1, 2, 3]);
}

#[test]
fn given_fan_out_when_dfs_then_stack_top_is_smallest_id() {
    let mut graph = Graph::new();
    for id in 0..4 {
        graph.add_node(id).expect("Should add node");
    }
    for to in [1, 2, 3] {
        graph.add_edge(0, to, 1.0).expect("Should add edge");
    }

    let trace = record_dfs(&graph, 0).expect("DFS should succeed");

    let stack: Vec<NodeId> = trace.steps()[0].frontier().iter().copied().collect();
    assert_eq!(stack, vec![3, 2, 1]);
    assert_eq!(trace.steps()[1].current(), 1);
}

#[test]
fn given_recorded_trace_when_inspecting_steps_then_indices_are_sequential_and_final_frontier_empty() {
    let graph = chain_with_isolated_node();

    for algorithm in Algorithm::ALL {
        let trace = algorithm.record(&graph, A).expect("Traversal should succeed");

        for (expected, step) in trace.steps().iter().enumerate() {
            assert_eq!(step.index(), expected);
            assert_eq!(step.visited().len(), expected + 1);
        }
        let last = trace.steps().last().expect("Trace should not be empty");
        assert!(last.frontier().is_empty());
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn given_graph_when_start_missing_then_input_error() {
    let graph = chain_with_isolated_node();

    assert_eq!(record_bfs(&graph, 42).err(), Some(Error::NodeNotFound(42)));
    assert_eq!(record_dfs(&graph, 42).err(), Some(Error::NodeNotFound(42)));
}

#[test]
fn given_single_node_when_traversed_then_one_step() {
    let mut graph = Graph::new();
    graph.add_node(7).expect("Should add node");

    for algorithm in Algorithm::ALL {
        let trace = algorithm.record(&graph, 7).expect("Traversal should succeed");
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.order(), vec![7]);
    }
}
