//! Colours for node states, flow roles and chrome.

use flowviz_core::{NodeKind, NodeState};
use image::Rgba;

pub type Color = Rgba<u8>;

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Rgba([r, g, b, 255])
}

pub const BACKGROUND: Color = rgb(255, 255, 255);
pub const TEXT: Color = rgb(20, 20, 20);
pub const NODE_OUTLINE: Color = rgb(60, 60, 60);
pub const EDGE: Color = rgb(150, 150, 150);
pub const EDGE_LABEL: Color = rgb(70, 70, 70);

pub const CURRENT: Color = rgb(220, 40, 40);
pub const FRONTIER: Color = rgb(255, 170, 40);
pub const VISITED: Color = rgb(90, 180, 110);
pub const UNVISITED: Color = rgb(173, 216, 230);

pub const SOURCE: Color = rgb(144, 238, 144);
pub const SINK: Color = rgb(240, 128, 128);
pub const PATH_NODE: Color = rgb(255, 250, 170);
pub const PATH_EDGE: Color = rgb(230, 30, 30);

/// Fill for a node in a traversal frame.
#[must_use]
pub const fn node_state(state: NodeState) -> Color {
    match state {
        NodeState::Current => CURRENT,
        NodeState::Frontier => FRONTIER,
        NodeState::Visited => VISITED,
        NodeState::Unvisited => UNVISITED,
    }
}

/// Fill for a node in a max-flow frame. Terminals keep their colour on the path.
#[must_use]
pub const fn flow_node(kind: NodeKind, on_path: bool) -> Color {
    match kind {
        NodeKind::Source => SOURCE,
        NodeKind::Sink => SINK,
        NodeKind::Intermediate if on_path => PATH_NODE,
        NodeKind::Intermediate => UNVISITED,
    }
}

/// Legend rows for traversal frames, in precedence order.
#[must_use]
pub fn traversal_legend() -> Vec<(&'static str, Color)> {
    vec![
        ("CURRENT", CURRENT),
        ("FRONTIER", FRONTIER),
        ("VISITED", VISITED),
        ("UNVISITED", UNVISITED),
    ]
}

#[must_use]
pub fn flow_legend() -> Vec<(&'static str, Color)> {
    vec![
        ("SOURCE", SOURCE),
        ("SINK", SINK),
        ("PATH NODE", PATH_NODE),
        ("CURRENT PATH", PATH_EDGE),
        ("EDGE", EDGE),
    ]
}
