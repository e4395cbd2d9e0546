//! # Frame rendering
//!
//! Rendering runs in two pure stages. `compose_*` turns a graph plus one recorded
//! state into a [`Scene`]: node centres, fills, edge geometry, labels and titles.
//! [`rasterize`] then draws a scene into an RGBA [`Frame`].
//!
//! Node positions come from a [`MemoizedLayout`] owned by the [`Renderer`], so every
//! frame of every animation of one graph shares a single layout.

use std::collections::HashMap;

use flowviz_core::{Algorithm, Augmentation, Edge, FlowRun, Graph, NodeId, Trace, TraversalStep};
use image::RgbaImage;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::canvas::Canvas;
use crate::error::{RenderError, Result};
use crate::glyphs;
use crate::layout::{LayoutConfig, MemoizedLayout, Position, Viewport};
use crate::palette::{self, Color};

/// Frame geometry and typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_node_radius")]
    pub node_radius: u32,

    /// Clear border between the outermost node centres and the frame edge.
    #[serde(default = "default_margin")]
    pub margin: u32,

    /// Pixel size of one font cell; titles and node ids use it, edge labels one less.
    #[serde(default = "default_text_scale")]
    pub text_scale: u32,

    #[serde(default)]
    pub layout: LayoutConfig,
}

const fn default_width() -> u32 {
    960
}

const fn default_height() -> u32 {
    640
}

const fn default_node_radius() -> u32 {
    20
}

const fn default_margin() -> u32 {
    70
}

const fn default_text_scale() -> u32 {
    2
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            node_radius: default_node_radius(),
            margin: default_margin(),
            text_scale: default_text_scale(),
            layout: LayoutConfig::default(),
        }
    }
}

impl RenderStyle {
    /// Validate the style.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidStyle`] if the frame is empty or wider or taller
    /// than a GIF can hold, the margins leave no
    /// room for nodes, the radius is zero or the text scale is outside `1..=8`, and
    /// [`RenderError::InvalidLayout`] for bad layout parameters.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::invalid_style(format!(
                "frame size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        let max_side = u32::from(u16::MAX);
        if self.width > max_side || self.height > max_side {
            return Err(RenderError::invalid_style(format!(
                "frame size {}x{} exceeds the GIF limit of {max_side} pixels per side",
                self.width, self.height
            )));
        }
        if self.node_radius == 0 {
            return Err(RenderError::invalid_style("node radius must be positive"));
        }
        if self.margin.saturating_mul(2) >= self.width.min(self.height) {
            return Err(RenderError::invalid_style(format!(
                "margin {} leaves no drawing area in a {}x{} frame",
                self.margin, self.width, self.height
            )));
        }
        if !(1..=8).contains(&self.text_scale) {
            return Err(RenderError::invalid_style(format!(
                "text scale {} must be between 1 and 8",
                self.text_scale
            )));
        }
        self.layout.validate()
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            width: f64::from(self.width),
            height: f64::from(self.height),
            margin: f64::from(self.margin),
        }
    }

    fn label_scale(&self) -> u32 {
        self.text_scale.saturating_sub(1).max(1)
    }
}

/// A node as it will be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGlyph {
    pub id: NodeId,
    pub center: Position,
    pub fill: Color,
    pub label: String,
}

/// An edge as it will be drawn: clipped to the node rims, offset when the reverse
/// edge also exists.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGlyph {
    pub from: NodeId,
    pub to: NodeId,
    pub start: Position,
    pub end: Position,
    pub color: Color,
    pub emphasized: bool,
    pub label: String,
    pub label_at: Position,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub subtitle: String,
    pub nodes: Vec<NodeGlyph>,
    pub edges: Vec<EdgeGlyph>,
    pub legend: Vec<(&'static str, Color)>,
}

impl Scene {
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeGlyph> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn edge(&self, from: NodeId, to: NodeId) -> Option<&EdgeGlyph> {
        self.edges
            .iter()
            .find(|edge| edge.from == from && edge.to == to)
    }
}

/// One rendered image.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbaImage,
}

impl Frame {
    #[must_use]
    pub const fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Renders traversal steps and flow augmentations of one graph.
#[derive(Debug)]
pub struct Renderer<'g> {
    layout: MemoizedLayout<'g>,
    style: RenderStyle,
}

impl<'g> Renderer<'g> {
    /// # Errors
    ///
    /// Returns a style or layout error if `style` is invalid.
    pub fn new(graph: &'g Graph, style: RenderStyle) -> Result<Self> {
        style.validate()?;
        let layout = MemoizedLayout::new(graph, style.layout, style.viewport())?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            width = style.width,
            height = style.height,
            "Prepared renderer"
        );
        Ok(Self { layout, style })
    }

    #[must_use]
    pub const fn graph(&self) -> &'g Graph {
        self.layout.graph()
    }

    #[must_use]
    pub const fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Scene for one traversal step out of `total`.
    #[must_use]
    pub fn compose_step(&self, algorithm: Algorithm, step: &TraversalStep, total: usize) -> Scene {
        let nodes = self.nodes(|id| palette::node_state(step.state_of(id)));
        let edges = self.edges(|_| (palette::EDGE, false), |edge| format!("{:.1}", edge.weight));

        let frontier_name = match algorithm {
            Algorithm::Bfs => "QUEUE",
            Algorithm::Dfs => "STACK",
        };

        Scene {
            width: self.style.width,
            height: self.style.height,
            title: format!(
                "{algorithm} STEP {}/{total}  CURRENT: {}",
                step.index() + 1,
                step.current()
            ),
            subtitle: format!(
                "{frontier_name}: [{}]  VISITED: {}",
                step.frontier().iter().join(" "),
                step.visited().len()
            ),
            nodes,
            edges,
            legend: palette::traversal_legend(),
        }
    }

    /// Render one traversal step.
    #[must_use]
    pub fn render_step(&self, algorithm: Algorithm, step: &TraversalStep, total: usize) -> Frame {
        rasterize(&self.compose_step(algorithm, step, total), &self.style)
    }

    /// Frames for every step of `trace`, in order, rendered lazily.
    pub fn render_trace<'a>(&'a self, trace: &'a Trace) -> impl Iterator<Item = Frame> + 'a {
        let total = trace.len();
        trace.steps().iter().map(move |step| {
            trace!(algorithm = %trace.algorithm(), step = step.index(), "Rendering frame");
            self.render_step(trace.algorithm(), step, total)
        })
    }

    /// Scene for a flow run: after `augmentation` if given, otherwise its final state.
    #[must_use]
    pub fn compose_flow(&self, run: &FlowRun, augmentation: Option<&Augmentation>) -> Scene {
        let graph = self.graph();
        let flows: HashMap<(NodeId, NodeId), f64> = augmentation
            .map_or(run.final_flows.as_slice(), |a| a.flows.as_slice())
            .iter()
            .map(|edge| ((edge.from, edge.to), edge.flow))
            .collect();
        let on_path = |id: NodeId| augmentation.is_some_and(|a| a.path.contains(&id));

        let nodes = self.nodes(|id| palette::flow_node(graph.kind(id).unwrap_or_default(), on_path(id)));
        let edges = self.edges(
            |edge| {
                if augmentation.is_some_and(|a| a.uses_edge(edge.from, edge.to)) {
                    (palette::PATH_EDGE, true)
                } else {
                    (palette::EDGE, false)
                }
            },
            |edge| {
                let flow = flows.get(&(edge.from, edge.to)).copied().unwrap_or(0.0);
                format!("{flow:.1}/{:.1}", edge.weight)
            },
        );

        let (title, subtitle) = match augmentation {
            Some(a) => (
                format!(
                    "{} MAXIMUM FLOW  PATH {}/{}",
                    run.search,
                    a.index + 1,
                    run.augmentations.len()
                ),
                format!(
                    "PATH: {}  PUSHED: {:.1}  TOTAL: {:.1}",
                    a.path.iter().join(" > "),
                    a.bottleneck,
                    a.total_flow
                ),
            ),
            None => (
                format!("{} FINAL STATE (FLOW: {:.1})", run.search, run.max_flow),
                format!(
                    "SOURCE: {}  SINK: {}  PATHS: {}",
                    run.source,
                    run.sink,
                    run.augmentations.len()
                ),
            ),
        };

        Scene {
            width: self.style.width,
            height: self.style.height,
            title,
            subtitle,
            nodes,
            edges,
            legend: palette::flow_legend(),
        }
    }

    /// One frame per augmentation, in order, rendered lazily.
    pub fn render_flow<'a>(&'a self, run: &'a FlowRun) -> impl Iterator<Item = Frame> + 'a {
        run.augmentations
            .iter()
            .map(move |augmentation| rasterize(&self.compose_flow(run, Some(augmentation)), &self.style))
    }

    /// Final flow state of `run`.
    #[must_use]
    pub fn render_flow_final(&self, run: &FlowRun) -> Frame {
        rasterize(&self.compose_flow(run, None), &self.style)
    }

    fn nodes(&self, fill: impl Fn(NodeId) -> Color) -> Vec<NodeGlyph> {
        self.layout
            .positions()
            .iter()
            .map(|(id, center)| NodeGlyph {
                id,
                center,
                fill: fill(id),
                label: id.to_string(),
            })
            .collect()
    }

    fn edges(
        &self,
        paint: impl Fn(&Edge) -> (Color, bool),
        label: impl Fn(&Edge) -> String,
    ) -> Vec<EdgeGlyph> {
        let graph = self.graph();
        let positions = self.layout.positions();
        let radius = f64::from(self.style.node_radius);

        graph
            .edges()
            .filter_map(|edge| {
                let a = positions.position(edge.from)?;
                let b = positions.position(edge.to)?;
                let (dx, dy) = a.direction_to(&b)?;

                // Opposite edges are shifted to either side of the centre line.
                let shift = if graph.has_edge(edge.to, edge.from) {
                    radius * 0.35
                } else {
                    0.0
                };
                let (nx, ny) = (-dy * shift, dx * shift);

                let start = Position::new(a.x + dx * radius + nx, a.y + dy * radius + ny);
                let end = Position::new(b.x - dx * radius + nx, b.y - dy * radius + ny);
                let (color, emphasized) = paint(&edge);

                Some(EdgeGlyph {
                    from: edge.from,
                    to: edge.to,
                    start,
                    end,
                    color,
                    emphasized,
                    label: label(&edge),
                    label_at: start.lerp(&end, 0.5),
                })
            })
            .collect()
    }
}

/// Draw `scene` into a frame sized by the scene.
#[must_use]
pub fn rasterize(scene: &Scene, style: &RenderStyle) -> Frame {
    let mut canvas = Canvas::new(scene.width, scene.height, palette::BACKGROUND);
    let radius = f64::from(style.node_radius);
    let scale = style.text_scale;
    let small = style.label_scale();

    for edge in &scene.edges {
        let thickness = if edge.emphasized { 4.0 } else { 2.0 };
        canvas.arrow(
            (edge.start.x, edge.start.y),
            (edge.end.x, edge.end.y),
            thickness,
            radius * 0.7,
            edge.color,
        );
    }
    for edge in &scene.edges {
        canvas.label(
            (edge.label_at.x, edge.label_at.y),
            &edge.label,
            small,
            palette::EDGE_LABEL,
            palette::BACKGROUND,
        );
    }

    for node in &scene.nodes {
        let center = (node.center.x, node.center.y);
        canvas.fill_circle(center, radius, node.fill);
        canvas.ring(center, radius, 2.0, palette::NODE_OUTLINE);
        canvas.text_centered(center, &node.label, scale, palette::TEXT);
    }

    let line = i64::from(glyphs::text_height(scale));
    canvas.text(16, 14, &scene.title, scale, palette::TEXT);
    canvas.text(16, 14 + line + 8, &scene.subtitle, small, palette::TEXT);

    let row = line + 6;
    let rows = i64::try_from(scene.legend.len()).unwrap_or(0);
    let mut y = i64::from(scene.height) - 16 - rows * row;
    for (name, color) in &scene.legend {
        canvas.fill_rect(16, y, glyphs::text_height(scale), glyphs::text_height(scale), *color);
        canvas.text(16 + line + 8, y, name, scale, palette::TEXT);
        y += row;
    }

    Frame::new(canvas.into_image())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use flowviz_core::{PathSearch, example_flow_network, max_flow, record_bfs, record_dfs};

    use super::*;

    fn small_style() -> RenderStyle {
        RenderStyle {
            width: 320,
            height: 240,
            node_radius: 10,
            margin: 30,
            text_scale: 1,
            layout: LayoutConfig::default(),
        }
    }

    fn diamond() -> Graph {
        let mut graph = Graph::new();
        for id in 0..5 {
            graph.add_node(id).unwrap();
        }
        graph.add_edge(0, 1, 1.5).unwrap();
        graph.add_edge(0, 2, 2.75).unwrap();
        graph.add_edge(1, 3, 1.0).unwrap();
        graph.add_edge(2, 3, 1.0).unwrap();
        graph
    }

    #[test]
    fn test_style_validation() {
        assert!(RenderStyle::default().validate().is_ok());
        let bad = RenderStyle {
            margin: 200,
            ..small_style()
        };
        assert!(matches!(bad.validate(), Err(RenderError::InvalidStyle { .. })));
        let bad = RenderStyle {
            text_scale: 0,
            ..small_style()
        };
        assert!(bad.validate().is_err());
        let too_wide = RenderStyle {
            width: 70_000,
            ..small_style()
        };
        assert!(matches!(too_wide.validate(), Err(RenderError::InvalidStyle { .. })));
        let largest = RenderStyle {
            width: u32::from(u16::MAX),
            height: u32::from(u16::MAX),
            ..small_style()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_scene_colours_follow_node_state() {
        let graph = diamond();
        let trace = record_bfs(&graph, 0).unwrap();
        let renderer = Renderer::new(&graph, small_style()).unwrap();

        // After step 0: current 0, frontier [1, 2]; 3 undiscovered, 4 unreachable.
        let scene = renderer.compose_step(trace.algorithm(), &trace.steps()[0], trace.len());
        assert_eq!(scene.node(0).unwrap().fill, palette::CURRENT);
        assert_eq!(scene.node(1).unwrap().fill, palette::FRONTIER);
        assert_eq!(scene.node(2).unwrap().fill, palette::FRONTIER);
        assert_eq!(scene.node(3).unwrap().fill, palette::UNVISITED);
        assert_eq!(scene.node(4).unwrap().fill, palette::UNVISITED);

        let last = trace.steps().last().unwrap();
        let scene = renderer.compose_step(trace.algorithm(), last, trace.len());
        assert_eq!(scene.node(0).unwrap().fill, palette::VISITED);
        assert_eq!(scene.node(3).unwrap().fill, palette::CURRENT);
        assert_eq!(scene.node(4).unwrap().fill, palette::UNVISITED);
    }

    #[test]
    fn test_edge_labels_show_weight_to_one_decimal() {
        let graph = diamond();
        let trace = record_dfs(&graph, 0).unwrap();
        let renderer = Renderer::new(&graph, small_style()).unwrap();
        let scene = renderer.compose_step(trace.algorithm(), &trace.steps()[0], trace.len());

        assert_eq!(scene.edges.len(), 4);
        assert_eq!(scene.edge(0, 1).unwrap().label, "1.5");
        assert_eq!(scene.edge(0, 2).unwrap().label, "2.8");
        assert!(scene.title.starts_with("DFS STEP 1/4"));
        assert!(scene.subtitle.starts_with("STACK: [2 1]"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let graph = diamond();
        let trace = record_bfs(&graph, 0).unwrap();
        let first = Renderer::new(&graph, small_style()).unwrap();
        let second = Renderer::new(&graph, small_style()).unwrap();
        let step = &trace.steps()[1];
        assert_eq!(
            first.compose_step(Algorithm::Bfs, step, trace.len()),
            second.compose_step(Algorithm::Bfs, step, trace.len())
        );
    }

    #[test]
    fn test_render_trace_yields_one_frame_per_step() {
        let graph = diamond();
        let trace = record_bfs(&graph, 0).unwrap();
        let renderer = Renderer::new(&graph, small_style()).unwrap();

        let frames: Vec<Frame> = renderer.render_trace(&trace).collect();
        assert_eq!(frames.len(), trace.len());
        for frame in &frames {
            assert_eq!((frame.width(), frame.height()), (320, 240));
        }
        assert_ne!(frames[0], frames[1]);
    }

    #[test]
    fn test_rasterized_node_uses_its_fill() {
        let graph = diamond();
        let trace = record_bfs(&graph, 0).unwrap();
        let renderer = Renderer::new(&graph, small_style()).unwrap();
        let mut scene = renderer.compose_step(Algorithm::Bfs, &trace.steps()[0], trace.len());
        scene.title.clear();
        scene.subtitle.clear();
        scene.legend.clear();
        let frame = rasterize(&scene, renderer.style());

        let node = scene.node(4).unwrap();
        // Sample just below the id label, still well inside the disc.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (x, y) = (node.center.x.round() as u32, (node.center.y + 6.0).round() as u32);
        assert_eq!(*frame.image().get_pixel(x, y), palette::UNVISITED);
    }

    #[test]
    fn test_flow_scene_highlights_augmenting_path() {
        let graph = example_flow_network().unwrap();
        let run = max_flow(&graph, 0, 6, PathSearch::Bfs).unwrap();
        let renderer = Renderer::new(&graph, small_style()).unwrap();

        let first = &run.augmentations[0];
        let scene = renderer.compose_flow(&run, Some(first));
        assert!(scene.edge(0, 1).unwrap().emphasized);
        assert_eq!(scene.edge(0, 1).unwrap().label, "10.0/15.0");
        assert!(!scene.edge(0, 2).unwrap().emphasized);
        assert_eq!(scene.node(0).unwrap().fill, palette::SOURCE);
        assert_eq!(scene.node(6).unwrap().fill, palette::SINK);
        assert_eq!(scene.node(1).unwrap().fill, palette::PATH_NODE);

        let frames: Vec<Frame> = renderer.render_flow(&run).collect();
        assert_eq!(frames.len(), run.augmentations.len());

        let final_scene = renderer.compose_flow(&run, None);
        assert_eq!(final_scene.title, "BFS FINAL STATE (FLOW: 15.0)");
        assert!(final_scene.edges.iter().all(|edge| !edge.emphasized));
    }
}
