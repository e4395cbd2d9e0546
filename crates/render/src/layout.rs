//! # Spring layout
//!
//! Deterministic force-directed placement of graph nodes. Nodes start on a circle in
//! ascending id order, then relax under pairwise repulsion and Hooke springs along
//! edges. No randomness is involved, so the same graph always gets the same picture.
//!
//! [`MemoizedLayout`] computes the placement once and hands the cached result to every
//! frame rendered for that graph.

use std::ops::AddAssign;
use std::sync::OnceLock;

use flowviz_core::{Graph, NodeId};
use im::OrdMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, Result};

/// Tuning for the force simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Spring stiffness along edges.
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,

    /// Edge length at which a spring exerts no force.
    #[serde(default = "default_rest_length")]
    pub rest_length: f64,

    /// Strength of the inverse-square repulsion between every pair of nodes.
    #[serde(default = "default_repulsion")]
    pub repulsion: f64,

    /// Relaxation rounds.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Largest distance a node may move in one round.
    #[serde(default = "default_max_displacement")]
    pub max_displacement: f64,
}

const fn default_stiffness() -> f64 {
    0.08
}

const fn default_rest_length() -> f64 {
    120.0
}

const fn default_repulsion() -> f64 {
    20_000.0
}

const fn default_iterations() -> usize {
    50
}

const fn default_max_displacement() -> f64 {
    10.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            stiffness: default_stiffness(),
            rest_length: default_rest_length(),
            repulsion: default_repulsion(),
            iterations: default_iterations(),
            max_displacement: default_max_displacement(),
        }
    }
}

impl LayoutConfig {
    /// Validate the simulation parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidLayout`] for a non-positive stiffness, negative rest
    /// length, negative repulsion or non-positive displacement limit.
    pub fn validate(&self) -> Result<()> {
        SpringForce::new(self.stiffness, self.rest_length)?;
        if !self.repulsion.is_finite() || self.repulsion < 0.0 {
            return Err(RenderError::invalid_layout(format!(
                "repulsion {} must be non-negative",
                self.repulsion
            )));
        }
        if !self.max_displacement.is_finite() || self.max_displacement <= 0.0 {
            return Err(RenderError::invalid_layout(format!(
                "max displacement {} must be positive",
                self.max_displacement
            )));
        }
        Ok(())
    }
}

/// Spring force configuration using Hooke's law
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringForce {
    stiffness: f64,
    rest_length: f64,
}

impl SpringForce {
    /// Creates a new spring force with validation
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidLayout`] if `stiffness` is not positive or
    /// `rest_length` is negative.
    pub fn new(stiffness: f64, rest_length: f64) -> Result<Self> {
        if !stiffness.is_finite() || stiffness <= 0.0 {
            return Err(RenderError::invalid_layout(format!(
                "stiffness {stiffness} must be positive"
            )));
        }
        if !rest_length.is_finite() || rest_length < 0.0 {
            return Err(RenderError::invalid_layout(format!(
                "rest length {rest_length} must be non-negative"
            )));
        }
        Ok(Self {
            stiffness,
            rest_length,
        })
    }

    /// Forces on the two endpoints; `None` when they coincide.
    #[must_use]
    pub fn calculate_force(&self, source: &Position, target: &Position) -> Option<(Force, Force)> {
        let displacement = source.distance(target) - self.rest_length;
        let magnitude = self.stiffness * displacement;
        let (dir_x, dir_y) = source.direction_to(target)?;

        let fx = magnitude * dir_x;
        let fy = magnitude * dir_y;
        Some((Force::new(fx, fy), Force::new(-fx, -fy)))
    }

    #[must_use]
    pub const fn stiffness(&self) -> f64 {
        self.stiffness
    }

    #[must_use]
    pub const fn rest_length(&self) -> f64 {
        self.rest_length
    }
}

/// A 2D position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Unit vector towards `other`; `None` when the points coincide.
    #[must_use]
    pub fn direction_to(&self, other: &Self) -> Option<(f64, f64)> {
        let distance = self.distance(other);
        if distance < f64::EPSILON {
            return None;
        }
        Some(((other.x - self.x) / distance, (other.y - self.y) / distance))
    }

    /// Point `t` of the way from `self` to `other`.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self::new(
            (other.x - self.x).mul_add(t, self.x),
            (other.y - self.y).mul_add(t, self.y),
        )
    }
}

/// A force vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Force {
    x: f64,
    y: f64,
}

impl Force {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl AddAssign for Force {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

/// Output rectangle a layout is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

/// Node positions keyed by id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    positions: OrdMap<NodeId, Position>,
}

impl Layout {
    /// Run the force simulation over `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidLayout`] if `config` is invalid.
    pub fn compute(graph: &Graph, config: &LayoutConfig) -> Result<Self> {
        config.validate()?;
        let spring = SpringForce::new(config.stiffness, config.rest_length)?;

        let ids = graph.node_ids();
        let springs: Vec<(NodeId, NodeId)> = graph
            .edges()
            .map(|edge| (edge.from.min(edge.to), edge.from.max(edge.to)))
            .sorted_unstable()
            .dedup()
            .collect();

        let mut positions = initial_positions(&ids, config.rest_length);
        let rounds = config.iterations.max(1);
        for round in 0..rounds {
            // Linear cooling from the full step down to a tenth of it.
            #[allow(clippy::cast_precision_loss)]
            let temperature = 1.0 - 0.9 * (round as f64 / rounds as f64);
            positions = relax(&positions, &springs, &spring, config, temperature);
        }

        debug!(
            nodes = ids.len(),
            springs = springs.len(),
            iterations = config.iterations,
            "Computed spring layout"
        );

        Ok(Self { positions })
    }

    /// Position of `id`, if laid out.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Position)> + '_ {
        self.positions.iter().map(|(id, position)| (*id, *position))
    }

    /// Scale and translate into `viewport`, keeping `margin` clear on every side.
    ///
    /// An axis with no spread is centred.
    #[must_use]
    pub fn fit(&self, viewport: Viewport) -> Self {
        let bounds = self.positions.values().fold(None, |acc, p| match acc {
            None => Some((p.x, p.y, p.x, p.y)),
            Some((min_x, min_y, max_x, max_y)) => {
                Some((min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y)))
            }
        });
        let Some((min_x, min_y, max_x, max_y)) = bounds else {
            return Self::default();
        };

        let usable_w = (viewport.width - 2.0 * viewport.margin).max(0.0);
        let usable_h = (viewport.height - 2.0 * viewport.margin).max(0.0);
        let scale = |value: f64, min: f64, max: f64, usable: f64| {
            let span = max - min;
            if span < f64::EPSILON {
                viewport.margin + usable / 2.0
            } else {
                viewport.margin + (value - min) / span * usable
            }
        };

        let positions = self
            .positions
            .iter()
            .map(|(id, p)| {
                (
                    *id,
                    Position::new(
                        scale(p.x, min_x, max_x, usable_w),
                        scale(p.y, min_y, max_y, usable_h),
                    ),
                )
            })
            .collect();

        Self { positions }
    }
}

fn initial_positions(ids: &[NodeId], radius: f64) -> OrdMap<NodeId, Position> {
    if let [only] = ids {
        return OrdMap::unit(*only, Position::default());
    }

    #[allow(clippy::cast_precision_loss)]
    let angle_step = std::f64::consts::TAU / ids.len() as f64;
    let radius = radius.max(1.0) * 2.0;
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            #[allow(clippy::cast_precision_loss)]
            let angle = i as f64 * angle_step;
            (*id, Position::new(radius * angle.cos(), radius * angle.sin()))
        })
        .collect()
}

fn relax(
    positions: &OrdMap<NodeId, Position>,
    springs: &[(NodeId, NodeId)],
    spring: &SpringForce,
    config: &LayoutConfig,
    temperature: f64,
) -> OrdMap<NodeId, Position> {
    let mut forces: OrdMap<NodeId, Force> = positions.keys().map(|id| (*id, Force::default())).collect();

    for (node, pos) in positions {
        let mut total = Force::default();
        for (other, other_pos) in positions {
            if node == other {
                continue;
            }
            if let Some((dir_x, dir_y)) = other_pos.direction_to(pos) {
                let distance = pos.distance(other_pos).max(1.0);
                let push = config.repulsion / (distance * distance);
                total += Force::new(push * dir_x, push * dir_y);
            }
        }
        if let Some(force) = forces.get_mut(node) {
            *force += total;
        }
    }

    for (from, to) in springs {
        let (Some(a), Some(b)) = (positions.get(from), positions.get(to)) else {
            continue;
        };
        if let Some((on_from, on_to)) = spring.calculate_force(a, b) {
            if let Some(force) = forces.get_mut(from) {
                *force += on_from;
            }
            if let Some(force) = forces.get_mut(to) {
                *force += on_to;
            }
        }
    }

    let limit = config.max_displacement * temperature;
    positions
        .iter()
        .map(|(id, pos)| {
            let force = forces.get(id).copied().unwrap_or_default();
            let magnitude = force.magnitude();
            let scale = if magnitude > limit { limit / magnitude } else { 1.0 };
            (*id, Position::new(force.x.mul_add(scale, pos.x), force.y.mul_add(scale, pos.y)))
        })
        .collect()
}

/// Layout of one graph, computed on first use and fitted to a viewport.
#[derive(Debug)]
pub struct MemoizedLayout<'g> {
    graph: &'g Graph,
    config: LayoutConfig,
    viewport: Viewport,
    cache: OnceLock<Layout>,
}

impl<'g> MemoizedLayout<'g> {
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidLayout`] if `config` is invalid.
    pub fn new(graph: &'g Graph, config: LayoutConfig, viewport: Viewport) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            graph,
            config,
            viewport,
            cache: OnceLock::new(),
        })
    }

    /// Fitted positions, computed on the first call.
    pub fn positions(&self) -> &Layout {
        self.cache.get_or_init(|| {
            // The config was validated in `new`, so the simulation cannot reject it.
            Layout::compute(self.graph, &self.config)
                .map(|layout| layout.fit(self.viewport))
                .unwrap_or_default()
        })
    }

    #[must_use]
    pub const fn graph(&self) -> &'g Graph {
        self.graph
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }
}
