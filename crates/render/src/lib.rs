//! # flowviz-render
//!
//! Turns recorded traversals and flow runs into pictures: a deterministic spring
//! layout, a pure scene composer, a small raster backend with a bitmap font, and
//! GIF/PNG export.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod canvas;
pub mod error;
pub mod exporter;
pub mod glyphs;
pub mod layout;
pub mod palette;
pub mod renderer;

pub use error::{RenderError, Result};
pub use exporter::{export_animation, export_still};
pub use layout::{Layout, LayoutConfig, MemoizedLayout, Position, Viewport};
pub use renderer::{Frame, Renderer, RenderStyle, Scene, rasterize};
