//! Egui-based interactive viewer for rendered CREST diagrams (feature = "egui").
//!
//! [`ViewerApp`] wraps a [`crate::session::RenderSession`]: the canvas shows
//! the scene with pan and zoom, clicks drive selection highlighting, a
//! double-click on an edge opens its source, and the toolbar and outline
//! live in floating windows.

#![cfg(feature = "egui")]

mod geometry;
mod render;
mod state;
mod text;
mod ui;

pub use geometry::{arrow_head, ellipse_points, pan_by, to_scene, to_screen, triangulate, zoom_about};
pub use render::{CanvasContext, paint_edge, paint_scene, paint_vertex};
pub use state::{PosterPrint, ViewerApp};
pub use text::{code_job, plain_code_job};
pub use ui::{ClickAction, UpdateResponse, update};

#[cfg(feature = "highlight")]
pub use text::python_syntax_job;
