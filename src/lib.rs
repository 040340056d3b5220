//! CREST diagram renderer.
//!
//! Takes the JSON result of a layered graph layout (entities, ports, states,
//! transitions and influences with coordinates and edge routes) and turns it
//! into a styled scene graph that can be inspected, highlighted, exported to
//! SVG/HTML or browsed interactively.
//!
//! The pipeline is:
//! [`layout::parse_layout`] → [`layout::validate`] → [`materialize::materialize_tree`]
//! onto a [`scene::Scene`], wrapped by a [`session::RenderSession`] that owns
//! viewport, toolbar, selection and the source overlay.
//!
//! The binary `crestview` renders layout files from the command line.

pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod materialize;
pub mod scene;
pub mod session;
pub mod shape;
pub mod style;

// Optional GUI/egui functionality lives behind the `egui` feature flag.
// It is used by the example in demos/egui_viewer.rs.
#[cfg(feature = "egui")]
pub mod egui_app;

pub use config::ViewerConfig;
pub use error::{RenderError, Result};
pub use layout::{LayoutEdge, LayoutNode, parse_layout};
pub use materialize::{MaterializeReport, MidpointPolicy, materialize_tree};
pub use scene::{CellHandle, Scene, Surface};
pub use session::{Environment, RenderSession};
