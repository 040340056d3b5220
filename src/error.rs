//! Error types for rendering a layout result.
//!
//! Every failure the library can report is a variant of [`RenderError`]. Some
//! are fatal for the whole render (unsupported environment, malformed layout),
//! others only for a single cell (a dangling edge endpoint is skipped and
//! logged by the materializer).

use std::io;

use thiserror::Error;

/// The main error type for crestview operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The hosting environment cannot render diagrams at all. Nothing is built.
    #[error("Environment is not supported: {0}")]
    UnsupportedEnvironment(String),

    /// An edge references an endpoint id that has no materialized cell.
    #[error("Edge '{edge}' references missing endpoint '{endpoint}'")]
    DanglingEndpoint { edge: String, endpoint: String },

    /// The layout result is structurally invalid. Raised before the scene is touched.
    #[error("Malformed layout: {0}")]
    MalformedLayout(String),

    /// A `cresttype` outside the closed style vocabulary.
    #[error("Unknown style tag '{tag}' on '{id}'")]
    UnknownStyleTag { id: String, tag: String },

    #[error("Cell id '{0}' is already in use")]
    DuplicateCellId(String),

    #[error("No such cell: {0}")]
    UnknownCell(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    /// True for errors that only affect a single edge and should not abort a render.
    pub fn is_per_edge(&self) -> bool {
        matches!(self, RenderError::DanglingEndpoint { .. })
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
