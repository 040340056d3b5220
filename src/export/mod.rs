//! Static presentations of a rendered scene.

mod html;
mod svg;

pub use self::html::HtmlExporter;
pub use self::svg::SvgExporter;

use std::fs;
use std::path::Path;

use log::{error, info};

use crate::error::RenderError;
use crate::session::RenderSession;

/// Something that turns a session's scene into a document.
pub trait Exporter {
    /// Render the current scene, including highlight overrides.
    fn render(&self, session: &RenderSession) -> String;

    /// Render and write to `path`.
    fn write_to(&self, session: &RenderSession, path: &Path) -> Result<(), RenderError> {
        let doc = self.render(session);
        if let Err(err) = fs::write(path, doc) {
            error!(path = path.display().to_string(), err:err; "Failed to write export");
            return Err(err.into());
        }
        info!(path = path.display().to_string(); "Export written");
        Ok(())
    }
}
