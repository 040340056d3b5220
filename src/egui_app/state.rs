#![cfg(feature = "egui")]

use eframe::egui;

use crate::config::ViewerConfig;
use crate::error::RenderError;
use crate::layout::LayoutNode;
use crate::session::{Environment, RenderSession, ToolbarAction};

/// Result of the last poster print request.
#[derive(Clone, Debug, PartialEq)]
pub struct PosterPrint {
    pub pages: u32,
    pub scale: f64,
}

/// Interactive egui application over one [`RenderSession`].
pub struct ViewerApp {
    pub session: RenderSession,
    /// Re-run the sizing pass against the canvas on the next frame.
    pub reset_view: bool,
    pub show_outline: bool,
    /// Page count used by the poster print tool.
    pub poster_pages: u32,
    pub poster: Option<PosterPrint>,
    /// Canvas size of the last frame, in pixels.
    pub canvas_size: Option<(f64, f64)>,
}

impl ViewerApp {
    pub fn new(session: RenderSession) -> Self {
        Self {
            session,
            reset_view: true,
            show_outline: true,
            poster_pages: 1,
            poster: None,
            canvas_size: None,
        }
    }

    /// Open a session for `layout` in a desktop environment.
    pub fn from_layout(layout: &LayoutNode, config: &ViewerConfig) -> Result<Self, RenderError> {
        let session = RenderSession::open(layout, config, Environment::default())?;
        Ok(Self::new(session))
    }

    /// Apply a toolbar action to the session.
    pub fn run_toolbar(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::ActualSize => {
                self.session.viewport_mut().actual_size();
                self.reset_view = true;
            }
            ToolbarAction::PosterPrint => {
                if let Some(scale) = self.session.run_toolbar(action, self.poster_pages) {
                    self.poster = Some(PosterPrint {
                        pages: self.poster_pages,
                        scale,
                    });
                }
            }
            ToolbarAction::ZoomIn | ToolbarAction::ZoomOut => {
                self.session.run_toolbar(action, self.poster_pages);
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        super::ui::update(self, ctx);
    }
}
