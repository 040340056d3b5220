//! A render session: one materialized layout plus the view state around it.
//!
//! [`RenderSession`] replaces the loose globals a diagram page would keep
//! (graph, toolbar window, outline window, modal). It is created from a
//! layout result, an explicit [`Environment`] describing the host, and a
//! [`ViewerConfig`]; user input is fed back through its methods.

use log::{debug, info};

use crate::config::ViewerConfig;
use crate::error::RenderError;
use crate::geometry::{Bounds, Point};
use crate::interaction::{
    CodeOverlay, EdgeHighlighter, InteractionObserver, SelectionChange, SelectionModel,
};
use crate::layout::LayoutNode;
use crate::materialize::{MaterializeReport, materialize_tree};
use crate::scene::{CellHandle, Scene, Surface};
use crate::shape::ShapeRegistry;
use crate::style::{Stylesheet, register_styles};

/// Extra height added below the diagram when sizing the hosting frame.
pub const FRAME_MARGIN: f64 = 50.0;

/// A4 portrait page in the toolkit's print units.
pub const PAGE_A4_PORTRAIT: (f64, f64) = (827.0, 1169.0);

// ────────────────────────────────────────────────────────────────────────────
// Host environment
// ────────────────────────────────────────────────────────────────────────────

/// What the host page reports about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    /// False when the host cannot render diagrams at all.
    pub supported: bool,
    pub frame: FrameMetrics,
    /// Location of the embedding page, used for toolbar icon URLs.
    pub origin: String,
    pub pathname: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            supported: true,
            frame: FrameMetrics::default(),
            origin: "http://localhost:8888".to_string(),
            pathname: "/notebooks/".to_string(),
        }
    }
}

/// Dimensions of the frame hosting the diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    /// Pixel width of the hosting frame.
    pub frame_width: f64,
    /// The frame sits inside an `output` element whose height must follow.
    pub nested_in_output: bool,
    /// Height of the diagram container in the parent frame, when embedded one level deeper.
    pub parent_graph_height: Option<f64>,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self {
            frame_width: 960.0,
            nested_in_output: false,
            parent_graph_height: None,
        }
    }
}

/// Heights computed by the sizing pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingOutcome {
    pub container_height: f64,
    pub frame_height: f64,
    /// New height of the `output` host element.
    pub output_height: Option<f64>,
    /// New height of the parent frame.
    pub parent_frame_height: Option<f64>,
    /// Whether the view was zoomed out to fit.
    pub fitted: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Viewport
// ────────────────────────────────────────────────────────────────────────────

/// Scale and translation of the view onto the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    /// Translation in scene units, applied before scaling.
    pub translate: Point,
    pub zoom_factor: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Point::default(),
            zoom_factor: 1.2,
        }
    }
}

impl Viewport {
    pub fn zoom_in(&mut self) {
        self.scale *= self.zoom_factor;
    }

    pub fn zoom_out(&mut self) {
        self.scale /= self.zoom_factor;
    }

    pub fn actual_size(&mut self) {
        self.scale = 1.0;
    }

    /// Scene point to view (pixel) coordinates.
    pub fn to_view(&self, p: Point) -> Point {
        Point::new(
            (p.x + self.translate.x) * self.scale,
            (p.y + self.translate.y) * self.scale,
        )
    }

    /// View (pixel) point back to scene coordinates.
    pub fn to_scene(&self, p: Point) -> Point {
        Point::new(
            p.x / self.scale - self.translate.x,
            p.y / self.scale - self.translate.y,
        )
    }

    /// Scale `bounds` down to fit into `container` and align it to the top-left.
    pub fn fit(&mut self, bounds: Bounds, container: (f64, f64)) {
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            return;
        }
        let sx = container.0 / bounds.width;
        let sy = container.1 / bounds.height;
        self.scale = sx.min(sy);
        self.translate = Point::new(-bounds.x, -bounds.y);
    }

    /// Translate so that `bounds` is centred in `container` at the current scale.
    pub fn center(&mut self, bounds: Bounds, container: (f64, f64)) {
        let cx = container.0 / self.scale / 2.0;
        let cy = container.1 / self.scale / 2.0;
        let c = bounds.center();
        self.translate = Point::new(cx - c.x, cy - c.y);
    }

    /// Scene region visible in a container of the given pixel size.
    pub fn visible_region(&self, container: (f64, f64)) -> Bounds {
        let tl = self.to_scene(Point::default());
        Bounds::new(
            tl.x,
            tl.y,
            container.0 / self.scale,
            container.1 / self.scale,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Toolbar and floating windows
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    ZoomIn,
    ZoomOut,
    ActualSize,
    PosterPrint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarItem {
    pub title: &'static str,
    pub icon: &'static str,
    pub action: ToolbarAction,
}

impl ToolbarItem {
    /// Icon location relative to the first path segment of the embedding page.
    pub fn icon_url(&self, origin: &str, pathname: &str) -> String {
        let segment = pathname
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default();
        format!(
            "{}/{}/CREST/crestdsl/ui/icons/{}",
            origin.trim_end_matches('/'),
            segment,
            self.icon
        )
    }
}

/// Fixed set of toolbar items, in display order.
pub fn toolbar_items() -> Vec<ToolbarItem> {
    vec![
        ToolbarItem {
            title: "Zoom In",
            icon: "zoom_in32.png",
            action: ToolbarAction::ZoomIn,
        },
        ToolbarItem {
            title: "Zoom Out",
            icon: "zoom_out32.png",
            action: ToolbarAction::ZoomOut,
        },
        ToolbarItem {
            title: "Actual Size",
            icon: "view_1_132.png",
            action: ToolbarAction::ActualSize,
        },
        ToolbarItem {
            title: "Poster Print",
            icon: "press32.png",
            action: ToolbarAction::PosterPrint,
        },
    ]
}

/// A floating window on top of the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingWindow {
    pub title: &'static str,
    pub bounds: Bounds,
    pub resizable: bool,
    pub visible: bool,
}

impl FloatingWindow {
    pub fn toolbar() -> Self {
        Self {
            title: "Tools",
            bounds: Bounds::new(5.0, 5.0, 180.0, 66.0),
            resizable: false,
            visible: true,
        }
    }

    pub fn outline() -> Self {
        Self {
            title: "Outline",
            bounds: Bounds::new(5.0, 71.0, 180.0, 140.0),
            resizable: true,
            visible: true,
        }
    }
}

/// Overview of the whole graph with the visible region marked.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineView {
    /// Scene to outline scale.
    pub scale: f64,
    /// Graph bounds in scene coordinates.
    pub graph: Bounds,
    /// Visible region in outline coordinates.
    pub visible: Bounds,
}

/// Print scale so the graph tiles onto at most `page_count` pages of `page` size.
pub fn scale_for_page_count(page_count: u32, graph: Bounds, page: (f64, f64)) -> f64 {
    if page_count < 1 || graph.width <= 0.0 || graph.height <= 0.0 {
        return 1.0;
    }
    (1..=page_count)
        .map(|cols| {
            let rows = page_count / cols;
            let sx = cols as f64 * page.0 / graph.width;
            let sy = rows as f64 * page.1 / graph.height;
            sx.min(sy)
        })
        .fold(0.0, f64::max)
}

// ────────────────────────────────────────────────────────────────────────────
// RenderSession
// ────────────────────────────────────────────────────────────────────────────

/// Everything belonging to one rendered layout.
pub struct RenderSession {
    scene: Scene,
    shapes: ShapeRegistry,
    viewport: Viewport,
    environment: Environment,
    container_height: f64,
    toolbar: FloatingWindow,
    outline: FloatingWindow,
    selection: SelectionModel,
    highlighter: EdgeHighlighter,
    overlay: Option<CodeOverlay>,
    enabled: bool,
    report: MaterializeReport,
    sizing: Option<SizingOutcome>,
}

impl RenderSession {
    /// Build the scene for `layout` and run the initial sizing pass.
    ///
    /// Fails before touching anything when the environment is unsupported or
    /// the layout does not validate.
    pub fn open(
        layout: &LayoutNode,
        config: &ViewerConfig,
        environment: Environment,
    ) -> Result<Self, RenderError> {
        if !environment.supported {
            return Err(RenderError::UnsupportedEnvironment(
                "Browser is not supported!".to_string(),
            ));
        }
        let shapes = ShapeRegistry::with_port_glyphs(config.style.extrude);
        let mut stylesheet = Stylesheet::new();
        register_styles(&mut stylesheet, &shapes);
        let mut scene = Scene::new(stylesheet);
        let report = materialize_tree(&mut scene, layout, config.materialize.midpoint_policy)?;

        let mut session = Self {
            scene,
            shapes,
            viewport: Viewport::default(),
            environment,
            container_height: 0.0,
            toolbar: FloatingWindow::toolbar(),
            outline: FloatingWindow::outline(),
            selection: SelectionModel::new(),
            highlighter: EdgeHighlighter::new(config.highlight.clone()),
            overlay: None,
            enabled: true,
            report,
            sizing: None,
        };
        let frame = session.environment.frame;
        session.adjust_size(&frame);
        info!(cells = session.scene.cells().count(); "Render session opened");
        Ok(session)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn shapes(&self) -> &ShapeRegistry {
        &self.shapes
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn report(&self) -> &MaterializeReport {
        &self.report
    }

    pub fn selection(&self) -> &[CellHandle] {
        self.selection.cells()
    }

    pub fn overlay(&self) -> Option<&CodeOverlay> {
        self.overlay.as_ref()
    }

    /// False while a modal overlay blocks the diagram.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn container_height(&self) -> f64 {
        self.container_height
    }

    /// Result of the last sizing pass that found something to size.
    pub fn sizing(&self) -> Option<SizingOutcome> {
        self.sizing
    }

    pub fn toolbar_window(&self) -> &FloatingWindow {
        &self.toolbar
    }

    pub fn outline_window(&self) -> &FloatingWindow {
        &self.outline
    }

    /// Toolbar items with their resolved icon URLs.
    pub fn toolbar(&self) -> Vec<(ToolbarItem, String)> {
        toolbar_items()
            .into_iter()
            .map(|item| {
                let url = item.icon_url(&self.environment.origin, &self.environment.pathname);
                (item, url)
            })
            .collect()
    }

    /// Cell by its layout id.
    pub fn lookup(&self, id: &str) -> Option<CellHandle> {
        self.scene.lookup(id)
    }

    /// Replace the selection and update highlighting.
    pub fn select(&mut self, cells: &[CellHandle]) -> SelectionChange {
        if !self.enabled {
            return SelectionChange::default();
        }
        let change = self.selection.set(cells);
        self.notify(&change);
        change
    }

    /// Click on `cell` (or on the background when `None`).
    ///
    /// A plain click selects only that cell; an additive click toggles it.
    pub fn click(&mut self, cell: Option<CellHandle>, additive: bool) -> SelectionChange {
        if !self.enabled {
            return SelectionChange::default();
        }
        let change = match (cell, additive) {
            (Some(c), true) => self.selection.toggle(c),
            (Some(c), false) => self.selection.set(&[c]),
            (None, true) => SelectionChange::default(),
            (None, false) => self.selection.clear(),
        };
        self.notify(&change);
        change
    }

    fn notify(&mut self, change: &SelectionChange) {
        if change.is_empty() {
            return;
        }
        debug!(added = change.added.len(), removed = change.removed.len(); "Selection changed");
        self.highlighter
            .on_selection_changed(&mut self.scene, &change.added, &change.removed);
    }

    /// Double-click on `cell` at host position `at`. Opens the overlay for edges.
    pub fn double_click(&mut self, cell: CellHandle, at: Point) -> Option<&CodeOverlay> {
        if !self.enabled {
            return None;
        }
        let overlay = self.highlighter.on_double_click(&self.scene, cell, at)?;
        self.overlay = Some(overlay);
        self.enabled = false;
        self.overlay.as_ref()
    }

    /// Close the overlay (backdrop click or close button) and re-enable the diagram.
    pub fn dismiss_overlay(&mut self) {
        if self.overlay.take().is_some() {
            debug!("Source overlay dismissed");
        }
        self.enabled = true;
    }

    /// Run a toolbar action. Poster print returns the computed print scale.
    pub fn run_toolbar(&mut self, action: ToolbarAction, page_count: u32) -> Option<f64> {
        match action {
            ToolbarAction::ZoomIn => self.viewport.zoom_in(),
            ToolbarAction::ZoomOut => self.viewport.zoom_out(),
            ToolbarAction::ActualSize => {
                self.viewport.actual_size();
                let frame = self.environment.frame;
                self.adjust_size(&frame);
            }
            ToolbarAction::PosterPrint => {
                let scale = scale_for_page_count(
                    page_count,
                    self.scene.graph_bounds(),
                    PAGE_A4_PORTRAIT,
                );
                info!(page_count, scale; "Poster print scale computed");
                return Some(scale);
            }
        }
        None
    }

    /// Fit the container to the rendered bounds for a frame of the given width.
    ///
    /// Returns `None` and changes nothing when the scene has no extent.
    pub fn adjust_size(&mut self, frame: &FrameMetrics) -> Option<SizingOutcome> {
        let bounds = self.scene.graph_bounds();
        if bounds.width <= 0.0 || frame.frame_width <= 0.0 {
            debug!("Empty graph, sizing pass skipped");
            return None;
        }
        let ratio = frame.frame_width / bounds.width;
        let container_height = bounds.height * ratio;
        self.container_height = container_height;

        let container = (frame.frame_width, container_height);
        let fitted = frame.frame_width < bounds.width;
        if fitted {
            self.viewport.fit(bounds, container);
        }
        self.viewport.center(bounds, container);

        let outcome = SizingOutcome {
            container_height,
            frame_height: container_height + FRAME_MARGIN,
            output_height: frame
                .nested_in_output
                .then_some(bounds.height * ratio + FRAME_MARGIN),
            parent_frame_height: frame
                .parent_graph_height
                .map(|h| h + FRAME_MARGIN + container_height + FRAME_MARGIN),
            fitted,
        };
        debug!(container_height, fitted; "Sizing pass");
        self.sizing = Some(outcome);
        Some(outcome)
    }

    /// Outline of the graph scaled into an outline area of `outline` size,
    /// with the region visible in a canvas of `container` size.
    pub fn outline_view(&self, outline: (f64, f64), container: (f64, f64)) -> OutlineView {
        let graph = self.scene.graph_bounds();
        let scale = if graph.width > 0.0 && graph.height > 0.0 {
            (outline.0 / graph.width).min(outline.1 / graph.height)
        } else {
            1.0
        };
        let region = self.viewport.visible_region(container);
        let visible = Bounds::new(
            (region.x - graph.x) * scale,
            (region.y - graph.y) * scale,
            region.width * scale,
            region.height * scale,
        );
        OutlineView {
            scale,
            graph,
            visible,
        }
    }

    /// Outline sized for the default outline window and the host frame.
    pub fn default_outline_view(&self) -> OutlineView {
        let win = self.outline.bounds;
        self.outline_view(
            (win.width, win.height),
            (self.environment.frame.frame_width, self.container_height),
        )
    }
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("cells", &self.scene.cells().count())
            .field("viewport", &self.viewport)
            .field("sizing", &self.sizing)
            .field("enabled", &self.enabled)
            .finish()
    }
}
