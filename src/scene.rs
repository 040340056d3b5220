//! The visual scene graph and the [`Surface`] abstraction over it.
//!
//! A [`Surface`] is whatever owns cells, their geometry and their styles.
//! The materializer and the interaction layer only talk to the trait;
//! [`Scene`] is the in-memory implementation the exporters and the viewer
//! render from.
//!
//! Cells live in an arena indexed by [`CellHandle`]. Vertex geometry is
//! relative to the parent cell, edge points are relative to the edge's
//! parent, as in the layout result.

use indexmap::IndexMap;
use log::trace;

use crate::error::RenderError;
use crate::geometry::{Bounds, Point, distance_to_polyline};
use crate::style::{CellStyle, StyleOverrides, StyleTag, Stylesheet};

/// Index of a cell in its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellHandle(usize);

impl CellHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Data attached to a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellValue {
    pub label: String,
    /// Source text of a transition/update, shown on double-click.
    pub code: Option<String>,
    /// Tooltip text.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// The root layer all top-level cells hang off.
    Layer,
    Vertex,
    Edge {
        source: CellHandle,
        target: CellHandle,
    },
    /// Zero-size attachment point owned by an edge.
    Anchor,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub id: String,
    pub value: CellValue,
    pub kind: CellKind,
    /// Vertex bounds relative to the parent; unused for edges.
    pub bounds: Bounds,
    /// Edge route points relative to the parent; unused for vertices.
    pub points: Vec<Point>,
    pub tag: Option<StyleTag>,
    pub overrides: StyleOverrides,
    pub parent: Option<CellHandle>,
    pub children: Vec<CellHandle>,
    /// Edges connected to this vertex, in insertion order.
    pub edges: Vec<CellHandle>,
}

impl Cell {
    pub fn is_vertex(&self) -> bool {
        matches!(self.kind, CellKind::Vertex)
    }

    pub fn is_edge(&self) -> bool {
        matches!(self.kind, CellKind::Edge { .. })
    }

    pub fn source(&self) -> Option<CellHandle> {
        match self.kind {
            CellKind::Edge { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<CellHandle> {
        match self.kind {
            CellKind::Edge { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// What to insert as a vertex.
#[derive(Debug, Clone)]
pub struct VertexSpec {
    pub id: String,
    pub value: CellValue,
    pub bounds: Bounds,
    pub tag: Option<StyleTag>,
}

/// What to insert as an edge.
#[derive(Debug, Clone)]
pub struct EdgeSpec {
    pub id: String,
    pub value: CellValue,
    pub source: CellHandle,
    pub target: CellHandle,
    pub tag: Option<StyleTag>,
}

/// Presentation attributes of an edge that interaction may change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStroke {
    pub color: crate::color::Rgb,
    pub font_color: crate::color::Rgb,
    pub width: f64,
}

/// A rendering surface: owns cells and lets callers build and restyle them.
pub trait Surface {
    /// Start a batch of changes. Batches nest.
    fn begin_update(&mut self);

    /// Close a batch. The surface refreshes once the outermost batch closes.
    fn end_update(&mut self);

    /// Cell new top-level cells are attached to.
    fn default_parent(&self) -> CellHandle;

    /// Insert a vertex under `parent`, or under the default parent when `None`.
    fn insert_vertex(
        &mut self,
        parent: Option<CellHandle>,
        spec: VertexSpec,
    ) -> Result<CellHandle, RenderError>;

    /// Insert an edge under `parent`, or under the default parent when `None`.
    fn insert_edge(
        &mut self,
        parent: Option<CellHandle>,
        spec: EdgeSpec,
    ) -> Result<CellHandle, RenderError>;

    /// Insert a zero-size anchor cell attached to `edge`.
    fn insert_anchor(
        &mut self,
        edge: CellHandle,
        id: String,
        label: String,
        overrides: StyleOverrides,
    ) -> Result<CellHandle, RenderError>;

    fn lookup(&self, id: &str) -> Option<CellHandle>;

    fn cell(&self, handle: CellHandle) -> Option<&Cell>;

    fn edge_points(&self, edge: CellHandle) -> Vec<Point>;

    fn set_edge_points(&mut self, edge: CellHandle, points: Vec<Point>);

    /// Edges touching `vertex`.
    fn edges_of(&self, vertex: CellHandle) -> Vec<CellHandle>;

    fn set_edge_stroke(&mut self, edge: CellHandle, stroke: EdgeStroke);
}

/// In-memory scene graph.
#[derive(Debug, Clone)]
pub struct Scene {
    cells: Vec<Cell>,
    index: IndexMap<String, CellHandle>,
    stylesheet: Stylesheet,
    update_level: usize,
    dirty: bool,
    revision: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Stylesheet::default())
    }
}

impl Scene {
    /// Empty scene holding only the root layer, which uses the `root` style.
    pub fn new(stylesheet: Stylesheet) -> Self {
        let layer = Cell {
            id: String::new(),
            value: CellValue::default(),
            kind: CellKind::Layer,
            bounds: Bounds::default(),
            points: Vec::new(),
            tag: Some(StyleTag::Root),
            overrides: StyleOverrides::default(),
            parent: None,
            children: Vec::new(),
            edges: Vec::new(),
        };
        Self {
            cells: vec![layer],
            index: IndexMap::new(),
            stylesheet,
            update_level: 0,
            dirty: false,
            revision: 0,
        }
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    /// Number of completed refreshes. Advances once per outermost update that changed something.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_updating(&self) -> bool {
        self.update_level > 0
    }

    /// All cells except the root layer, in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = (CellHandle, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| (CellHandle(i), c))
    }

    pub fn vertices(&self) -> impl Iterator<Item = (CellHandle, &Cell)> {
        self.cells().filter(|(_, c)| c.is_vertex())
    }

    pub fn edges(&self) -> impl Iterator<Item = (CellHandle, &Cell)> {
        self.cells().filter(|(_, c)| c.is_edge())
    }

    pub fn anchors(&self) -> impl Iterator<Item = (CellHandle, &Cell)> {
        self.cells()
            .filter(|(_, c)| matches!(c.kind, CellKind::Anchor))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Resolved style of a cell: its tag's style with the cell's overrides applied.
    pub fn style_of(&self, handle: CellHandle) -> CellStyle {
        let Some(cell) = self.cell(handle) else {
            return self.stylesheet.default_vertex_style().clone();
        };
        let mut style = self.stylesheet.resolve(cell.tag, cell.is_edge());
        cell.overrides.apply(&mut style);
        style
    }

    /// Text shown on the cell. Edges display no label.
    pub fn display_label(&self, handle: CellHandle) -> &str {
        match self.cell(handle) {
            Some(c) if c.is_vertex() => &c.value.label,
            _ => "",
        }
    }

    /// Tooltip: the attached text when present, otherwise the label.
    pub fn tooltip(&self, handle: CellHandle) -> Option<&str> {
        let cell = self.cell(handle)?;
        Some(cell.value.text.as_deref().unwrap_or(&cell.value.label))
    }

    /// Origin of the coordinate space children of `handle` are placed in.
    pub fn absolute_origin(&self, handle: CellHandle) -> Point {
        let mut origin = Point::default();
        let mut cur = Some(handle);
        while let Some(h) = cur {
            let cell = &self.cells[h.0];
            if cell.is_vertex() {
                origin = origin.offset(cell.bounds.x, cell.bounds.y);
            }
            cur = cell.parent;
        }
        origin
    }

    /// Vertex bounds in scene coordinates.
    pub fn absolute_bounds(&self, handle: CellHandle) -> Option<Bounds> {
        let cell = self.cell(handle)?;
        let origin = cell
            .parent
            .map(|p| self.absolute_origin(p))
            .unwrap_or_default();
        Some(cell.bounds.translate(origin.x, origin.y))
    }

    /// Edge route in scene coordinates: source perimeter point, route points.
    ///
    /// When the route is empty the target perimeter point is appended so the
    /// edge is still drawn as a straight connector.
    pub fn absolute_route(&self, edge: CellHandle) -> Vec<Point> {
        let Some(cell) = self.cell(edge) else {
            return Vec::new();
        };
        let (Some(source), Some(target)) = (cell.source(), cell.target()) else {
            return Vec::new();
        };
        let origin = cell
            .parent
            .map(|p| self.absolute_origin(p))
            .unwrap_or_default();
        let mut route: Vec<Point> = cell
            .points
            .iter()
            .map(|p| p.offset(origin.x, origin.y))
            .collect();
        let src = self.absolute_bounds(source).unwrap_or_default();
        let tgt = self.absolute_bounds(target).unwrap_or_default();
        let toward = route.first().copied().unwrap_or_else(|| tgt.center());
        let start = src.perimeter_point(toward);
        if route.is_empty() {
            route.push(tgt.perimeter_point(src.center()));
        }
        route.insert(0, start);
        route
    }

    /// Bounds of everything drawn: vertices and edge routes.
    pub fn graph_bounds(&self) -> Bounds {
        let mut acc: Option<Bounds> = None;
        for (h, _) in self.vertices() {
            if let Some(b) = self.absolute_bounds(h) {
                acc = Some(acc.map_or(b, |a| a.union(&b)));
            }
        }
        for (h, _) in self.edges() {
            for p in self.absolute_route(h) {
                acc = Some(acc.map_or(Bounds::new(p.x, p.y, 0.0, 0.0), |a| a.include(p)));
            }
        }
        acc.unwrap_or_default()
    }

    /// Topmost cell under `p`: edges within `tolerance` win, then the deepest vertex.
    pub fn cell_at(&self, p: Point, tolerance: f64) -> Option<CellHandle> {
        let edge_hit = self
            .edges()
            .filter_map(|(h, _)| {
                distance_to_polyline(p, &self.absolute_route(h))
                    .filter(|d| *d <= tolerance)
                    .map(|d| (h, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(h, _)| h);
        if edge_hit.is_some() {
            return edge_hit;
        }
        self.vertices()
            .filter(|(h, _)| self.absolute_bounds(*h).is_some_and(|b| b.contains(p)))
            .max_by_key(|(h, _)| self.depth(*h))
            .map(|(h, _)| h)
    }

    fn depth(&self, handle: CellHandle) -> usize {
        let mut depth = 0;
        let mut cur = self.cells[handle.0].parent;
        while let Some(h) = cur {
            depth += 1;
            cur = self.cells[h.0].parent;
        }
        depth
    }

    fn push(&mut self, cell: Cell) -> Result<CellHandle, RenderError> {
        if !cell.id.is_empty() && self.index.contains_key(&cell.id) {
            return Err(RenderError::DuplicateCellId(cell.id));
        }
        let handle = CellHandle(self.cells.len());
        if let Some(parent) = cell.parent {
            self.cells[parent.0].children.push(handle);
        }
        if !cell.id.is_empty() {
            self.index.insert(cell.id.clone(), handle);
        }
        trace!(id = cell.id.as_str(), handle = handle.0; "Cell inserted");
        self.cells.push(cell);
        self.touch();
        Ok(handle)
    }

    fn check(&self, handle: CellHandle) -> Result<(), RenderError> {
        if handle.0 < self.cells.len() {
            Ok(())
        } else {
            Err(RenderError::UnknownCell(format!("#{}", handle.0)))
        }
    }

    fn touch(&mut self) {
        self.dirty = true;
        if self.update_level == 0 {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        if self.dirty {
            self.revision += 1;
            self.dirty = false;
        }
    }
}

impl Surface for Scene {
    fn begin_update(&mut self) {
        self.update_level += 1;
    }

    fn end_update(&mut self) {
        self.update_level = self.update_level.saturating_sub(1);
        if self.update_level == 0 {
            self.refresh();
        }
    }

    fn default_parent(&self) -> CellHandle {
        CellHandle(0)
    }

    fn insert_vertex(
        &mut self,
        parent: Option<CellHandle>,
        spec: VertexSpec,
    ) -> Result<CellHandle, RenderError> {
        let parent = parent.unwrap_or(self.default_parent());
        self.check(parent)?;
        self.push(Cell {
            id: spec.id,
            value: spec.value,
            kind: CellKind::Vertex,
            bounds: spec.bounds,
            points: Vec::new(),
            tag: spec.tag,
            overrides: StyleOverrides::default(),
            parent: Some(parent),
            children: Vec::new(),
            edges: Vec::new(),
        })
    }

    fn insert_edge(
        &mut self,
        parent: Option<CellHandle>,
        spec: EdgeSpec,
    ) -> Result<CellHandle, RenderError> {
        let parent = parent.unwrap_or(self.default_parent());
        self.check(parent)?;
        self.check(spec.source)?;
        self.check(spec.target)?;
        let handle = self.push(Cell {
            id: spec.id,
            value: spec.value,
            kind: CellKind::Edge {
                source: spec.source,
                target: spec.target,
            },
            bounds: Bounds::default(),
            points: Vec::new(),
            tag: spec.tag,
            overrides: StyleOverrides::default(),
            parent: Some(parent),
            children: Vec::new(),
            edges: Vec::new(),
        })?;
        self.cells[spec.source.0].edges.push(handle);
        if spec.target != spec.source {
            self.cells[spec.target.0].edges.push(handle);
        }
        Ok(handle)
    }

    fn insert_anchor(
        &mut self,
        edge: CellHandle,
        id: String,
        label: String,
        overrides: StyleOverrides,
    ) -> Result<CellHandle, RenderError> {
        self.check(edge)?;
        self.push(Cell {
            id,
            value: CellValue {
                label,
                ..CellValue::default()
            },
            kind: CellKind::Anchor,
            bounds: Bounds::default(),
            points: Vec::new(),
            tag: None,
            overrides,
            parent: Some(edge),
            children: Vec::new(),
            edges: Vec::new(),
        })
    }

    fn lookup(&self, id: &str) -> Option<CellHandle> {
        self.index.get(id).copied()
    }

    fn cell(&self, handle: CellHandle) -> Option<&Cell> {
        self.cells.get(handle.0)
    }

    fn edge_points(&self, edge: CellHandle) -> Vec<Point> {
        self.cell(edge).map(|c| c.points.clone()).unwrap_or_default()
    }

    fn set_edge_points(&mut self, edge: CellHandle, points: Vec<Point>) {
        if let Some(cell) = self.cells.get_mut(edge.0) {
            cell.points = points;
            self.touch();
        }
    }

    fn edges_of(&self, vertex: CellHandle) -> Vec<CellHandle> {
        self.cell(vertex).map(|c| c.edges.clone()).unwrap_or_default()
    }

    fn set_edge_stroke(&mut self, edge: CellHandle, stroke: EdgeStroke) {
        if let Some(cell) = self.cells.get_mut(edge.0) {
            cell.overrides.stroke_color = Some(stroke.color);
            cell.overrides.font_color = Some(stroke.font_color);
            cell.overrides.stroke_width = Some(stroke.width);
            self.touch();
        }
    }
}
