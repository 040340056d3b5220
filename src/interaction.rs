//! Selection highlighting and the double-click source overlay.
//!
//! Interaction never changes structure: it only rewrites presentation
//! overrides (stroke colour and width) of existing edges, and produces a
//! [`CodeOverlay`] description for the host to display.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::geometry::Point;
use crate::scene::{CellHandle, EdgeStroke, Surface};

/// Receives user interaction on a surface.
pub trait InteractionObserver {
    /// Called once per selection change with the cells that entered and left the selection.
    fn on_selection_changed(
        &mut self,
        surface: &mut dyn Surface,
        added: &[CellHandle],
        removed: &[CellHandle],
    );

    /// Called when a cell is double-clicked at `at` (host coordinates).
    fn on_double_click(
        &mut self,
        surface: &dyn Surface,
        cell: CellHandle,
        at: Point,
    ) -> Option<CodeOverlay>;
}

/// Colours and widths used when highlighting edges of a selected cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightPalette {
    /// Edges leaving the selected cell.
    pub outgoing: Rgb,
    /// Edges entering the selected cell.
    pub incoming: Rgb,
    /// Colour restored when the cell is deselected.
    pub normal: Rgb,
    pub highlight_width: f64,
    pub normal_width: f64,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            outgoing: Rgb::BLUE,
            incoming: Rgb::RED,
            normal: Rgb::BLACK,
            highlight_width: 2.0,
            normal_width: 1.0,
        }
    }
}

/// Recolours the edges touching selected cells.
#[derive(Debug, Clone, Default)]
pub struct EdgeHighlighter {
    pub palette: HighlightPalette,
}

impl EdgeHighlighter {
    pub fn new(palette: HighlightPalette) -> Self {
        Self { palette }
    }

    fn is_highlightable(surface: &dyn Surface, cell: CellHandle) -> bool {
        surface
            .cell(cell)
            .and_then(|c| c.tag)
            .is_some_and(|t| t.is_highlightable())
    }

    fn reset(&self, surface: &mut dyn Surface, cell: CellHandle) {
        let stroke = EdgeStroke {
            color: self.palette.normal,
            font_color: self.palette.normal,
            width: self.palette.normal_width,
        };
        for edge in surface.edges_of(cell) {
            surface.set_edge_stroke(edge, stroke);
        }
    }

    fn highlight(&self, surface: &mut dyn Surface, cell: CellHandle) {
        for edge in surface.edges_of(cell) {
            let Some(e) = surface.cell(edge) else { continue };
            let color = if e.source() == Some(cell) {
                self.palette.outgoing
            } else if e.target() == Some(cell) {
                self.palette.incoming
            } else {
                continue;
            };
            surface.set_edge_stroke(
                edge,
                EdgeStroke {
                    color,
                    font_color: color,
                    width: self.palette.highlight_width,
                },
            );
        }
    }
}

impl InteractionObserver for EdgeHighlighter {
    fn on_selection_changed(
        &mut self,
        surface: &mut dyn Surface,
        added: &[CellHandle],
        removed: &[CellHandle],
    ) {
        surface.begin_update();
        for &cell in removed {
            if Self::is_highlightable(surface, cell) {
                self.reset(surface, cell);
            }
        }
        for &cell in added {
            if Self::is_highlightable(surface, cell) {
                self.highlight(surface, cell);
            }
        }
        surface.end_update();
    }

    fn on_double_click(
        &mut self,
        surface: &dyn Surface,
        cell: CellHandle,
        at: Point,
    ) -> Option<CodeOverlay> {
        let c = surface.cell(cell)?;
        if !c.is_edge() {
            return None;
        }
        debug!(edge = c.id.as_str(); "Opening source overlay");
        let (content, is_code) = match &c.value.code {
            Some(code) => (code.clone(), true),
            None => (c.value.label.clone(), false),
        };
        Some(CodeOverlay::at(content, is_code, at))
    }
}

/// Modal window showing the source attached to an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeOverlay {
    pub title: String,
    pub content: String,
    /// False when the content is the fallback string value of the cell.
    pub is_code: bool,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CodeOverlay {
    pub const WIDTH: f64 = 800.0;
    pub const HEIGHT: f64 = 300.0;

    /// Overlay centred horizontally on the click, kept clear of the top-left toolbars.
    pub fn at(content: String, is_code: bool, click: Point) -> Self {
        Self {
            title: "SourceCode".to_string(),
            content,
            is_code,
            x: (click.x - Self::WIDTH / 2.0).max(100.0),
            y: click.y.max(10.0),
            width: Self::WIDTH,
            height: Self::HEIGHT,
        }
    }
}

/// Result of a selection operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub added: Vec<CellHandle>,
    pub removed: Vec<CellHandle>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Ordered set of selected cells.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    selected: Vec<CellHandle>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[CellHandle] {
        &self.selected
    }

    pub fn is_selected(&self, cell: CellHandle) -> bool {
        self.selected.contains(&cell)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Replace the selection.
    pub fn set(&mut self, cells: &[CellHandle]) -> SelectionChange {
        let removed = self
            .selected
            .iter()
            .copied()
            .filter(|c| !cells.contains(c))
            .collect();
        let mut added = Vec::new();
        for &c in cells {
            if !self.selected.contains(&c) && !added.contains(&c) {
                added.push(c);
            }
        }
        self.selected.clear();
        for &c in cells {
            if !self.selected.contains(&c) {
                self.selected.push(c);
            }
        }
        SelectionChange { added, removed }
    }

    /// Add the cell if absent, remove it if present.
    pub fn toggle(&mut self, cell: CellHandle) -> SelectionChange {
        if let Some(pos) = self.selected.iter().position(|&c| c == cell) {
            self.selected.remove(pos);
            SelectionChange {
                added: Vec::new(),
                removed: vec![cell],
            }
        } else {
            self.selected.push(cell);
            SelectionChange {
                added: vec![cell],
                removed: Vec::new(),
            }
        }
    }

    pub fn clear(&mut self) -> SelectionChange {
        SelectionChange {
            added: Vec::new(),
            removed: std::mem::take(&mut self.selected),
        }
    }
}
