//! Custom connector glyphs for port cells.
//!
//! Ports are drawn as tapered rectangles: an output port gets a tip pointing
//! right at half height, an input port gets the mirrored notch on its left.
//! Both are parameterized by an `extrude` distance that is scaled with the view.

use indexmap::IndexMap;

use crate::geometry::{Bounds, Point};

/// Default extrude distance for the port glyphs, in layout units.
pub const DEFAULT_EXTRUDE: f64 = 10.0;

/// A named shape whose outline is computed from the cell bounds.
pub trait CustomShape: Send + Sync {
    /// Name the shape is registered under (used as the style's shape kind).
    fn name(&self) -> &'static str;

    /// Inset distance of the glyph's tip or notch, before scaling.
    fn extrude(&self) -> f64;

    /// Closed outline in cell-local coordinates (origin at the cell's top-left).
    /// The first point is repeated at the end.
    fn outline(&self, width: f64, height: f64, scale: f64) -> Vec<Point>;

    /// Outline translated into the coordinate space of `bounds`.
    fn outline_at(&self, bounds: Bounds, scale: f64) -> Vec<Point> {
        self.outline(bounds.width, bounds.height, scale)
            .into_iter()
            .map(|p| p.offset(bounds.x, bounds.y))
            .collect()
    }
}

/// Output port: rectangle with a right-pointing tip at half height.
#[derive(Debug, Clone, Copy)]
pub struct OutputShape {
    pub extrude: f64,
}

impl Default for OutputShape {
    fn default() -> Self {
        Self {
            extrude: DEFAULT_EXTRUDE,
        }
    }
}

impl CustomShape for OutputShape {
    fn name(&self) -> &'static str {
        "output"
    }

    fn extrude(&self) -> f64 {
        self.extrude
    }

    fn outline(&self, w: f64, h: f64, scale: f64) -> Vec<Point> {
        let dx = self.extrude * scale;
        vec![
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w + dx, h / 2.0),
            Point::new(w, h),
            Point::new(0.0, h),
            Point::new(0.0, 0.0),
        ]
    }
}

/// Input port: rectangle extended to the left with a notch cut in at half height.
#[derive(Debug, Clone, Copy)]
pub struct InputShape {
    pub extrude: f64,
}

impl Default for InputShape {
    fn default() -> Self {
        Self {
            extrude: DEFAULT_EXTRUDE,
        }
    }
}

impl CustomShape for InputShape {
    fn name(&self) -> &'static str {
        "input"
    }

    fn extrude(&self) -> f64 {
        self.extrude
    }

    fn outline(&self, w: f64, h: f64, scale: f64) -> Vec<Point> {
        let dx = self.extrude * scale;
        vec![
            Point::new(-dx, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(-dx, h),
            Point::new(0.0, h / 2.0),
            Point::new(-dx, 0.0),
        ]
    }
}

/// Named custom shapes available to the renderers.
#[derive(Default)]
pub struct ShapeRegistry {
    shapes: IndexMap<&'static str, Box<dyn CustomShape>>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the `input` and `output` port glyphs with the given extrude.
    pub fn with_port_glyphs(extrude: f64) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(OutputShape { extrude }));
        registry.register(Box::new(InputShape { extrude }));
        registry
    }

    /// Register a shape, replacing any shape of the same name.
    pub fn register(&mut self, shape: Box<dyn CustomShape>) {
        self.shapes.insert(shape.name(), shape);
    }

    pub fn get(&self, name: &str) -> Option<&dyn CustomShape> {
        self.shapes.get(name).map(|s| s.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.shapes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl std::fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.shapes.keys()).finish()
    }
}
