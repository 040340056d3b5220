//! Plain 2D geometry in layout units.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Bounds {
        Bounds::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        Bounds::new(x, y, r - x, b - y)
    }

    /// Grow to include `p`.
    pub fn include(&self, p: Point) -> Bounds {
        self.union(&Bounds::new(p.x, p.y, 0.0, 0.0))
    }

    /// Point where the ray from the center towards `toward` leaves the rectangle.
    pub fn perimeter_point(&self, toward: Point) -> Point {
        let c = self.center();
        let dx = toward.x - c.x;
        let dy = toward.y - c.y;
        if dx == 0.0 && dy == 0.0 {
            return c;
        }
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        let tx = if dx != 0.0 { hw / dx.abs() } else { f64::INFINITY };
        let ty = if dy != 0.0 { hh / dy.abs() } else { f64::INFINITY };
        let t = tx.min(ty);
        Point::new(c.x + dx * t, c.y + dy * t)
    }
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let vx = b.x - a.x;
    let vy = b.y - a.y;
    let len2 = vx * vx + vy * vy;
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * vx + (p.y - a.y) * vy) / len2).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * vx, a.y + t * vy))
}

/// Shortest distance from `p` to a polyline. `None` for fewer than two points.
pub fn distance_to_polyline(p: Point, line: &[Point]) -> Option<f64> {
    line.windows(2)
        .map(|w| distance_to_segment(p, w[0], w[1]))
        .reduce(f64::min)
}
