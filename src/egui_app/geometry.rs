#![cfg(feature = "egui")]

use eframe::egui::{Pos2, Vec2};

use crate::geometry::Point;
use crate::session::Viewport;

/// Scene point to screen position for a canvas whose top-left is `origin`.
pub fn to_screen(viewport: &Viewport, origin: Pos2, p: Point) -> Pos2 {
    let v = viewport.to_view(p);
    Pos2::new(origin.x + v.x as f32, origin.y + v.y as f32)
}

/// Screen position back to a scene point.
pub fn to_scene(viewport: &Viewport, origin: Pos2, pos: Pos2) -> Point {
    viewport.to_scene(Point::new(
        (pos.x - origin.x) as f64,
        (pos.y - origin.y) as f64,
    ))
}

/// Pan by a screen-space drag delta.
pub fn pan_by(viewport: &mut Viewport, delta: Vec2) {
    viewport.translate = viewport
        .translate
        .offset(delta.x as f64 / viewport.scale, delta.y as f64 / viewport.scale);
}

/// Multiply the scale by `factor`, keeping the scene point under `anchor` fixed.
pub fn zoom_about(viewport: &mut Viewport, origin: Pos2, anchor: Pos2, factor: f64) {
    let fixed = to_scene(viewport, origin, anchor);
    viewport.scale = (viewport.scale * factor).clamp(0.05, 20.0);
    let ax = (anchor.x - origin.x) as f64 / viewport.scale;
    let ay = (anchor.y - origin.y) as f64 / viewport.scale;
    viewport.translate = Point::new(ax - fixed.x, ay - fixed.y);
}

/// Polygon approximation of an axis-aligned ellipse.
pub fn ellipse_points(center: Pos2, radius: Vec2, segments: usize) -> Vec<Pos2> {
    let n = segments.max(8);
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32 * std::f32::consts::TAU;
            Pos2::new(center.x + radius.x * t.cos(), center.y + radius.y * t.sin())
        })
        .collect()
}

/// Filled triangle of an arrow head ending at `tip`, pointing away from `from`.
pub fn arrow_head(from: Pos2, tip: Pos2, size: f32) -> [Pos2; 3] {
    let dir = (tip - from).normalized();
    let dir = if dir.x.is_finite() && dir.y.is_finite() {
        dir
    } else {
        Vec2::X
    };
    let normal = Vec2::new(-dir.y, dir.x);
    let base = tip - dir * size;
    [tip, base + normal * size * 0.5, base - normal * size * 0.5]
}

fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn inside_triangle(p: Pos2, a: Pos2, b: Pos2, c: Pos2) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(neg && pos)
}

/// Ear-clipping triangulation of a simple polygon (no repeated closing point).
///
/// Port glyphs are not convex, so they cannot be filled as a single convex path.
pub fn triangulate(points: &[Pos2]) -> Vec<[u32; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    let area: f32 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    let orientation = if area >= 0.0 { 1.0 } else { -1.0 };

    let mut idx: Vec<usize> = (0..n).collect();
    let mut out = Vec::with_capacity(n - 2);
    let mut guard = 0;
    while idx.len() > 3 && guard < n * n {
        guard += 1;
        let m = idx.len();
        let mut clipped = false;
        for i in 0..m {
            let (ia, ib, ic) = (idx[(i + m - 1) % m], idx[i], idx[(i + 1) % m]);
            let (a, b, c) = (points[ia], points[ib], points[ic]);
            if cross(a, b, c) * orientation <= 0.0 {
                continue;
            }
            let blocked = idx
                .iter()
                .filter(|&&j| j != ia && j != ib && j != ic)
                .any(|&j| inside_triangle(points[j], a, b, c));
            if blocked {
                continue;
            }
            out.push([ia as u32, ib as u32, ic as u32]);
            idx.remove(i);
            clipped = true;
            break;
        }
        if !clipped {
            break;
        }
    }
    if idx.len() == 3 {
        out.push([idx[0] as u32, idx[1] as u32, idx[2] as u32]);
    }
    out
}
