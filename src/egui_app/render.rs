#![cfg(feature = "egui")]

use eframe::egui::epaint::{Mesh, Shape};
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Stroke, Vec2};

use crate::color::Rgb;
use crate::geometry::Point;
use crate::scene::{CellHandle, Scene};
use crate::session::Viewport;
use crate::shape::ShapeRegistry;
use crate::style::{CellStyle, ShapeKind};

use super::geometry::{arrow_head, ellipse_points, to_screen, triangulate};

const LABEL_FONT_SIZE: f32 = 11.0;
const SELECTION_COLOR: Color32 = Color32::from_rgb(0, 160, 0);

pub(crate) fn rgb_to_color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

/// Everything needed to map scene geometry onto the canvas.
pub struct CanvasContext<'a> {
    pub painter: &'a egui::Painter,
    pub viewport: &'a Viewport,
    pub origin: Pos2,
}

impl CanvasContext<'_> {
    fn pos(&self, p: Point) -> Pos2 {
        to_screen(self.viewport, self.origin, p)
    }

    fn scale(&self) -> f32 {
        self.viewport.scale as f32
    }

    fn stroke(&self, style: &CellStyle) -> Stroke {
        if style.stroke_width <= 0.0 {
            Stroke::NONE
        } else {
            Stroke::new(
                (style.stroke_width as f32 * self.scale()).max(0.5),
                rgb_to_color32(style.stroke_color),
            )
        }
    }
}

fn fill_of(style: &CellStyle) -> Color32 {
    style
        .fill_color
        .map(rgb_to_color32)
        .unwrap_or(Color32::TRANSPARENT)
}

fn fill_polygon(painter: &egui::Painter, points: &[Pos2], fill: Color32) {
    if fill == Color32::TRANSPARENT {
        return;
    }
    let mut mesh = Mesh::default();
    for p in points {
        mesh.colored_vertex(*p, fill);
    }
    for [a, b, c] in triangulate(points) {
        mesh.add_triangle(a, b, c);
    }
    painter.add(Shape::mesh(mesh));
}

/// Paint one vertex with its label.
pub fn paint_vertex(
    cx: &CanvasContext<'_>,
    scene: &Scene,
    shapes: &ShapeRegistry,
    handle: CellHandle,
    selected: bool,
) {
    let Some(b) = scene.absolute_bounds(handle) else {
        return;
    };
    let style = scene.style_of(handle);
    let fill = fill_of(&style);
    let mut stroke = cx.stroke(&style);
    if selected {
        stroke = Stroke::new(stroke.width.max(1.0) + 1.0, SELECTION_COLOR);
    }
    let min = cx.pos(b.origin());
    let max = cx.pos(Point::new(b.right(), b.bottom()));
    let rect_points = vec![min, Pos2::new(max.x, min.y), max, Pos2::new(min.x, max.y)];
    let mut label_at = cx.pos(Point::new(
        b.x + style.spacing_left + (b.width - style.spacing_left - style.spacing_right) / 2.0,
        b.y + b.height / 2.0,
    ));

    match &style.shape {
        ShapeKind::Swimlane { start_size } => {
            let header = (*start_size as f64).min(b.height);
            cx.painter
                .add(Shape::convex_polygon(rect_points, fill, stroke));
            let y = cx.pos(Point::new(b.x, b.y + header)).y;
            cx.painter
                .line_segment([Pos2::new(min.x, y), Pos2::new(max.x, y)], stroke);
            label_at.y = cx.pos(Point::new(b.x, b.y + header / 2.0)).y;
        }
        ShapeKind::Ellipse | ShapeKind::DoubleEllipse => {
            let center = Pos2::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
            let radius = Vec2::new((max.x - min.x) / 2.0, (max.y - min.y) / 2.0);
            cx.painter.add(Shape::convex_polygon(
                ellipse_points(center, radius, 48),
                fill,
                stroke,
            ));
            if style.shape == ShapeKind::DoubleEllipse {
                let inset = 3.0 * cx.scale();
                let inner = Vec2::new((radius.x - inset).max(0.0), (radius.y - inset).max(0.0));
                cx.painter.add(Shape::closed_line(
                    ellipse_points(center, inner, 48),
                    stroke,
                ));
            }
        }
        ShapeKind::Custom(name) => {
            let outline: Vec<Pos2> = match shapes.get(name) {
                Some(shape) => {
                    let mut pts: Vec<Pos2> = shape
                        .outline_at(b, 1.0)
                        .into_iter()
                        .map(|p| cx.pos(p))
                        .collect();
                    // The outline repeats its first point.
                    if pts.len() > 1 && pts.first() == pts.last() {
                        pts.pop();
                    }
                    pts
                }
                None => rect_points,
            };
            fill_polygon(cx.painter, &outline, fill);
            cx.painter.add(Shape::closed_line(outline, stroke));
        }
        ShapeKind::Rectangle | ShapeKind::Connector => {
            cx.painter
                .add(Shape::convex_polygon(rect_points, fill, stroke));
        }
    }

    let label = scene.display_label(handle);
    if !label.is_empty() {
        cx.painter.text(
            label_at,
            Align2::CENTER_CENTER,
            label,
            FontId::proportional((LABEL_FONT_SIZE * cx.scale()).max(4.0)),
            rgb_to_color32(style.font_color),
        );
    }
}

/// Paint one edge: route, dash pattern and arrow head.
pub fn paint_edge(cx: &CanvasContext<'_>, scene: &Scene, handle: CellHandle) {
    let route: Vec<Pos2> = scene
        .absolute_route(handle)
        .into_iter()
        .map(|p| cx.pos(p))
        .collect();
    if route.len() < 2 {
        return;
    }
    let style = scene.style_of(handle);
    let stroke = cx.stroke(&style);

    match &style.dash_pattern {
        Some(dash) if dash.len() >= 2 => {
            let unit = if style.fix_dash {
                cx.scale()
            } else {
                cx.scale() * style.stroke_width as f32
            };
            cx.painter.extend(Shape::dashed_line(
                &route,
                stroke,
                dash[0] as f32 * unit,
                dash[1] as f32 * unit,
            ));
        }
        _ => {
            cx.painter.add(Shape::line(route.clone(), stroke));
        }
    }

    if style.end_arrow {
        let n = route.len();
        let head = arrow_head(route[n - 2], route[n - 1], (8.0 * cx.scale()).max(3.0));
        cx.painter
            .add(Shape::convex_polygon(head.to_vec(), stroke.color, Stroke::NONE));
    }
}

/// Paint the whole scene: vertices first, edges on top.
pub fn paint_scene(
    cx: &CanvasContext<'_>,
    scene: &Scene,
    shapes: &ShapeRegistry,
    selection: &[CellHandle],
) {
    for (h, _) in scene.vertices() {
        paint_vertex(cx, scene, shapes, h, selection.contains(&h));
    }
    for (h, _) in scene.edges() {
        paint_edge(cx, scene, h);
    }
}
