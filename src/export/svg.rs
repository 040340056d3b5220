use indexmap::IndexSet;
use log::debug;
use svg::{Document, Node};
use svg::node::element::{
    Definitions, Element, Ellipse, Group, Line, Marker, Path, Polygon, Rectangle, Text,
};

use crate::color::Rgb;
use crate::export::Exporter;
use crate::geometry::{Bounds, Point};
use crate::scene::{CellHandle, Scene, Surface};
use crate::session::RenderSession;
use crate::shape::ShapeRegistry;
use crate::style::{CellStyle, ShapeKind};

const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";
const FONT_SIZE: f64 = 11.0;
/// Gap between the two outlines of a double ellipse.
const DOUBLE_ELLIPSE_INSET: f64 = 3.0;

/// Renders a scene as a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    /// Blank space around the graph bounds.
    pub margin: f64,
    /// Emit `<title>` tooltips on every cell.
    pub tooltips: bool,
}

impl Default for SvgExporter {
    fn default() -> Self {
        Self {
            margin: 10.0,
            tooltips: true,
        }
    }
}

impl SvgExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the document for a scene.
    pub fn document(&self, scene: &Scene, shapes: &ShapeRegistry) -> Document {
        let bounds = scene.graph_bounds();
        let view = Bounds::new(
            bounds.x - self.margin,
            bounds.y - self.margin,
            bounds.width + 2.0 * self.margin,
            bounds.height + 2.0 * self.margin,
        );

        let mut doc = Document::new()
            .set(
                "viewBox",
                format!("{} {} {} {}", view.x, view.y, view.width, view.height),
            )
            .set("width", view.width)
            .set("height", view.height)
            .add(marker_definitions(scene));

        // Vertices come first so edges are drawn on top of containers.
        for (handle, _) in scene.vertices() {
            doc = doc.add(self.render_vertex(scene, shapes, handle));
        }
        for (handle, _) in scene.edges() {
            doc = doc.add(self.render_edge(scene, handle));
        }
        debug!(cells = scene.cells().count(); "SVG document rendered");
        doc
    }

    fn group_for(&self, scene: &Scene, handle: CellHandle, class: &str) -> Group {
        let mut group = Group::new().set("class", class);
        if let Some(cell) = scene.cell(handle) {
            group = group.set("data-cell-id", cell.id.as_str());
            if let Some(tag) = cell.tag {
                group = group.set("data-style", tag.as_str());
            }
        }
        if self.tooltips {
            if let Some(tip) = scene.tooltip(handle).filter(|t| !t.is_empty()) {
                let mut title = Element::new("title");
                title.append(svg::node::Text::new(tip));
                group = group.add(title);
            }
        }
        group
    }

    fn render_vertex(&self, scene: &Scene, shapes: &ShapeRegistry, handle: CellHandle) -> Group {
        let style = scene.style_of(handle);
        let b = scene.absolute_bounds(handle).unwrap_or_default();
        let mut group = self.group_for(scene, handle, "vertex");

        let fill = style
            .fill_color
            .map(Rgb::to_hex)
            .unwrap_or_else(|| "none".to_string());
        let stroke = stroke_attr(&style);

        let mut label_pos = Point::new(
            b.x + style.spacing_left + (b.width - style.spacing_left - style.spacing_right) / 2.0,
            b.y + b.height / 2.0,
        );

        match &style.shape {
            ShapeKind::Swimlane { start_size } => {
                let header = (*start_size as f64).min(b.height);
                group = group
                    .add(rect(b, &fill, &stroke, &style))
                    .add(
                        Line::new()
                            .set("x1", b.x)
                            .set("y1", b.y + header)
                            .set("x2", b.right())
                            .set("y2", b.y + header)
                            .set("stroke", stroke.as_str())
                            .set("stroke-width", style.stroke_width),
                    );
                label_pos.y = b.y + header / 2.0;
            }
            ShapeKind::Ellipse => {
                group = group.add(ellipse(b, 0.0, &fill, &stroke, &style));
            }
            ShapeKind::DoubleEllipse => {
                group = group
                    .add(ellipse(b, 0.0, &fill, &stroke, &style))
                    .add(ellipse(b, DOUBLE_ELLIPSE_INSET, "none", &stroke, &style));
            }
            ShapeKind::Custom(name) => match shapes.get(name) {
                Some(shape) => {
                    let points = shape
                        .outline_at(b, 1.0)
                        .iter()
                        .map(|p| format!("{},{}", p.x, p.y))
                        .collect::<Vec<_>>()
                        .join(" ");
                    group = group.add(
                        Polygon::new()
                            .set("points", points)
                            .set("fill", fill.as_str())
                            .set("stroke", stroke.as_str())
                            .set("stroke-width", style.stroke_width),
                    );
                }
                None => {
                    debug!(shape = *name; "Unregistered shape, drawing a rectangle");
                    group = group.add(rect(b, &fill, &stroke, &style));
                }
            },
            ShapeKind::Rectangle | ShapeKind::Connector => {
                group = group.add(rect(b, &fill, &stroke, &style));
            }
        }

        let label = scene.display_label(handle);
        if !label.is_empty() {
            group = group.add(
                Text::new(label)
                    .set("x", label_pos.x)
                    .set("y", label_pos.y)
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "middle")
                    .set("font-family", FONT_FAMILY)
                    .set("font-size", FONT_SIZE)
                    .set("fill", style.font_color.to_hex()),
            );
        }
        group
    }

    fn render_edge(&self, scene: &Scene, handle: CellHandle) -> Group {
        let style = scene.style_of(handle);
        let route = scene.absolute_route(handle);
        let group = self.group_for(scene, handle, "edge");
        if route.len() < 2 {
            return group;
        }
        let data = if style.curved {
            curved_path_data(&route)
        } else {
            polyline_path_data(&route)
        };
        let mut path = Path::new()
            .set("d", data)
            .set("fill", "none")
            .set("stroke", style.stroke_color.to_hex())
            .set("stroke-width", style.stroke_width);
        if let Some(dash) = &style.dash_pattern {
            let scale = if style.fix_dash { 1.0 } else { style.stroke_width };
            let pattern = dash
                .iter()
                .map(|d| (d * scale).to_string())
                .collect::<Vec<_>>()
                .join(" ");
            path = path.set("stroke-dasharray", pattern);
        }
        if style.end_arrow {
            path = path.set("marker-end", format!("url(#{})", marker_id(style.stroke_color)));
        }
        group.add(path)
    }
}

impl Exporter for SvgExporter {
    fn render(&self, session: &RenderSession) -> String {
        self.document(session.scene(), session.shapes()).to_string()
    }
}

fn stroke_attr(style: &CellStyle) -> String {
    if style.stroke_width <= 0.0 {
        "none".to_string()
    } else {
        style.stroke_color.to_hex()
    }
}

fn rect(b: Bounds, fill: &str, stroke: &str, style: &CellStyle) -> Rectangle {
    let mut r = Rectangle::new()
        .set("x", b.x)
        .set("y", b.y)
        .set("width", b.width)
        .set("height", b.height)
        .set("fill", fill)
        .set("stroke", stroke)
        .set("stroke-width", style.stroke_width);
    if style.rounded {
        let radius = (b.width.min(b.height) * 0.15).min(10.0);
        r = r.set("rx", radius).set("ry", radius);
    }
    r
}

fn ellipse(b: Bounds, inset: f64, fill: &str, stroke: &str, style: &CellStyle) -> Ellipse {
    let c = b.center();
    Ellipse::new()
        .set("cx", c.x)
        .set("cy", c.y)
        .set("rx", (b.width / 2.0 - inset).max(0.0))
        .set("ry", (b.height / 2.0 - inset).max(0.0))
        .set("fill", fill)
        .set("stroke", stroke)
        .set("stroke-width", style.stroke_width)
}

/// Marker id for an arrow head of the given colour.
pub(crate) fn marker_id(color: Rgb) -> String {
    format!("arrow-{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// One arrow marker per distinct edge stroke colour in the scene.
fn marker_definitions(scene: &Scene) -> Definitions {
    let colors: IndexSet<Rgb> = scene
        .edges()
        .map(|(h, _)| scene.style_of(h))
        .filter(|s| s.end_arrow)
        .map(|s| s.stroke_color)
        .collect();

    let mut defs = Definitions::new();
    for color in colors {
        defs = defs.add(
            Marker::new()
                .set("id", marker_id(color))
                .set("viewBox", "0 0 10 10")
                .set("refX", 9)
                .set("refY", 5)
                .set("markerWidth", 6)
                .set("markerHeight", 6)
                .set("orient", "auto")
                .add(
                    Path::new()
                        .set("d", "M 0 0 L 10 5 L 0 10 z")
                        .set("fill", color.to_hex()),
                ),
        );
    }
    defs
}

/// Straight segments through every point.
pub(crate) fn polyline_path_data(points: &[Point]) -> String {
    let mut out = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        out.push_str(&format!("{cmd} {} {}", p.x, p.y));
    }
    out
}

/// Quadratic smoothing: interior points become control points, curves meet at segment midpoints.
pub(crate) fn curved_path_data(points: &[Point]) -> String {
    if points.len() < 3 {
        return polyline_path_data(points);
    }
    let first = points[0];
    let mut out = format!("M {} {}", first.x, first.y);
    for i in 1..points.len() - 1 {
        let ctrl = points[i];
        let next = points[i + 1];
        let end = if i + 1 == points.len() - 1 {
            next
        } else {
            Point::new((ctrl.x + next.x) / 2.0, (ctrl.y + next.y) / 2.0)
        };
        out.push_str(&format!(" Q {} {} {} {}", ctrl.x, ctrl.y, end.x, end.y));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyline_data_lists_every_point() {
        let d = polyline_path_data(&[Point::new(0.0, 0.0), Point::new(10.0, 5.0)]);
        assert_eq!(d, "M 0 0 L 10 5");
    }

    #[test]
    fn curved_data_ends_on_last_point() {
        let d = curved_path_data(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 10.0),
        ]);
        assert!(d.starts_with("M 0 0 Q 10 0 10 5"));
        assert!(d.ends_with("Q 10 10 20 10"));
    }

    #[test]
    fn marker_id_is_id_safe() {
        assert_eq!(marker_id(Rgb::BLUE), "arrow-0000ff");
    }
}
