#![cfg(feature = "egui")]

use eframe::egui::epaint::Shape;
use eframe::egui::{self, Color32, Rect, Sense, Stroke, Vec2};

use crate::geometry::{Bounds, Point};
use crate::scene::{CellHandle, Surface};
use crate::session::{FrameMetrics, ToolbarAction, Viewport};

use super::geometry::{pan_by, to_scene, zoom_about};
use super::render::{CanvasContext, paint_scene};
use super::state::ViewerApp;
use super::text::code_job;

/// Pixel distance within which a click hits an edge.
const HIT_TOLERANCE: f64 = 4.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickAction {
    Primary,
    DoublePrimary,
}

/// What the user did on the canvas this frame.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateResponse {
    None,
    Cell {
        action: ClickAction,
        id: String,
    },
    Background,
}

fn toolbar_glyph(action: ToolbarAction) -> &'static str {
    match action {
        ToolbarAction::ZoomIn => "🔍+",
        ToolbarAction::ZoomOut => "🔍−",
        ToolbarAction::ActualSize => "1:1",
        ToolbarAction::PosterPrint => "🖶",
    }
}

fn cell_id(app: &ViewerApp, cell: CellHandle) -> String {
    app.session
        .scene()
        .cell(cell)
        .map(|c| c.id.clone())
        .unwrap_or_default()
}

fn show_canvas(app: &mut ViewerApp, ui: &mut egui::Ui) -> UpdateResponse {
    let avail = ui.available_rect_before_wrap();
    let origin = avail.min;
    let container = (avail.width() as f64, avail.height() as f64);
    app.canvas_size = Some(container);

    if app.reset_view {
        let frame = FrameMetrics {
            frame_width: container.0,
            ..FrameMetrics::default()
        };
        app.session.adjust_size(&frame);
        app.reset_view = false;
    }

    if app.session.scene().vertex_count() == 0 {
        ui.colored_label(Color32::YELLOW, "Nothing to render");
        return UpdateResponse::None;
    }

    let mut interaction = UpdateResponse::None;
    let resp = ui.interact(avail, ui.id().with("canvas"), Sense::click_and_drag());
    if resp.dragged() {
        pan_by(app.session.viewport_mut(), resp.drag_delta());
    }
    let scroll_y = ui.input(|i| i.raw_scroll_delta.y);
    if scroll_y.abs() > 0.0 && resp.hovered() {
        let factor = (1.0 + scroll_y as f64 * 0.001).max(0.1);
        let anchor = resp.hover_pos().unwrap_or(avail.center());
        zoom_about(app.session.viewport_mut(), origin, anchor, factor);
    }

    let tolerance = HIT_TOLERANCE / app.session.viewport().scale;
    if let Some(pos) = resp.interact_pointer_pos() {
        let p = to_scene(app.session.viewport(), origin, pos);
        let hit = app.session.scene().cell_at(p, tolerance);
        if resp.double_clicked() {
            if let Some(cell) = hit {
                let at = Point::new((pos.x - origin.x) as f64, (pos.y - origin.y) as f64);
                app.session.double_click(cell, at);
                interaction = UpdateResponse::Cell {
                    action: ClickAction::DoublePrimary,
                    id: cell_id(app, cell),
                };
            }
        } else if resp.clicked() {
            let additive = ui.input(|i| i.modifiers.shift || i.modifiers.command);
            app.session.click(hit, additive);
            interaction = match hit {
                Some(cell) => UpdateResponse::Cell {
                    action: ClickAction::Primary,
                    id: cell_id(app, cell),
                },
                None => UpdateResponse::Background,
            };
        }
    }

    let painter = ui.painter_at(avail);
    painter.rect_filled(avail, 0.0, Color32::WHITE);
    let cx = CanvasContext {
        painter: &painter,
        viewport: app.session.viewport(),
        origin,
    };
    paint_scene(
        &cx,
        app.session.scene(),
        app.session.shapes(),
        app.session.selection(),
    );

    if let Some(pos) = resp.hover_pos() {
        let p = to_scene(app.session.viewport(), origin, pos);
        let scene = app.session.scene();
        if let Some(tip) = scene
            .cell_at(p, tolerance)
            .and_then(|c| scene.tooltip(c))
            .filter(|t| !t.is_empty())
        {
            let _ = resp.on_hover_text_at_pointer(tip.to_string());
        }
    }
    interaction
}

fn show_toolbar_window(app: &mut ViewerApp, ctx: &egui::Context) {
    let win = app.session.toolbar_window().clone();
    let items = app.session.toolbar();
    let mut clicked = None;
    egui::Window::new(win.title)
        .default_pos([win.bounds.x as f32, win.bounds.y as f32])
        .default_size([win.bounds.width as f32, win.bounds.height as f32])
        .resizable(win.resizable)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (item, url) in &items {
                    let resp = ui
                        .button(toolbar_glyph(item.action))
                        .on_hover_text(format!("{} ({url})", item.title));
                    if resp.clicked() {
                        clicked = Some(item.action);
                    }
                }
            });
            ui.horizontal(|ui| {
                ui.label("Pages");
                ui.add(egui::DragValue::new(&mut app.poster_pages).range(1..=64));
                if let Some(p) = &app.poster {
                    ui.label(format!("{} page(s) @ {:.3}", p.pages, p.scale));
                }
            });
            ui.checkbox(&mut app.show_outline, "Outline");
            ui.label(format!("{:.0}%", app.session.viewport().scale * 100.0));
        });
    if let Some(action) = clicked {
        app.run_toolbar(action);
    }
}

fn show_outline_window(app: &mut ViewerApp, ctx: &egui::Context) {
    if !app.show_outline {
        return;
    }
    let win = app.session.outline_window().clone();
    let container = app.canvas_size.unwrap_or((
        app.session.environment().frame.frame_width,
        app.session.container_height(),
    ));
    let mut recenter: Option<Point> = None;
    egui::Window::new(win.title)
        .default_pos([win.bounds.x as f32, win.bounds.y as f32])
        .default_size([win.bounds.width as f32, win.bounds.height as f32])
        .resizable(win.resizable)
        .collapsible(false)
        .show(ctx, |ui| {
            let size = ui.available_size().max(Vec2::splat(20.0));
            let (rect, resp) = ui.allocate_exact_size(size, Sense::click_and_drag());
            let view = app
                .session
                .outline_view((rect.width() as f64, rect.height() as f64), container);
            let outline_viewport = Viewport {
                scale: view.scale,
                translate: Point::new(-view.graph.x, -view.graph.y),
                ..Viewport::default()
            };
            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, Color32::WHITE);
            let cx = CanvasContext {
                painter: &painter,
                viewport: &outline_viewport,
                origin: rect.min,
            };
            paint_scene(&cx, app.session.scene(), app.session.shapes(), &[]);

            let v = view.visible;
            let min = rect.min + Vec2::new(v.x as f32, v.y as f32);
            let visible = Rect::from_min_size(min, Vec2::new(v.width as f32, v.height as f32));
            painter.add(Shape::closed_line(
                vec![
                    visible.left_top(),
                    visible.right_top(),
                    visible.right_bottom(),
                    visible.left_bottom(),
                ],
                Stroke::new(1.5, Color32::from_rgb(0, 120, 255)),
            ));

            if resp.clicked() || resp.dragged() {
                recenter = resp
                    .interact_pointer_pos()
                    .map(|pos| to_scene(&outline_viewport, rect.min, pos));
            }
        });
    if let Some(p) = recenter {
        app.session
            .viewport_mut()
            .center(Bounds::new(p.x, p.y, 0.0, 0.0), container);
    }
}

fn show_source_overlay(app: &mut ViewerApp, ctx: &egui::Context) {
    let Some(overlay) = app.session.overlay().cloned() else {
        return;
    };
    let mut close = false;
    let modal = egui::Modal::new(egui::Id::new("source_overlay")).show(ctx, |ui| {
        ui.set_width(overlay.width as f32);
        ui.horizontal(|ui| {
            ui.heading(&overlay.title);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✕").clicked() {
                    close = true;
                }
            });
        });
        ui.separator();
        egui::ScrollArea::vertical()
            .max_height(overlay.height as f32)
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                if overlay.is_code {
                    ui.add(egui::Label::new(code_job(&overlay.content)).wrap());
                } else {
                    ui.label(&overlay.content);
                }
            });
    });
    if close || modal.should_close() {
        app.session.dismiss_overlay();
    }
}

/// Draw one frame of the viewer.
pub fn update(app: &mut ViewerApp, ctx: &egui::Context) -> UpdateResponse {
    let response = egui::CentralPanel::default()
        .frame(egui::Frame::default())
        .show(ctx, |ui| show_canvas(app, ui))
        .inner;
    show_toolbar_window(app, ctx);
    show_outline_window(app, ctx);
    show_source_overlay(app, ctx);
    response
}
