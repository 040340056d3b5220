use crestview::color::Rgb;
use crestview::geometry::Point;
use crestview::interaction::{
    CodeOverlay, EdgeHighlighter, HighlightPalette, InteractionObserver, SelectionModel,
};
use crestview::layout::parse_layout;
use crestview::materialize::{MidpointPolicy, materialize_tree};
use crestview::scene::{CellHandle, Scene, Surface};
use crestview::shape::{DEFAULT_EXTRUDE, ShapeRegistry};
use crestview::style::{Stylesheet, register_styles};

const COUNTER: &str = include_str!("fixtures/counter.json");

fn scene_from(json: &str) -> Scene {
    let shapes = ShapeRegistry::with_port_glyphs(DEFAULT_EXTRUDE);
    let mut sheet = Stylesheet::new();
    register_styles(&mut sheet, &shapes);
    let mut scene = Scene::new(sheet);
    materialize_tree(&mut scene, &parse_layout(json).unwrap(), MidpointPolicy::default()).unwrap();
    scene
}

fn h(scene: &Scene, id: &str) -> CellHandle {
    scene.lookup(id).unwrap()
}

fn stroke(scene: &Scene, id: &str) -> (Rgb, f64) {
    let style = scene.style_of(h(scene, id));
    (style.stroke_color, style.stroke_width)
}

#[test]
fn selecting_a_state_colours_its_edges() {
    let mut scene = scene_from(COUNTER);
    let mut hl = EdgeHighlighter::default();
    let idle = h(&scene, "counter.idle");
    hl.on_selection_changed(&mut scene, &[idle], &[]);

    assert_eq!(stroke(&scene, "counter.idle_to_busy"), (Rgb::BLUE, 2.0));
    assert_eq!(stroke(&scene, "counter.store_tmp"), (Rgb::BLUE, 2.0));
    assert_eq!(stroke(&scene, "counter.busy_to_idle"), (Rgb::RED, 2.0));
    let edge = scene.cell(h(&scene, "counter.busy_to_idle")).unwrap();
    assert_eq!(edge.overrides.font_color, Some(Rgb::RED));

    // Edges not touching the selection keep their style.
    assert_eq!(stroke(&scene, "counter.count_update"), (Rgb::BLACK, 1.0));
    let untouched = scene.cell(h(&scene, "counter.count_update")).unwrap();
    assert!(untouched.overrides.stroke_color.is_none());
}

#[test]
fn deselecting_restores_black() {
    let mut scene = scene_from(COUNTER);
    let mut hl = EdgeHighlighter::default();
    let idle = h(&scene, "counter.idle");
    hl.on_selection_changed(&mut scene, &[idle], &[]);
    hl.on_selection_changed(&mut scene, &[], &[idle]);
    for id in [
        "counter.idle_to_busy",
        "counter.busy_to_idle",
        "counter.store_tmp",
    ] {
        assert_eq!(stroke(&scene, id), (Rgb::BLACK, 1.0), "{id}");
    }
}

#[test]
fn removals_apply_before_additions() {
    let mut scene = scene_from(COUNTER);
    let mut hl = EdgeHighlighter::default();
    let idle = h(&scene, "counter.idle");
    let busy = h(&scene, "counter.busy");
    hl.on_selection_changed(&mut scene, &[idle], &[]);
    hl.on_selection_changed(&mut scene, &[busy], &[idle]);

    assert_eq!(stroke(&scene, "counter.idle_to_busy"), (Rgb::RED, 2.0));
    assert_eq!(stroke(&scene, "counter.busy_to_idle"), (Rgb::BLUE, 2.0));
    assert_eq!(stroke(&scene, "counter.store_tmp"), (Rgb::BLACK, 1.0));
}

#[test]
fn entities_and_edges_are_not_highlighted() {
    let mut scene = scene_from(COUNTER);
    let mut hl = EdgeHighlighter::default();
    let before = scene.revision();
    let root = h(&scene, "counter");
    let edge = h(&scene, "counter.idle_to_busy");
    hl.on_selection_changed(&mut scene, &[root, edge], &[]);
    assert_eq!(scene.revision(), before);
    assert_eq!(stroke(&scene, "counter.idle_to_busy"), (Rgb::BLACK, 1.0));
}

#[test]
fn ports_and_locals_are_highlightable() {
    let mut scene = scene_from(COUNTER);
    let mut hl = EdgeHighlighter::default();
    let tmp = h(&scene, "counter.tmp");
    hl.on_selection_changed(&mut scene, &[tmp], &[]);
    assert_eq!(stroke(&scene, "counter.store_tmp"), (Rgb::RED, 2.0));
    assert_eq!(stroke(&scene, "counter.increment_to_tmp"), (Rgb::RED, 2.0));

    let port = h(&scene, "counter.increment");
    hl.on_selection_changed(&mut scene, &[port], &[tmp]);
    assert_eq!(stroke(&scene, "counter.increment_to_tmp"), (Rgb::BLUE, 2.0));
    assert_eq!(stroke(&scene, "counter.store_tmp"), (Rgb::BLACK, 1.0));
}

#[test]
fn self_loops_count_as_outgoing() {
    let mut scene = scene_from(
        r#"{"id":"r","cresttype":"entity","children":[{"id":"a","cresttype":"state"}],
            "edges":[{"id":"loop","cresttype":"transition","sources":["a"],"targets":["a"]}]}"#,
    );
    let a = h(&scene, "a");
    assert_eq!(scene.edges_of(a).len(), 1);
    EdgeHighlighter::default().on_selection_changed(&mut scene, &[a], &[]);
    assert_eq!(stroke(&scene, "loop"), (Rgb::BLUE, 2.0));
}

#[test]
fn palette_is_configurable() {
    let mut scene = scene_from(COUNTER);
    let mut hl = EdgeHighlighter::new(HighlightPalette {
        outgoing: Rgb::GREEN,
        highlight_width: 3.0,
        ..HighlightPalette::default()
    });
    let idle = h(&scene, "counter.idle");
    hl.on_selection_changed(&mut scene, &[idle], &[]);
    assert_eq!(stroke(&scene, "counter.idle_to_busy"), (Rgb::GREEN, 3.0));
    assert_eq!(stroke(&scene, "counter.busy_to_idle"), (Rgb::RED, 3.0));
}

#[test]
fn double_click_shows_edge_code() {
    let scene = scene_from(COUNTER);
    let mut hl = EdgeHighlighter::default();
    let edge = h(&scene, "counter.idle_to_busy");
    let overlay = hl
        .on_double_click(&scene, edge, Point::new(1000.0, 200.0))
        .unwrap();
    assert_eq!(overlay.title, "SourceCode");
    assert!(overlay.is_code);
    assert!(overlay.content.contains("self.increment.value > 0"));
    assert_eq!((overlay.x, overlay.y), (600.0, 200.0));
    assert_eq!((overlay.width, overlay.height), (800.0, 300.0));
}

#[test]
fn double_click_without_code_shows_label() {
    let scene = scene_from(COUNTER);
    let mut hl = EdgeHighlighter::default();
    let edge = h(&scene, "counter.busy_to_idle");
    let overlay = hl.on_double_click(&scene, edge, Point::new(0.0, 0.0)).unwrap();
    assert!(!overlay.is_code);
    assert_eq!(overlay.content, "busy_to_idle");

    let vertex = h(&scene, "counter.idle");
    assert!(hl.on_double_click(&scene, vertex, Point::new(0.0, 0.0)).is_none());
}

#[test]
fn overlay_stays_clear_of_toolbars() {
    let o = CodeOverlay::at(String::new(), false, Point::new(300.0, -40.0));
    assert_eq!(o.x, 100.0);
    assert_eq!(o.y, 10.0);
    let o = CodeOverlay::at(String::new(), false, Point::new(900.0, 50.0));
    assert_eq!(o.x, 500.0);
    assert_eq!(o.y, 50.0);
}

#[test]
fn selection_model_tracks_changes() {
    let scene = scene_from(COUNTER);
    let idle = h(&scene, "counter.idle");
    let busy = h(&scene, "counter.busy");
    let mut sel = SelectionModel::new();

    let change = sel.set(&[idle, idle]);
    assert_eq!(change.added, vec![idle]);
    assert!(change.removed.is_empty());
    assert_eq!(sel.cells(), &[idle]);

    let change = sel.set(&[busy]);
    assert_eq!(change.added, vec![busy]);
    assert_eq!(change.removed, vec![idle]);

    assert!(sel.set(&[busy]).is_empty());

    let change = sel.toggle(idle);
    assert_eq!(change.added, vec![idle]);
    assert!(sel.is_selected(idle) && sel.is_selected(busy));
    let change = sel.toggle(busy);
    assert_eq!(change.removed, vec![busy]);

    let change = sel.clear();
    assert_eq!(change.removed, vec![idle]);
    assert!(sel.is_empty());
}
