use crestview::color::Rgb;
use crestview::config::ViewerConfig;
use crestview::error::RenderError;
use crestview::geometry::{Bounds, Point};
use crestview::layout::{LayoutNode, parse_layout};
use crestview::session::{
    Environment, FRAME_MARGIN, FloatingWindow, FrameMetrics, PAGE_A4_PORTRAIT, RenderSession,
    ToolbarAction, Viewport, scale_for_page_count, toolbar_items,
};

const COUNTER: &str = include_str!("fixtures/counter.json");

fn counter() -> LayoutNode {
    parse_layout(COUNTER).unwrap()
}

fn open_with(frame: FrameMetrics) -> RenderSession {
    let env = Environment {
        frame,
        ..Environment::default()
    };
    RenderSession::open(&counter(), &ViewerConfig::default(), env).unwrap()
}

fn frame(width: f64) -> FrameMetrics {
    FrameMetrics {
        frame_width: width,
        ..FrameMetrics::default()
    }
}

#[test]
fn unsupported_environment_builds_nothing() {
    let env = Environment {
        supported: false,
        ..Environment::default()
    };
    let err = RenderSession::open(&counter(), &ViewerConfig::default(), env).unwrap_err();
    match err {
        RenderError::UnsupportedEnvironment(msg) => assert_eq!(msg, "Browser is not supported!"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn malformed_layout_fails_open() {
    let bad = parse_layout(r#"{"id":"r","cresttype":"nonsense"}"#).unwrap();
    let err = RenderSession::open(&bad, &ViewerConfig::default(), Environment::default())
        .unwrap_err();
    assert!(matches!(err, RenderError::UnknownStyleTag { .. }));
}

#[test]
fn graph_bounds_cover_the_fixture() {
    let session = open_with(frame(800.0));
    assert_eq!(
        session.scene().graph_bounds(),
        Bounds::new(0.0, 0.0, 400.0, 300.0)
    );
}

#[test]
fn wide_frame_scales_container_height() {
    let mut session = open_with(frame(800.0));
    assert_eq!(session.container_height(), 600.0);

    let outcome = session.adjust_size(&frame(800.0)).unwrap();
    assert_eq!(outcome.container_height, 600.0);
    assert_eq!(outcome.frame_height, 600.0 + FRAME_MARGIN);
    assert!(!outcome.fitted);
    assert_eq!(outcome.output_height, None);
    assert_eq!(outcome.parent_frame_height, None);

    let vp = session.viewport();
    assert_eq!(vp.scale, 1.0);
    assert_eq!(vp.translate, Point::new(200.0, 150.0));
}

#[test]
fn narrow_frame_fits_the_graph() {
    let mut session = open_with(frame(800.0));
    let outcome = session.adjust_size(&frame(200.0)).unwrap();
    assert!(outcome.fitted);
    assert_eq!(outcome.container_height, 150.0);
    assert_eq!(session.viewport().scale, 0.5);
    assert_eq!(session.viewport().translate, Point::new(0.0, 0.0));
}

#[test]
fn host_frames_follow_the_container() {
    let mut session = open_with(frame(800.0));
    let outcome = session
        .adjust_size(&FrameMetrics {
            frame_width: 400.0,
            nested_in_output: true,
            parent_graph_height: Some(100.0),
        })
        .unwrap();
    assert_eq!(outcome.container_height, 300.0);
    assert_eq!(outcome.output_height, Some(300.0 + FRAME_MARGIN));
    assert_eq!(outcome.parent_frame_height, Some(100.0 + 50.0 + 300.0 + 50.0));
}

#[test]
fn empty_graph_skips_sizing() {
    let root = parse_layout(r#"{"id":"r","cresttype":"entity"}"#).unwrap();
    let mut session =
        RenderSession::open(&root, &ViewerConfig::default(), Environment::default()).unwrap();
    assert_eq!(session.container_height(), 0.0);
    assert!(session.adjust_size(&frame(800.0)).is_none());
    assert_eq!(*session.viewport(), Viewport::default());
}

#[test]
fn zoom_buttons_scale_by_factor() {
    let mut session = open_with(frame(800.0));
    session.run_toolbar(ToolbarAction::ZoomIn, 1);
    assert!((session.viewport().scale - 1.2).abs() < 1e-12);
    session.run_toolbar(ToolbarAction::ZoomOut, 1);
    session.run_toolbar(ToolbarAction::ZoomOut, 1);
    assert!((session.viewport().scale - 1.0 / 1.2).abs() < 1e-12);

    session.viewport_mut().scale = 3.0;
    assert_eq!(session.run_toolbar(ToolbarAction::ActualSize, 1), None);
    assert_eq!(session.viewport().scale, 1.0);
}

#[test]
fn actual_size_discards_zoom_before_refitting() {
    let mut session = open_with(frame(200.0));
    assert_eq!(session.viewport().scale, 0.5);
    session.run_toolbar(ToolbarAction::ZoomIn, 1);
    session.run_toolbar(ToolbarAction::ZoomIn, 1);
    assert!(session.viewport().scale > 0.5);

    session.run_toolbar(ToolbarAction::ActualSize, 1);
    assert_eq!(session.viewport().scale, 0.5);
    assert_eq!(session.viewport().translate, Point::new(0.0, 0.0));

    // A frame wider than the graph never fits, so only the reset brings back 1:1.
    let mut session = open_with(frame(800.0));
    session.run_toolbar(ToolbarAction::ZoomIn, 1);
    session.run_toolbar(ToolbarAction::ActualSize, 1);
    assert_eq!(session.viewport().scale, 1.0);
    assert_eq!(session.viewport().translate, Point::new(200.0, 150.0));
}

#[test]
fn sizing_outcome_is_kept_on_the_session() {
    let mut session = open_with(frame(800.0));
    let kept = session.sizing().unwrap();
    assert_eq!(kept.container_height, 600.0);
    assert_eq!(kept.frame_height, 650.0);
    assert!(!kept.fitted);

    let outcome = session.adjust_size(&frame(200.0)).unwrap();
    assert_eq!(session.sizing(), Some(outcome));
    assert_eq!(outcome.frame_height, 150.0 + FRAME_MARGIN);

    let root = parse_layout(r#"{"id":"r","cresttype":"entity"}"#).unwrap();
    let empty =
        RenderSession::open(&root, &ViewerConfig::default(), Environment::default()).unwrap();
    assert_eq!(empty.sizing(), None);
}

#[test]
fn poster_print_computes_page_scale() {
    let mut session = open_with(frame(800.0));
    let one = session.run_toolbar(ToolbarAction::PosterPrint, 1).unwrap();
    assert!((one - 827.0 / 400.0).abs() < 1e-9);
    let two = session.run_toolbar(ToolbarAction::PosterPrint, 2).unwrap();
    assert!((two - 1169.0 / 300.0).abs() < 1e-9);

    let empty = Bounds::default();
    assert_eq!(scale_for_page_count(4, empty, PAGE_A4_PORTRAIT), 1.0);
    assert_eq!(
        scale_for_page_count(0, Bounds::new(0.0, 0.0, 10.0, 10.0), PAGE_A4_PORTRAIT),
        1.0
    );
}

#[test]
fn toolbar_icons_resolve_against_first_path_segment() {
    let items = toolbar_items();
    let titles: Vec<&str> = items.iter().map(|i| i.title).collect();
    assert_eq!(titles, ["Zoom In", "Zoom Out", "Actual Size", "Poster Print"]);
    assert_eq!(
        items[0].icon_url("http://host:8888", "/user/alice/notebooks/x.ipynb"),
        "http://host:8888/user/CREST/crestdsl/ui/icons/zoom_in32.png"
    );

    let session = open_with(frame(800.0));
    let (item, url) = &session.toolbar()[3];
    assert_eq!(item.action, ToolbarAction::PosterPrint);
    assert_eq!(
        url,
        "http://localhost:8888/notebooks/CREST/crestdsl/ui/icons/press32.png"
    );
}

#[test]
fn floating_windows_have_fixed_placement() {
    let tools = FloatingWindow::toolbar();
    assert_eq!(tools.bounds, Bounds::new(5.0, 5.0, 180.0, 66.0));
    assert!(!tools.resizable);
    let outline = FloatingWindow::outline();
    assert_eq!(outline.bounds, Bounds::new(5.0, 71.0, 180.0, 140.0));
    assert!(outline.resizable);
}

#[test]
fn outline_marks_visible_region() {
    let session = open_with(frame(800.0));
    let view = session.outline_view((200.0, 150.0), (400.0, 300.0));
    assert_eq!(view.scale, 0.5);
    // translate (200,150) at scale 1: the canvas shows scene (-200,-150) onward.
    assert_eq!(view.visible, Bounds::new(-100.0, -75.0, 200.0, 150.0));

    let default = session.default_outline_view();
    assert_eq!(default.graph, Bounds::new(0.0, 0.0, 400.0, 300.0));
}

#[test]
fn clicks_drive_selection_and_highlighting() {
    let mut session = open_with(frame(800.0));
    let idle = session.lookup("counter.idle").unwrap();
    let busy = session.lookup("counter.busy").unwrap();
    let edge = session.lookup("counter.idle_to_busy").unwrap();

    session.click(Some(idle), false);
    assert_eq!(session.selection(), &[idle]);
    assert_eq!(session.scene().style_of(edge).stroke_color, Rgb::BLUE);

    session.click(Some(busy), true);
    assert_eq!(session.selection(), &[idle, busy]);
    assert_eq!(session.scene().style_of(edge).stroke_color, Rgb::RED);

    let change = session.click(None, false);
    assert_eq!(change.removed.len(), 2);
    assert!(session.selection().is_empty());
    assert_eq!(session.scene().style_of(edge).stroke_color, Rgb::BLACK);
}

#[test]
fn source_overlay_is_modal() {
    let mut session = open_with(frame(800.0));
    let idle = session.lookup("counter.idle").unwrap();
    let edge = session.lookup("counter.count_update").unwrap();

    assert!(session.double_click(idle, Point::new(0.0, 0.0)).is_none());
    assert!(session.is_enabled());

    let overlay = session.double_click(edge, Point::new(500.0, 40.0)).unwrap();
    assert!(overlay.content.starts_with("def count_update"));
    assert_eq!(overlay.x, 100.0);
    assert!(!session.is_enabled());

    assert!(session.click(Some(idle), false).is_empty());
    assert!(session.selection().is_empty());

    session.dismiss_overlay();
    assert!(session.overlay().is_none());
    assert!(session.is_enabled());
    assert!(!session.click(Some(idle), false).is_empty());
}

#[test]
fn report_is_kept() {
    let session = open_with(frame(800.0));
    assert_eq!(session.report().vertices, 6);
    assert_eq!(session.report().anchors, 2);
}
