use std::fs;

use crestview::config::ViewerConfig;
use crestview::export::{Exporter, HtmlExporter, SvgExporter};
use crestview::layout::parse_layout;
use crestview::session::{Environment, FrameMetrics, RenderSession};
use tempfile::tempdir;

const COUNTER: &str = include_str!("fixtures/counter.json");

fn session() -> RenderSession {
    let env = Environment {
        frame: FrameMetrics {
            frame_width: 800.0,
            ..FrameMetrics::default()
        },
        ..Environment::default()
    };
    RenderSession::open(&parse_layout(COUNTER).unwrap(), &ViewerConfig::default(), env).unwrap()
}

#[test]
fn svg_carries_cell_ids_and_styles() {
    let svg = SvgExporter::new().render(&session());
    assert!(svg.contains("<svg"));
    assert!(svg.contains("viewBox=\"-10 -10 420 320\""), "{svg}");
    assert!(svg.contains("data-cell-id=\"counter.idle\""));
    assert!(svg.contains("data-style=\"currentstate\""));
    assert!(svg.contains("data-style=\"entity\""));
    assert!(svg.contains("data-cell-id=\"counter.idle_to_busy\""));
    // Anchors are not drawn.
    assert!(!svg.contains("counter.idle_to_busy_mid"));
}

#[test]
fn svg_draws_each_shape_kind() {
    let svg = SvgExporter::new().render(&session());
    // Two port glyphs.
    assert_eq!(svg.matches("<polygon").count(), 2);
    // A double ellipse for the current state plus one for the other state.
    assert_eq!(svg.matches("<ellipse").count(), 3);
    // Swimlane header divider.
    assert!(svg.contains("<line"));
}

#[test]
fn svg_labels_vertices_only() {
    let svg = SvgExporter {
        tooltips: false,
        ..SvgExporter::default()
    }
    .render(&session());
    assert!(svg.contains("tmp: 0 (int)"));
    assert_eq!(svg.matches("<text").count(), 6);
    // The edge id appears once, on its group.
    assert_eq!(svg.matches("busy_to_idle").count(), 1);
}

#[test]
fn svg_edges_use_dashes_and_markers() {
    let svg = SvgExporter::new().render(&session());
    assert!(svg.contains("stroke-dasharray=\"7 3\""));
    assert!(svg.contains("stroke-dasharray=\"2 2\""));
    assert!(svg.contains("id=\"arrow-000000\""));
    assert!(svg.contains("marker-end=\"url(#arrow-000000)\""));
    assert!(svg.contains(" Q "));
}

#[test]
fn svg_reflects_highlighting() {
    let mut session = session();
    let idle = session.lookup("counter.idle").unwrap();
    session.select(&[idle]);
    let svg = SvgExporter::new().render(&session);
    assert!(svg.contains("id=\"arrow-0000ff\""));
    assert!(svg.contains("id=\"arrow-ff0000\""));
    assert!(svg.contains("stroke=\"#0000ff\""));
    assert!(svg.contains("stroke-width=\"2\""));
}

#[test]
fn svg_tooltips_can_be_disabled() {
    let with = SvgExporter::new().render(&session());
    assert!(with.contains("<title>"));
    let without = SvgExporter {
        tooltips: false,
        ..SvgExporter::default()
    }
    .render(&session());
    assert!(!without.contains("<title>"));
}

#[test]
fn svg_edge_group_holds_tooltip_and_path() {
    let svg = SvgExporter::new().render(&session());
    let attr = "data-cell-id=\"counter.idle_to_busy\"";
    let start = svg.find(attr).unwrap() + attr.len();
    let end = start + svg[start..].find("</g>").unwrap();
    let group = &svg[start..end];
    assert!(group.contains("class=\"edge\""), "{group}");
    assert!(group.contains("<title>"), "{group}");
    assert!(group.contains("idle_to_busy"), "{group}");
    assert!(group.contains("<path"), "{group}");
}

#[test]
fn html_page_embeds_diagram_and_sources() {
    let html = HtmlExporter::new().render(&session());
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>CREST diagram</title>"));
    assert!(html.contains("id=\"graphContainer\" style=\"height:600px\""));
    assert!(html.contains("<div id=\"graphFrame\" style=\"height:650px\">"));
    assert!(html.contains("id=\"outlineContainer\" style=\"left:5px;top:71px;width:180px;height:140px\""));
    assert!(html.contains("id=\"toolbarDiv\""));
    assert!(html.contains(
        "src=\"http://localhost:8888/notebooks/CREST/crestdsl/ui/icons/zoom_in32.png\""
    ));
    assert!(html.contains("<svg"));

    assert!(html.contains("data-edge=\"counter.idle_to_busy\""));
    assert!(html.contains("self.increment.value &gt; 0"));
    assert!(html.contains("class=\"language-python\""));
    // No code: the edge label is shown instead.
    assert!(html.contains("<code class=\"plain\">busy_to_idle</code>"));
    assert!(html.contains("width:800px;height:300px"));
    assert!(!html.contains("WIDTH / 2"));
}

#[test]
fn exporters_write_files() {
    let dir = tempdir().unwrap();
    let session = session();
    let path = dir.path().join("counter.svg");
    SvgExporter::new().write_to(&session, &path).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("counter.count"));

    let missing = dir.path().join("no/such/dir/page.html");
    assert!(HtmlExporter::new().write_to(&session, &missing).is_err());
}

#[test]
fn html_frame_carries_host_heights() {
    let env = Environment {
        frame: FrameMetrics {
            frame_width: 400.0,
            nested_in_output: true,
            parent_graph_height: Some(100.0),
        },
        ..Environment::default()
    };
    let session =
        RenderSession::open(&parse_layout(COUNTER).unwrap(), &ViewerConfig::default(), env)
            .unwrap();
    let html = HtmlExporter::new().render(&session);
    assert!(html.contains("id=\"graphFrame\" style=\"height:350px\""));
    assert!(html.contains("data-output-height=\"350\""));
    assert!(html.contains("data-parent-frame-height=\"500\""));
}

#[test]
fn html_frame_is_unsized_for_empty_graphs() {
    let root = parse_layout(r#"{"id":"r","cresttype":"entity"}"#).unwrap();
    let session =
        RenderSession::open(&root, &ViewerConfig::default(), Environment::default()).unwrap();
    let html = HtmlExporter::new().render(&session);
    assert!(html.contains("<div id=\"graphFrame\">\n"));
}
