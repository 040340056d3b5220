use crestview::color::{Rgb, parse_color};
use crestview::error::RenderError;
use crestview::geometry::{Bounds, Point};
use crestview::shape::{DEFAULT_EXTRUDE, ShapeRegistry};
use crestview::style::{
    CellStyle, Overflow, ShapeKind, StyleOverrides, StyleTag, Stylesheet, parse_tag,
    register_styles,
};

fn palette() -> Stylesheet {
    let shapes = ShapeRegistry::with_port_glyphs(DEFAULT_EXTRUDE);
    let mut sheet = Stylesheet::new();
    register_styles(&mut sheet, &shapes);
    sheet
}

#[test]
fn tags_round_trip_through_names() {
    for tag in StyleTag::ALL {
        assert_eq!(tag.as_str().parse::<StyleTag>().unwrap(), tag);
    }
    assert!(matches!(
        parse_tag("x", "bogus"),
        Err(RenderError::UnknownStyleTag { .. })
    ));
}

#[test]
fn highlightable_set() {
    let highlightable: Vec<StyleTag> = StyleTag::ALL
        .into_iter()
        .filter(|t| t.is_highlightable())
        .collect();
    assert_eq!(
        highlightable,
        [
            StyleTag::State,
            StyleTag::CurrentState,
            StyleTag::Input,
            StyleTag::Output,
            StyleTag::Local,
            StyleTag::Transition,
        ]
    );
    assert!(!StyleTag::Entity.is_highlightable());
    assert!(!StyleTag::Update.is_highlightable());
}

#[test]
fn every_tag_has_a_style() {
    let sheet = palette();
    for tag in StyleTag::ALL {
        assert!(sheet.get(tag).is_some(), "missing style for {tag}");
    }
}

#[test]
fn vertex_palette_values() {
    let sheet = palette();
    let root = sheet.get(StyleTag::Root).unwrap();
    assert_eq!(root.fill_color, Some(Rgb::WHITE));
    assert_eq!(root.stroke_width, 0.0);

    let entity = sheet.get(StyleTag::Entity).unwrap();
    assert_eq!(entity.shape, ShapeKind::Swimlane { start_size: 40 });

    let output = sheet.get(StyleTag::Output).unwrap();
    assert_eq!(output.shape, ShapeKind::Custom("output"));
    assert_eq!(output.fill_color, parse_color("#fcc5b3"));
    assert_eq!(output.overflow, Overflow::Width);
    assert_eq!(output.spacing_right, DEFAULT_EXTRUDE / 2.0);

    let input = sheet.get(StyleTag::Input).unwrap();
    assert_eq!(input.shape, ShapeKind::Custom("input"));
    assert_eq!(input.fill_color, parse_color("#b5fed9"));
    assert_eq!(input.spacing_left, DEFAULT_EXTRUDE / 2.0);

    let midpoint = sheet.get(StyleTag::Midpoint).unwrap();
    assert_eq!(midpoint.fill_color, parse_color("#d2ceef"));
    assert!(!midpoint.resizable);

    let state = sheet.get(StyleTag::State).unwrap();
    assert_eq!(state.shape, ShapeKind::Ellipse);
    let current = sheet.get(StyleTag::CurrentState).unwrap();
    assert_eq!(current.shape, ShapeKind::DoubleEllipse);
    assert_eq!(current.fill_color, state.fill_color);
}

#[test]
fn edge_palette_values() {
    let sheet = palette();
    let transition = sheet.get(StyleTag::Transition).unwrap();
    assert!(transition.curved);
    assert_eq!(transition.stroke_color, Rgb::BLACK);
    assert_eq!(transition.stroke_width, 1.0);
    assert!(!transition.is_dashed());

    let update = sheet.get(StyleTag::Update).unwrap();
    assert_eq!(update.dash_pattern.as_deref(), Some(&[7.0, 3.0][..]));
    assert!(update.fix_dash);

    let action = sheet.get(StyleTag::Action).unwrap();
    assert_eq!(action.dash_pattern.as_deref(), Some(&[2.0, 2.0][..]));

    assert_eq!(sheet.get(StyleTag::Influence).unwrap(), transition);
    assert_eq!(sheet.default_edge_style(), transition);
}

#[test]
fn overrides_apply_on_top() {
    let sheet = palette();
    let mut style: CellStyle = sheet.resolve(Some(StyleTag::Transition), true);
    let overrides = StyleOverrides {
        stroke_color: Some(Rgb::BLUE),
        stroke_width: Some(2.0),
        ..StyleOverrides::default()
    };
    assert!(!overrides.is_empty());
    overrides.apply(&mut style);
    assert_eq!(style.stroke_color, Rgb::BLUE);
    assert_eq!(style.stroke_width, 2.0);
    assert_eq!(style.font_color, Rgb::BLACK);
}

#[test]
fn untagged_cells_fall_back_to_defaults() {
    let sheet = palette();
    assert_eq!(&sheet.resolve(None, false), sheet.default_vertex_style());
    assert_eq!(&sheet.resolve(None, true), sheet.default_edge_style());
}

#[test]
fn port_glyph_outlines() {
    let shapes = ShapeRegistry::with_port_glyphs(10.0);
    assert_eq!(shapes.len(), 2);

    let output = shapes.get("output").unwrap().outline(40.0, 20.0, 1.0);
    assert_eq!(output[2], Point::new(50.0, 10.0));
    assert_eq!(output.first(), output.last());

    let input = shapes.get("input").unwrap();
    let outline = input.outline(40.0, 20.0, 2.0);
    assert_eq!(outline[0], Point::new(-20.0, 0.0));
    assert_eq!(outline[4], Point::new(0.0, 10.0));

    let placed = input.outline_at(Bounds::new(100.0, 100.0, 40.0, 20.0), 1.0);
    assert_eq!(placed[0], Point::new(90.0, 100.0));
}

#[test]
fn colour_parsing() {
    assert_eq!(parse_color("#fff"), Some(Rgb::WHITE));
    assert_eq!(parse_color("#6482B9"), Some(Rgb(0x64, 0x82, 0xb9)));
    assert_eq!(parse_color("blue"), Some(Rgb::BLUE));
    assert_eq!(parse_color("[1.0, 0.0, 0.0]"), Some(Rgb::RED));
    assert_eq!(parse_color("nope"), None);
    assert_eq!(Rgb(0xc3, 0xd9, 0xff).to_string(), "#c3d9ff");
}
