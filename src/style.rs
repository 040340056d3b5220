//! Style tags and the stylesheet they resolve against.
//!
//! Every cell in a [`Scene`](crate::scene::Scene) carries at most one
//! [`StyleTag`] from a closed vocabulary. The [`Stylesheet`] maps each tag to
//! a [`CellStyle`]; [`register_styles`] installs the fixed diagram palette.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::RenderError;
use crate::shape::ShapeRegistry;

/// Closed vocabulary of visual style tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTag {
    Root,
    Entity,
    State,
    /// Derived from a `state` node flagged `currentstate`; never read from input.
    CurrentState,
    Input,
    Output,
    Local,
    /// Layout-only placeholder; has a style but never gets a cell.
    Midpoint,
    Transition,
    Update,
    Action,
    Influence,
}

impl StyleTag {
    pub const ALL: [StyleTag; 12] = [
        StyleTag::Root,
        StyleTag::Entity,
        StyleTag::State,
        StyleTag::CurrentState,
        StyleTag::Input,
        StyleTag::Output,
        StyleTag::Local,
        StyleTag::Midpoint,
        StyleTag::Transition,
        StyleTag::Update,
        StyleTag::Action,
        StyleTag::Influence,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleTag::Root => "root",
            StyleTag::Entity => "entity",
            StyleTag::State => "state",
            StyleTag::CurrentState => "currentstate",
            StyleTag::Input => "input",
            StyleTag::Output => "output",
            StyleTag::Local => "local",
            StyleTag::Midpoint => "midpoint",
            StyleTag::Transition => "transition",
            StyleTag::Update => "update",
            StyleTag::Action => "action",
            StyleTag::Influence => "influence",
        }
    }

    /// Tags that style connectors rather than vertices.
    pub fn is_edge(self) -> bool {
        matches!(
            self,
            StyleTag::Transition | StyleTag::Update | StyleTag::Action | StyleTag::Influence
        )
    }

    /// Tags whose touching edges are recoloured when the cell is selected.
    pub fn is_highlightable(self) -> bool {
        matches!(
            self,
            StyleTag::State
                | StyleTag::CurrentState
                | StyleTag::Transition
                | StyleTag::Local
                | StyleTag::Input
                | StyleTag::Output
        )
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not part of the style vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown style tag '{}'", self.0)
    }
}

impl std::error::Error for UnknownTag {}

impl FromStr for StyleTag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleTag::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// Parse the tag of the layout element `id`, reporting unknown tags as [`RenderError`].
pub fn parse_tag(id: &str, tag: &str) -> Result<StyleTag, RenderError> {
    tag.parse().map_err(|_| RenderError::UnknownStyleTag {
        id: id.to_string(),
        tag: tag.to_string(),
    })
}

/// Geometric shape a style draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    /// Container with a title band of `start_size` units at the top.
    Swimlane { start_size: u32 },
    Ellipse,
    DoubleEllipse,
    /// Edge connector.
    Connector,
    /// A shape registered by name in the [`ShapeRegistry`].
    Custom(&'static str),
}

/// How labels behave when they are wider than the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    /// Labels are clipped/wrapped to the cell width.
    Width,
}

/// Resolved visual attributes of a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub shape: ShapeKind,
    /// `None` leaves the shape unfilled.
    pub fill_color: Option<Rgb>,
    pub stroke_color: Rgb,
    pub stroke_width: f64,
    pub font_color: Rgb,
    pub overflow: Overflow,
    pub spacing_left: f64,
    pub spacing_right: f64,
    pub resizable: bool,
    pub rounded: bool,
    /// Edges only: smooth the route through its points.
    pub curved: bool,
    /// Edges only: dash pattern (dash, gap, ...); `None` for solid lines.
    pub dash_pattern: Option<Vec<f64>>,
    /// Edges only: keep dash lengths independent of the stroke width.
    pub fix_dash: bool,
    /// Edges only: draw an arrow head at the target.
    pub end_arrow: bool,
}

impl CellStyle {
    /// Default vertex appearance of the rendering toolkit.
    pub fn default_vertex() -> Self {
        Self {
            shape: ShapeKind::Rectangle,
            fill_color: Some(Rgb(0xc3, 0xd9, 0xff)),
            stroke_color: Rgb(0x64, 0x82, 0xb9),
            stroke_width: 1.0,
            font_color: Rgb(0x77, 0x44, 0x00),
            overflow: Overflow::Visible,
            spacing_left: 0.0,
            spacing_right: 0.0,
            resizable: true,
            rounded: false,
            curved: false,
            dash_pattern: None,
            fix_dash: false,
            end_arrow: false,
        }
    }

    /// Default edge appearance of the rendering toolkit.
    pub fn default_edge() -> Self {
        Self {
            shape: ShapeKind::Connector,
            fill_color: None,
            stroke_color: Rgb(0x64, 0x82, 0xb9),
            stroke_width: 1.0,
            font_color: Rgb(0x44, 0x62, 0x99),
            end_arrow: true,
            ..Self::default_vertex()
        }
    }

    pub fn is_dashed(&self) -> bool {
        self.dash_pattern.is_some()
    }
}

/// Per-cell overrides applied on top of the tag's style.
///
/// Interaction only ever touches these; the stylesheet itself stays fixed
/// for the lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOverrides {
    pub stroke_color: Option<Rgb>,
    pub font_color: Option<Rgb>,
    pub stroke_width: Option<f64>,
    pub rounded: Option<bool>,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        *self == StyleOverrides::default()
    }

    pub fn apply(&self, style: &mut CellStyle) {
        if let Some(c) = self.stroke_color {
            style.stroke_color = c;
        }
        if let Some(c) = self.font_color {
            style.font_color = c;
        }
        if let Some(w) = self.stroke_width {
            style.stroke_width = w;
        }
        if let Some(r) = self.rounded {
            style.rounded = r;
        }
    }
}

/// Mapping from style tag to visual attributes.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    default_vertex: CellStyle,
    default_edge: CellStyle,
    styles: IndexMap<StyleTag, CellStyle>,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self {
            default_vertex: CellStyle::default_vertex(),
            default_edge: CellStyle::default_edge(),
            styles: IndexMap::new(),
        }
    }
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_vertex_style(&self) -> &CellStyle {
        &self.default_vertex
    }

    pub fn default_edge_style(&self) -> &CellStyle {
        &self.default_edge
    }

    pub fn set_default_edge_style(&mut self, style: CellStyle) {
        self.default_edge = style;
    }

    pub fn put(&mut self, tag: StyleTag, style: CellStyle) {
        self.styles.insert(tag, style);
    }

    pub fn get(&self, tag: StyleTag) -> Option<&CellStyle> {
        self.styles.get(&tag)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Style for a tag, falling back to the vertex or edge default.
    ///
    /// `edge` selects the fallback used for untagged cells.
    pub fn resolve(&self, tag: Option<StyleTag>, edge: bool) -> CellStyle {
        match tag.and_then(|t| self.styles.get(&t)) {
            Some(style) => style.clone(),
            None if edge || tag.is_some_and(StyleTag::is_edge) => self.default_edge.clone(),
            None => self.default_vertex.clone(),
        }
    }
}

/// Install the diagram palette into `sheet`.
///
/// Port spacing is derived from the extrude of the `input`/`output` shapes in
/// `shapes`, so the registry must be populated first.
pub fn register_styles(sheet: &mut Stylesheet, shapes: &ShapeRegistry) {
    let extrude_of = |name: &str| {
        shapes
            .get(name)
            .map(|s| s.extrude())
            .unwrap_or(crate::shape::DEFAULT_EXTRUDE)
    };
    let vertex = sheet.default_vertex_style().clone();

    sheet.put(
        StyleTag::Root,
        CellStyle {
            shape: ShapeKind::Rectangle,
            fill_color: Some(Rgb::WHITE),
            stroke_width: 0.0,
            stroke_color: Rgb::WHITE,
            ..vertex.clone()
        },
    );

    sheet.put(
        StyleTag::Entity,
        CellStyle {
            shape: ShapeKind::Swimlane { start_size: 40 },
            ..vertex.clone()
        },
    );

    sheet.put(
        StyleTag::Output,
        CellStyle {
            fill_color: Some(Rgb(0xfc, 0xc5, 0xb3)),
            shape: ShapeKind::Custom("output"),
            overflow: Overflow::Width,
            spacing_right: extrude_of("output") / 2.0,
            ..vertex.clone()
        },
    );

    let local = CellStyle {
        fill_color: Some(Rgb(0xd2, 0xce, 0xef)),
        overflow: Overflow::Width,
        ..vertex.clone()
    };
    sheet.put(StyleTag::Local, local.clone());
    sheet.put(
        StyleTag::Midpoint,
        CellStyle {
            resizable: false,
            ..local
        },
    );

    sheet.put(
        StyleTag::Input,
        CellStyle {
            fill_color: Some(Rgb(0xb5, 0xfe, 0xd9)),
            shape: ShapeKind::Custom("input"),
            overflow: Overflow::Width,
            spacing_left: extrude_of("input") / 2.0,
            ..vertex.clone()
        },
    );

    let state = CellStyle {
        shape: ShapeKind::Ellipse,
        fill_color: Some(Rgb(0xe2, 0xcb, 0xc1)),
        ..vertex
    };
    sheet.put(StyleTag::State, state.clone());
    sheet.put(
        StyleTag::CurrentState,
        CellStyle {
            shape: ShapeKind::DoubleEllipse,
            ..state
        },
    );

    // Edges: the default edge style itself is modified, then cloned.
    let mut edge = sheet.default_edge_style().clone();
    edge.curved = true;
    edge.font_color = Rgb::BLACK;
    edge.stroke_color = Rgb::BLACK;
    edge.stroke_width = 1.0;
    sheet.set_default_edge_style(edge.clone());
    sheet.put(StyleTag::Transition, edge.clone());
    sheet.put(StyleTag::Influence, edge.clone());

    let update = CellStyle {
        dash_pattern: Some(vec![7.0, 3.0]),
        fix_dash: true,
        ..edge
    };
    sheet.put(StyleTag::Update, update.clone());
    sheet.put(
        StyleTag::Action,
        CellStyle {
            dash_pattern: Some(vec![2.0, 2.0]),
            ..update
        },
    );
}
