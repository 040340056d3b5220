//! Options handed to the external layout engine.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Right,
    Left,
    Down,
    Up,
}

impl Direction {
    fn as_elk(self) -> &'static str {
        match self {
            Direction::Right => "RIGHT",
            Direction::Left => "LEFT",
            Direction::Down => "DOWN",
            Direction::Up => "UP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRouting {
    #[default]
    Polyline,
    Orthogonal,
    Splines,
}

impl EdgeRouting {
    fn as_elk(self) -> &'static str {
        match self {
            EdgeRouting::Polyline => "POLYLINE",
            EdgeRouting::Orthogonal => "ORTHOGONAL",
            EdgeRouting::Splines => "SPLINES",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 50.0,
            left: 50.0,
            bottom: 50.0,
            right: 50.0,
        }
    }
}

/// Layered layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub direction: Direction,
    pub padding: Padding,
    /// Spacing between adjacent layers.
    pub layer_spacing: f64,
    pub edge_routing: EdgeRouting,
    /// Let the engine add bend points where they are not strictly needed, e.g. at
    /// every layer an edge crosses, so routes stay on the layer grid.
    pub unnecessary_bend_points: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Right,
            padding: Padding::default(),
            layer_spacing: 50.0,
            edge_routing: EdgeRouting::Polyline,
            unnecessary_bend_points: true,
        }
    }
}

impl LayoutOptions {
    /// The engine's `layoutOptions` key/value map.
    pub fn to_engine_options(&self) -> IndexMap<String, String> {
        let p = &self.padding;
        let mut m = IndexMap::new();
        m.insert("elk.algorithm".into(), "layered".into());
        m.insert("elk.direction".into(), self.direction.as_elk().into());
        m.insert(
            "elk.padding".into(),
            format!(
                "[top={},left={},bottom={},right={}]",
                p.top, p.left, p.bottom, p.right
            ),
        );
        m.insert(
            "elk.layered.spacing.nodeNodeBetweenLayers".into(),
            self.layer_spacing.to_string(),
        );
        m.insert("elk.edgeRouting".into(), self.edge_routing.as_elk().into());
        m.insert(
            "elk.layered.unnecessaryBendpoints".into(),
            self.unnecessary_bend_points.to_string(),
        );
        m
    }
}

/// Attach `options` to a declarative graph, producing the engine request body.
///
/// Options already present on the graph win over the defaults.
pub fn layout_request(graph: Value, options: &LayoutOptions) -> Result<Value, RenderError> {
    let Value::Object(mut obj) = graph else {
        return Err(RenderError::MalformedLayout(
            "layout request graph must be a JSON object".into(),
        ));
    };
    let mut merged = serde_json::Map::new();
    for (k, v) in options.to_engine_options() {
        merged.insert(k, Value::String(v));
    }
    if let Some(Value::Object(existing)) = obj.remove("layoutOptions") {
        merged.extend(existing);
    }
    obj.insert("layoutOptions".into(), Value::Object(merged));
    Ok(Value::Object(obj))
}
