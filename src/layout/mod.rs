//! Layout result produced by the external layered layout engine.
//!
//! The engine returns a JSON tree: nodes carry computed positions and sizes,
//! may nest children and ports, and may declare edges whose routes are given
//! as sections of bend points. Only the fields the renderer needs are modelled;
//! everything else in the JSON is ignored.
//!
//! Coordinates of children, ports and edge points are relative to the node
//! that contains them.

mod options;
mod validate;

pub use options::{Direction, EdgeRouting, LayoutOptions, Padding, layout_request};
pub use validate::validate;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::geometry::Point;

// ────────────────────────────────────────────────────────────────────────────
// Points and sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl From<LayoutPoint> for Point {
    fn from(p: LayoutPoint) -> Self {
        Point::new(p.x, p.y)
    }
}

/// One routed segment of an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub start_point: Option<LayoutPoint>,
    pub end_point: LayoutPoint,
    #[serde(default)]
    pub bend_points: Vec<LayoutPoint>,
}

// ────────────────────────────────────────────────────────────────────────────
// Nodes and edges
// ────────────────────────────────────────────────────────────────────────────

/// A positioned node. Ports use the same structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    /// Style tag name, e.g. `entity`, `state`, `input`, `midpoint`.
    pub cresttype: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Marks the active state of a state machine.
    #[serde(default)]
    pub currentstate: bool,
    /// Tooltip text; the label is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<LayoutNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<LayoutEdge>,
}

/// A routed edge between two nodes or ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    pub cresttype: String,
    #[serde(default)]
    pub label: String,
    /// Exactly one source id is supported.
    pub sources: Vec<String>,
    /// Exactly one target id is supported.
    pub targets: Vec<String>,
    /// Source text shown when the edge is double-clicked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<EdgeSection>,
}

impl LayoutEdge {
    pub fn source(&self) -> Option<&str> {
        self.sources.first().map(String::as_str)
    }

    pub fn target(&self) -> Option<&str> {
        self.targets.first().map(String::as_str)
    }

    /// Display route taken from the first section: bend points then the end point.
    ///
    /// Further sections are not rendered.
    pub fn route(&self) -> Vec<Point> {
        let Some(section) = self.sections.first() else {
            return Vec::new();
        };
        section
            .bend_points
            .iter()
            .copied()
            .map(Point::from)
            .chain(std::iter::once(section.end_point.into()))
            .collect()
    }
}

impl LayoutNode {
    pub fn is_midpoint(&self) -> bool {
        self.cresttype == "midpoint"
    }

    /// Children followed by ports, the order in which they are materialized.
    pub fn nested(&self) -> impl Iterator<Item = &LayoutNode> {
        self.children.iter().chain(self.ports.iter())
    }

    /// Number of nodes in this subtree, including `self`, children and ports.
    pub fn node_count(&self) -> usize {
        1 + self.nested().map(LayoutNode::node_count).sum::<usize>()
    }

    /// Number of edges declared anywhere in this subtree.
    pub fn edge_count(&self) -> usize {
        self.edges.len() + self.nested().map(LayoutNode::edge_count).sum::<usize>()
    }

    /// Depth-first pre-order walk over this node and every nested node.
    pub fn walk(&self) -> Vec<&LayoutNode> {
        fn rec<'a>(node: &'a LayoutNode, out: &mut Vec<&'a LayoutNode>) {
            out.push(node);
            for n in node.nested() {
                rec(n, out);
            }
        }
        let mut out = Vec::new();
        rec(self, &mut out);
        out
    }

    /// Find a node anywhere in this subtree.
    pub fn find(&self, id: &str) -> Option<&LayoutNode> {
        if self.id == id {
            return Some(self);
        }
        self.nested().find_map(|n| n.find(id))
    }
}

/// Parse the engine's JSON output.
pub fn parse_layout(json: &str) -> Result<LayoutNode, RenderError> {
    serde_json::from_str(json).map_err(|e| RenderError::MalformedLayout(e.to_string()))
}

/// Read and parse a layout result from disk.
pub fn load_layout<P: AsRef<std::path::Path>>(path: P) -> Result<LayoutNode, RenderError> {
    let content = std::fs::read_to_string(path)?;
    parse_layout(&content)
}
