//! Turn a layout tree into cells on a [`Surface`].
//!
//! The walk is depth-first pre-order: a node's cell is created, then its
//! children and ports (in order, with the new cell as parent), then the
//! node's edges. Edges can therefore reference any node materialized before
//! them in that order.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::RenderError;
use crate::geometry::Bounds;
use crate::layout::{self, LayoutEdge, LayoutNode};
use crate::scene::{CellHandle, CellValue, EdgeSpec, Surface, VertexSpec};
use crate::style::{StyleOverrides, StyleTag, parse_tag};

/// Suffix of the anchor cell created for every transition edge.
pub const TRANSITION_ANCHOR_SUFFIX: &str = "_mid";

/// What to do with the subtree under a `midpoint` node, which never gets a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MidpointPolicy {
    /// Keep walking; nested cells and edges attach to the default parent.
    #[default]
    AttachToDefaultParent,
    /// Ignore everything below the midpoint.
    SkipSubtree,
    /// Fail the render.
    Reject,
}

/// An edge that was not drawn.
#[derive(Debug)]
pub struct SkippedEdge {
    pub edge: String,
    pub reason: RenderError,
}

/// Counts of what a materialization produced.
#[derive(Debug, Default)]
pub struct MaterializeReport {
    pub vertices: usize,
    pub edges: usize,
    pub anchors: usize,
    pub midpoints: usize,
    pub skipped: Vec<SkippedEdge>,
}

/// Walks layout trees onto a surface.
#[derive(Debug, Default)]
pub struct Materializer {
    policy: MidpointPolicy,
    report: MaterializeReport,
}

impl Materializer {
    pub fn new(policy: MidpointPolicy) -> Self {
        Self {
            policy,
            report: MaterializeReport::default(),
        }
    }

    pub fn report(&self) -> &MaterializeReport {
        &self.report
    }

    pub fn into_report(self) -> MaterializeReport {
        self.report
    }

    /// Materialize `node` and everything below it under `parent`.
    ///
    /// Returns the node's cell, or `None` for a midpoint. Dangling edges are
    /// recorded in the report and skipped; any other error aborts.
    pub fn materialize(
        &mut self,
        surface: &mut dyn Surface,
        parent: Option<CellHandle>,
        node: &LayoutNode,
    ) -> Result<Option<CellHandle>, RenderError> {
        let cell = if node.is_midpoint() {
            self.report.midpoints += 1;
            match self.policy {
                MidpointPolicy::AttachToDefaultParent => {
                    debug!(id = node.id.as_str(); "Midpoint produces no cell");
                    None
                }
                MidpointPolicy::SkipSubtree => return Ok(None),
                MidpointPolicy::Reject => return Err(midpoint_rejected(node)),
            }
        } else {
            let tag = resolve_node_tag(node)?;
            let handle = surface.insert_vertex(
                parent,
                VertexSpec {
                    id: node.id.clone(),
                    value: CellValue {
                        label: node.label.clone(),
                        code: None,
                        text: node.text.clone(),
                    },
                    bounds: Bounds::new(node.x, node.y, node.width, node.height),
                    tag: Some(tag),
                },
            )?;
            self.report.vertices += 1;
            Some(handle)
        };

        for nested in node.nested() {
            self.materialize(surface, cell, nested)?;
        }

        for edge in &node.edges {
            match materialize_edge(surface, cell, edge) {
                Ok(created) => {
                    self.report.edges += 1;
                    self.report.anchors += created.anchor.is_some() as usize;
                }
                Err(err) if err.is_per_edge() => {
                    warn!(edge = edge.id.as_str(), err:err; "Skipping edge");
                    self.report.skipped.push(SkippedEdge {
                        edge: edge.id.clone(),
                        reason: err,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(cell)
    }
}

/// Cells created for one layout edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializedEdge {
    pub edge: CellHandle,
    /// Attachment point created for transitions.
    pub anchor: Option<CellHandle>,
}

/// Style tag for a node; an active state becomes `currentstate`.
pub fn resolve_node_tag(node: &LayoutNode) -> Result<StyleTag, RenderError> {
    let tag = parse_tag(&node.id, &node.cresttype)?;
    if tag == StyleTag::State && node.currentstate {
        return Ok(StyleTag::CurrentState);
    }
    Ok(tag)
}

/// Create the connector for `edge` between two already materialized cells.
///
/// Fails with [`RenderError::DanglingEndpoint`] naming the first endpoint id
/// that has no cell. The connector's points become its existing points,
/// followed by the first section's bend points and end point.
pub fn materialize_edge(
    surface: &mut dyn Surface,
    parent: Option<CellHandle>,
    edge: &LayoutEdge,
) -> Result<MaterializedEdge, RenderError> {
    let tag = parse_tag(&edge.id, &edge.cresttype)?;
    let source = resolve_endpoint(surface, edge, edge.source())?;
    let target = resolve_endpoint(surface, edge, edge.target())?;

    let handle = surface.insert_edge(
        parent,
        EdgeSpec {
            id: edge.id.clone(),
            value: CellValue {
                label: edge.label.clone(),
                code: edge.code.clone(),
                text: edge.text.clone(),
            },
            source,
            target,
            tag: Some(tag),
        },
    )?;

    let anchor = if tag == StyleTag::Transition {
        let overrides = StyleOverrides {
            stroke_color: Some(Rgb::GREEN),
            rounded: Some(true),
            ..StyleOverrides::default()
        };
        Some(surface.insert_anchor(
            handle,
            format!("{}{TRANSITION_ANCHOR_SUFFIX}", edge.id),
            "mid".to_string(),
            overrides,
        )?)
    } else {
        None
    };

    if edge.sections.len() > 1 {
        debug!(edge = edge.id.as_str(), sections = edge.sections.len(); "Only the first edge section is rendered");
    }
    let mut points = surface.edge_points(handle);
    points.extend(edge.route());
    surface.set_edge_points(handle, points);

    Ok(MaterializedEdge {
        edge: handle,
        anchor,
    })
}

fn resolve_endpoint(
    surface: &dyn Surface,
    edge: &LayoutEdge,
    id: Option<&str>,
) -> Result<CellHandle, RenderError> {
    let id = id.unwrap_or_default();
    surface
        .lookup(id)
        .ok_or_else(|| RenderError::DanglingEndpoint {
            edge: edge.id.clone(),
            endpoint: id.to_string(),
        })
}

fn midpoint_rejected(node: &LayoutNode) -> RenderError {
    RenderError::MalformedLayout(format!("midpoint node '{}' is not allowed", node.id))
}

/// Validate `root` and materialize it under the surface's default parent in one update.
///
/// With [`MidpointPolicy::Reject`] a midpoint anywhere in the tree fails before
/// the surface is touched.
pub fn materialize_tree(
    surface: &mut dyn Surface,
    root: &LayoutNode,
    policy: MidpointPolicy,
) -> Result<MaterializeReport, RenderError> {
    layout::validate(root)?;
    if policy == MidpointPolicy::Reject {
        if let Some(node) = root.walk().into_iter().find(|n| n.is_midpoint()) {
            return Err(midpoint_rejected(node));
        }
    }
    let mut materializer = Materializer::new(policy);
    surface.begin_update();
    let result = materializer.materialize(surface, None, root);
    surface.end_update();
    result?;
    let report = materializer.into_report();
    info!(
        vertices = report.vertices,
        edges = report.edges,
        skipped = report.skipped.len();
        "Layout materialized"
    );
    Ok(report)
}
