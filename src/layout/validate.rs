use std::collections::HashSet;

use log::debug;

use super::{LayoutEdge, LayoutNode};
use crate::error::RenderError;
use crate::materialize::TRANSITION_ANCHOR_SUFFIX;
use crate::style::StyleTag;

/// Check a layout tree before anything is materialized.
///
/// Rejects duplicate ids, edges without exactly one source and one target,
/// tags outside the vocabulary (or used on the wrong kind of element), and
/// non-finite or negative geometry. Whether edge endpoints resolve is left to
/// the materializer, which skips dangling edges individually.
///
/// Every transition reserves the id of its anchor cell (`<id>_mid`); a node or
/// edge using that id is rejected as well.
pub fn validate(root: &LayoutNode) -> Result<(), RenderError> {
    let mut seen = HashSet::new();
    validate_node(root, &mut seen)?;
    let anchors = transition_anchors(root);
    for (edge, anchor) in &anchors {
        if seen.contains(anchor.as_str()) {
            return Err(malformed(format!(
                "id '{anchor}' is reserved for the anchor of transition '{edge}'"
            )));
        }
    }
    debug!(ids = seen.len(), anchors = anchors.len(); "Layout validated");
    Ok(())
}

fn transition_anchors(root: &LayoutNode) -> Vec<(&str, String)> {
    root.walk()
        .into_iter()
        .flat_map(|n| &n.edges)
        .filter(|e| matches!(e.cresttype.parse::<StyleTag>(), Ok(StyleTag::Transition)))
        .map(|e| (e.id.as_str(), format!("{}{TRANSITION_ANCHOR_SUFFIX}", e.id)))
        .collect()
}

fn validate_node<'a>(node: &'a LayoutNode, seen: &mut HashSet<&'a str>) -> Result<(), RenderError> {
    if !seen.insert(node.id.as_str()) {
        return Err(malformed(format!("duplicate id '{}'", node.id)));
    }
    match node.cresttype.parse::<StyleTag>() {
        Ok(tag) if tag.is_edge() || tag == StyleTag::CurrentState => {
            return Err(malformed(format!(
                "node '{}' uses tag '{}' which is not a node tag",
                node.id, node.cresttype
            )));
        }
        Ok(_) => {}
        Err(_) => {
            return Err(RenderError::UnknownStyleTag {
                id: node.id.clone(),
                tag: node.cresttype.clone(),
            });
        }
    }
    for (name, v) in [("x", node.x), ("y", node.y)] {
        if !v.is_finite() {
            return Err(malformed(format!("node '{}' has non-finite {name}", node.id)));
        }
    }
    for (name, v) in [("width", node.width), ("height", node.height)] {
        if !v.is_finite() || v < 0.0 {
            return Err(malformed(format!("node '{}' has invalid {name} {v}", node.id)));
        }
    }
    for nested in node.nested() {
        validate_node(nested, seen)?;
    }
    for edge in &node.edges {
        validate_edge(edge, seen)?;
    }
    Ok(())
}

fn validate_edge<'a>(edge: &'a LayoutEdge, seen: &mut HashSet<&'a str>) -> Result<(), RenderError> {
    if !seen.insert(edge.id.as_str()) {
        return Err(malformed(format!("duplicate id '{}'", edge.id)));
    }
    match edge.cresttype.parse::<StyleTag>() {
        Ok(tag) if tag.is_edge() => {}
        Ok(_) => {
            return Err(malformed(format!(
                "edge '{}' uses tag '{}' which is not an edge tag",
                edge.id, edge.cresttype
            )));
        }
        Err(_) => {
            return Err(RenderError::UnknownStyleTag {
                id: edge.id.clone(),
                tag: edge.cresttype.clone(),
            });
        }
    }
    if edge.sources.len() != 1 || edge.targets.len() != 1 {
        return Err(malformed(format!(
            "edge '{}' must have exactly one source and one target (got {} and {})",
            edge.id,
            edge.sources.len(),
            edge.targets.len()
        )));
    }
    let points = edge
        .sections
        .iter()
        .flat_map(|s| s.bend_points.iter().chain(std::iter::once(&s.end_point)));
    for p in points {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(malformed(format!("edge '{}' has a non-finite route point", edge.id)));
        }
    }
    Ok(())
}

fn malformed(msg: String) -> RenderError {
    RenderError::MalformedLayout(msg)
}
