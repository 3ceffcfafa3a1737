// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Handle selection for edges.
//!
//! Connectors are straight segments between two discrete handles. After a node moves, the
//! previously chosen pair may no longer be the shortest one, so every edge touching the node picks
//! the pair of handles whose anchors are closest. Topology never changes here; only handle ids do.

use crate::model::{handles_for, CanvasGraph, EdgeId, Handle, NodeId, Rect};

use super::config::LayoutConfig;

/// The handle pair minimizing the Euclidean distance between anchors.
///
/// Candidates are scanned in [`handles_for`] order and only a strictly shorter pair replaces the
/// current best, so ties resolve the same way every time.
pub fn best_handle_pair(
    source: &Rect,
    source_is_root: bool,
    target: &Rect,
    target_is_root: bool,
) -> (Handle, Handle) {
    let source_handles = handles_for(source_is_root);
    let target_handles = handles_for(target_is_root);

    let mut best = (Handle::RIGHT, Handle::LEFT);
    let mut best_distance = f64::INFINITY;
    for source_handle in &source_handles {
        let from = source_handle.anchor(source);
        for target_handle in &target_handles {
            let distance = from.distance(target_handle.anchor(target));
            if distance < best_distance {
                best_distance = distance;
                best = (*source_handle, *target_handle);
            }
        }
    }
    best
}

#[derive(Debug, Clone, PartialEq)]
pub struct RerouteOutcome {
    pub graph: CanvasGraph,
    /// Edges whose handle pair changed.
    pub rerouted: Vec<EdgeId>,
}

/// Re-picks handles for every edge touching `node_id`.
pub fn reroute_edges(mut graph: CanvasGraph, node_id: &NodeId, config: &LayoutConfig) -> RerouteOutcome {
    let mut updates = Vec::new();
    for edge in graph.edges().values().filter(|edge| edge.touches(node_id)) {
        let (Some(source), Some(target)) = (graph.node(edge.source()), graph.node(edge.target()))
        else {
            tracing::debug!(edge_id = %edge.id(), "skipping edge with a missing endpoint");
            continue;
        };
        let pair = best_handle_pair(
            &config.node_rect(source),
            graph.is_root(source.id()),
            &config.node_rect(target),
            graph.is_root(target.id()),
        );
        if pair != (edge.source_handle(), edge.target_handle()) {
            updates.push((edge.id().clone(), pair));
        }
    }

    let mut rerouted = Vec::with_capacity(updates.len());
    for (edge_id, (source_handle, target_handle)) in updates {
        if let Some(edge) = graph.edge_mut(&edge_id) {
            edge.set_handles(source_handle, target_handle);
            tracing::debug!(%edge_id, %source_handle, %target_handle, "rerouted edge");
            rerouted.push(edge_id);
        }
    }

    RerouteOutcome { graph, rerouted }
}

#[cfg(test)]
mod tests {
    use super::{best_handle_pair, reroute_edges};
    use crate::layout::LayoutConfig;
    use crate::model::fixtures;
    use crate::model::{Handle, Point, Rect, Side, Size};

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::from_origin_size(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn side_by_side_nodes_connect_right_to_left() {
        let pair = best_handle_pair(&rect(0.0, 0.0, 100.0, 100.0), false, &rect(200.0, 0.0, 100.0, 100.0), false);
        assert_eq!(pair, (Handle::RIGHT, Handle::LEFT));
    }

    #[test]
    fn stacked_nodes_connect_bottom_to_top() {
        let pair = best_handle_pair(&rect(0.0, 0.0, 100.0, 100.0), false, &rect(0.0, 300.0, 100.0, 100.0), false);
        assert_eq!(pair, (Handle::BOTTOM, Handle::TOP));
    }

    #[test]
    fn root_uses_the_slot_nearest_the_child() {
        // Root spans y 100..700; a child centered at y = 650 is closest to the last right slot.
        let pair = best_handle_pair(&rect(100.0, 100.0, 700.0, 600.0), true, &rect(880.0, 600.0, 360.0, 100.0), false);
        assert_eq!(pair, (Handle::slotted(Side::Right, 9).unwrap(), Handle::LEFT));
    }

    #[test]
    fn moving_a_child_under_its_parent_rewrites_handles_only() {
        let mut graph = fixtures::root_with_chain(2);
        let config = LayoutConfig::default();
        let first = graph.children_of(graph.root_id())[0].id().clone();
        let second = graph.children_of(&first)[0].id().clone();
        let edges_before = graph.edges().len();

        // Drop the grandchild straight below its parent.
        graph.node_mut(&second).expect("second").set_position(Point::new(880.0, 600.0));
        let outcome = reroute_edges(graph, &second, &config);

        assert_eq!(outcome.rerouted.len(), 1);
        let edge = outcome.graph.structural_edge(&second).expect("edge");
        assert_eq!((edge.source_handle(), edge.target_handle()), (Handle::BOTTOM, Handle::TOP));
        assert_eq!(edge.source(), &first);
        assert_eq!(outcome.graph.edges().len(), edges_before);
    }

    #[test]
    fn rerouting_an_already_optimal_edge_is_a_no_op() {
        let graph = fixtures::root_with_chain(2);
        let config = LayoutConfig::default();
        let first = graph.children_of(graph.root_id())[0].id().clone();
        let second = graph.children_of(&first)[0].id().clone();

        let outcome = reroute_edges(graph.clone(), &second, &config);
        assert!(outcome.rerouted.is_empty());
        assert_eq!(outcome.graph, graph);
    }
}
