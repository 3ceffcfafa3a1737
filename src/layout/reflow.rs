// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rebuilding the root-adjacent sibling columns.
//!
//! Answers next to the root grow while their content streams in. Instead of nudging overlaps
//! pairwise, the whole column on that side is restacked in creation order, each sibling directly
//! below the previous one's measured bottom plus [`LayoutConfig::vertical_gap`], starting at the
//! root's top.

use std::collections::BTreeSet;

use crate::model::{CanvasGraph, Node, NodeId, Point, Rect, Side};

use super::collision::resolve_collisions;
use super::config::LayoutConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ReflowOutcome {
    pub graph: CanvasGraph,
    pub moved: Vec<NodeId>,
}

/// Which side of the root `node` sits on, judged by horizontal centers.
pub fn side_of_root(root_rect: &Rect, node_rect: &Rect) -> Side {
    if node_rect.center().x >= root_rect.center().x {
        Side::Right
    } else {
        Side::Left
    }
}

/// Direct root children on `side`, in creation order.
pub fn side_chain<'a>(graph: &'a CanvasGraph, side: Side, config: &LayoutConfig) -> Vec<&'a Node> {
    let Some(root) = graph.root() else {
        return Vec::new();
    };
    let root_rect = config.node_rect(root);
    graph
        .children_of(root.id())
        .into_iter()
        .filter(|child| side_of_root(&root_rect, &config.node_rect(child)) == side)
        .collect()
}

/// Restacks the root-side column containing `node_id`.
///
/// Nodes that are not direct root children have no column; the graph comes back unchanged.
pub fn reflow_side_chain(mut graph: CanvasGraph, node_id: &NodeId, config: &LayoutConfig) -> ReflowOutcome {
    let (Some(root), Some(node)) = (graph.root(), graph.node(node_id)) else {
        return ReflowOutcome { graph, moved: Vec::new() };
    };
    if graph.structural_parent(node_id) != Some(root.id()) {
        return ReflowOutcome { graph, moved: Vec::new() };
    }

    let root_rect = config.node_rect(root);
    let side = side_of_root(&root_rect, &config.node_rect(node));
    let mut next_y = root_rect.y;
    let mut targets = Vec::new();
    for child in side_chain(&graph, side, config) {
        let rect = config.node_rect(child);
        targets.push((child.id().clone(), Point::new(rect.x, next_y)));
        next_y += rect.height + config.vertical_gap;
    }

    let mut moved = Vec::new();
    for (child_id, position) in targets {
        if let Some(child) = graph.node_mut(&child_id) {
            if child.position() != position {
                child.set_position(position);
                moved.push(child_id);
            }
        }
    }
    tracing::debug!(?side, moved = moved.len(), "reflowed root-side column");

    ReflowOutcome { graph, moved }
}

/// Handles the root growing taller: nodes the root newly covers are pushed below it, then
/// collision resolution cascades any secondary overlaps.
pub fn absorb_root_growth(
    mut graph: CanvasGraph,
    previous_root_rect: Rect,
    config: &LayoutConfig,
) -> ReflowOutcome {
    let Some(root) = graph.root() else {
        return ReflowOutcome { graph, moved: Vec::new() };
    };
    let root_rect = config.node_rect(root);
    if root_rect.bottom() <= previous_root_rect.bottom() {
        return ReflowOutcome { graph, moved: Vec::new() };
    }

    let covered = graph
        .nodes()
        .values()
        .filter(|node| !graph.is_root(node.id()))
        .filter(|node| {
            let rect = config.node_rect(node);
            rect.overlaps(&root_rect) && !rect.overlaps(&previous_root_rect)
        })
        .map(|node| node.id().clone())
        .collect::<Vec<_>>();

    let push_to = root_rect.bottom() + config.vertical_gap;
    let mut moved = BTreeSet::new();
    for node_id in covered {
        if let Some(node) = graph.node_mut(&node_id) {
            node.set_position(Point::new(node.position().x, push_to));
            moved.insert(node_id);
        }
    }

    let outcome = resolve_collisions(graph, config);
    moved.extend(outcome.moved);
    ReflowOutcome { graph: outcome.graph, moved: moved.into_iter().collect() }
}
