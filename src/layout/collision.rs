// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pairwise overlap resolution.
//!
//! Nodes only ever move down. Each pass sorts the nodes top to bottom and, for every pair whose
//! horizontal extents overlap, pushes the lower node to clear the upper one by
//! [`LayoutConfig::collision_margin`]. Passes repeat until one changes nothing or
//! [`LayoutConfig::max_collision_passes`] is reached; the root is an obstacle but never moves.

use std::collections::BTreeSet;

use crate::model::{CanvasGraph, NodeId, Point, Rect};

use super::config::LayoutConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionOutcome {
    pub graph: CanvasGraph,
    pub moved: Vec<NodeId>,
    pub passes: usize,
    /// `false` when the pass cap was hit; the layout is then best-effort and may still overlap.
    pub converged: bool,
}

struct Slot {
    node_id: NodeId,
    rect: Rect,
    is_root: bool,
    seq: u64,
}

pub fn resolve_collisions(mut graph: CanvasGraph, config: &LayoutConfig) -> CollisionOutcome {
    let margin = config.collision_margin;
    let mut moved = BTreeSet::<NodeId>::new();
    let mut passes = 0usize;
    let mut converged = false;

    while passes < config.max_collision_passes {
        passes += 1;

        let mut slots = graph
            .nodes()
            .values()
            .map(|node| Slot {
                node_id: node.id().clone(),
                rect: config.node_rect(node),
                is_root: graph.is_root(node.id()),
                seq: node.seq(),
            })
            .collect::<Vec<_>>();
        // Root first among equals so it acts as the obstacle, then creation order.
        slots.sort_by(|a, b| {
            a.rect
                .y
                .total_cmp(&b.rect.y)
                .then_with(|| b.is_root.cmp(&a.is_root))
                .then_with(|| a.seq.cmp(&b.seq))
        });

        let mut changed = false;
        for above_idx in 0..slots.len() {
            for below_idx in (above_idx + 1)..slots.len() {
                let above = slots[above_idx].rect;
                let below = &mut slots[below_idx];
                if below.is_root || !above.overlaps_x(&below.rect) {
                    continue;
                }
                // An earlier push this pass may have moved `above` past `below`; the next pass
                // re-sorts them.
                if below.rect.y < above.y {
                    continue;
                }
                let limit = above.bottom() + margin;
                if below.rect.y < limit {
                    below.rect.y = limit;
                    moved.insert(below.node_id.clone());
                    changed = true;
                }
            }
        }

        for slot in &slots {
            if let Some(node) = graph.node_mut(&slot.node_id) {
                if node.position().y != slot.rect.y {
                    node.set_position(Point::new(slot.rect.x, slot.rect.y));
                }
            }
        }

        if !changed {
            converged = true;
            break;
        }
    }

    if converged {
        tracing::debug!(passes, moved = moved.len(), "collision resolution converged");
    } else {
        tracing::warn!(passes, "collision resolution hit the pass cap; keeping best-effort layout");
    }

    CollisionOutcome { graph, moved: moved.into_iter().collect(), passes, converged }
}

/// Non-root node pairs whose boxes overlap, for diagnostics and tests.
pub fn overlapping_pairs(graph: &CanvasGraph, config: &LayoutConfig) -> Vec<(NodeId, NodeId)> {
    let boxes = graph
        .nodes()
        .values()
        .filter(|node| !graph.is_root(node.id()))
        .map(|node| (node.id(), config.node_rect(node)))
        .collect::<Vec<_>>();

    let mut pairs = Vec::new();
    for (idx, (a_id, a_rect)) in boxes.iter().enumerate() {
        for (b_id, b_rect) in &boxes[idx + 1..] {
            if a_rect.overlaps(b_rect) {
                pairs.push(((*a_id).clone(), (*b_id).clone()));
            }
        }
    }
    pairs
}
