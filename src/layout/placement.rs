// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Initial position and handles for a newly spawned node.
//!
//! Children of the root fill a column on the right until it holds
//! [`LayoutConfig::root_side_capacity`] nodes, then continue on the left. Each new root child goes
//! below the lowest sibling on its side, or level with the root when that side is empty.
//!
//! Children of any other node go one column to the right of their parent, level with it, and are
//! shifted down past whatever visible node they would overlap.

use crate::model::{CanvasGraph, Handle, NodeId, NodeKind, Point, Rect, Side};

use super::config::LayoutConfig;
use super::reflow::side_of_root;
use super::routing::best_handle_pair;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    pub source_handle: Handle,
    pub target_handle: Handle,
}

/// Where a `child_kind` node spawned from `parent_id` should go, given the visible `view`.
///
/// Deterministic: the same view and parent always produce the same placement. An unknown parent
/// falls back to [`LayoutConfig::fallback_position`].
pub fn place_child(
    view: &CanvasGraph,
    parent_id: &NodeId,
    child_kind: NodeKind,
    config: &LayoutConfig,
) -> Placement {
    let Some(parent) = view.node(parent_id) else {
        tracing::warn!(%parent_id, "parent not in view; using fallback placement");
        return Placement {
            position: config.fallback_position,
            source_handle: Handle::RIGHT,
            target_handle: Handle::LEFT,
        };
    };

    let parent_rect = config.node_rect(parent);
    let child_size = config.default_size(child_kind);
    let parent_is_root = view.is_root(parent_id);

    let position = if parent_is_root {
        place_root_child(view, &parent_rect, child_size.width, config)
    } else {
        place_nested_child(view, &parent_rect, child_kind, config)
    };

    let child_rect = Rect::from_origin_size(position, child_size);
    let (source_handle, target_handle) =
        best_handle_pair(&parent_rect, parent_is_root, &child_rect, false);

    tracing::debug!(
        %parent_id,
        x = position.x,
        y = position.y,
        %source_handle,
        %target_handle,
        "placed child"
    );
    Placement { position, source_handle, target_handle }
}

fn place_root_child(
    view: &CanvasGraph,
    root_rect: &Rect,
    child_width: f64,
    config: &LayoutConfig,
) -> Point {
    let siblings = view
        .children_of(view.root_id())
        .into_iter()
        .map(|child| config.node_rect(child))
        .map(|rect| (side_of_root(root_rect, &rect), rect))
        .collect::<Vec<_>>();

    let right_count = siblings.iter().filter(|(side, _)| *side == Side::Right).count();
    let side = if right_count < config.root_side_capacity { Side::Right } else { Side::Left };

    let x = match side {
        Side::Right => root_rect.right() + config.horizontal_gap,
        _ => root_rect.x - child_width - config.horizontal_gap,
    };
    let y = siblings
        .iter()
        .filter(|(sibling_side, _)| *sibling_side == side)
        .map(|(_, rect)| rect.bottom())
        .max_by(f64::total_cmp)
        .map_or(root_rect.y, |lowest_bottom| lowest_bottom + config.vertical_gap);

    Point::new(x, y)
}

fn place_nested_child(
    view: &CanvasGraph,
    parent_rect: &Rect,
    child_kind: NodeKind,
    config: &LayoutConfig,
) -> Point {
    let mut obstacles = view
        .nodes()
        .values()
        .map(|node| (config.node_rect(node), node.seq()))
        .collect::<Vec<_>>();
    obstacles.sort_by(|(a, a_seq), (b, b_seq)| a.y.total_cmp(&b.y).then_with(|| a_seq.cmp(b_seq)));

    let mut candidate = Rect::from_origin_size(
        Point::new(parent_rect.right() + config.horizontal_gap, parent_rect.y),
        config.default_size(child_kind),
    );
    // Every shift moves the candidate strictly below one obstacle, so one attempt per obstacle
    // is enough.
    for _ in 0..=obstacles.len() {
        let Some((blocker, _)) = obstacles.iter().find(|(rect, _)| rect.overlaps(&candidate)) else {
            break;
        };
        candidate.y = blocker.bottom() + config.vertical_gap;
    }

    Point::new(candidate.x, candidate.y)
}
