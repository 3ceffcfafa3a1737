// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Page-based visibility.
//!
//! The visible view is the only graph the layout passes ever see. Writes made against it are
//! merged back into the full graph with [`CanvasGraph::merge_geometry_from`], so nodes on other
//! pages never take part in placement or collision math.

use std::collections::BTreeSet;

use crate::model::{CanvasGraph, Node, NodeId, NodeKind};

pub fn is_visible(graph: &CanvasGraph, node: &Node, active_page: u32) -> bool {
    if graph.is_root(node.id()) {
        return true;
    }
    match node.kind() {
        NodeKind::Content => true,
        NodeKind::Answer | NodeKind::QuizQuestion | NodeKind::Flashcard => {
            node.pinned() || node.page() == active_page
        }
    }
}

pub fn visible_node_ids(graph: &CanvasGraph, active_page: u32) -> BTreeSet<NodeId> {
    graph
        .nodes()
        .values()
        .filter(|node| is_visible(graph, node, active_page))
        .map(|node| node.id().clone())
        .collect()
}

/// The subgraph shown on `active_page`. Edges survive only when both endpoints do.
pub fn visible_view(graph: &CanvasGraph, active_page: u32) -> CanvasGraph {
    graph.subgraph(&visible_node_ids(graph, active_page))
}
