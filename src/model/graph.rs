// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The canvas graph snapshot.
//!
//! Every layout and extraction function takes a `CanvasGraph` (or a filtered view of one) and
//! returns its result as data; nothing in the engine reads ambient state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::edge::{Edge, Highlight};
use super::geometry::Point;
use super::handle::Handle;
use super::ids::{EdgeId, HighlightId, NodeId};
use super::node::{Node, NodeData};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasGraph {
    root_id: NodeId,
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    #[serde(default)]
    highlights: BTreeMap<HighlightId, Highlight>,
    next_seq: u64,
}

/// Everything removed from the graph by [`CanvasGraph::remove_node`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    pub edges: Vec<EdgeId>,
    pub highlights: Vec<HighlightId>,
}

impl CanvasGraph {
    /// Creates a graph holding only the root (document) node, pinned so it shows on every page.
    pub fn with_root(data: NodeData, position: Point) -> Self {
        let root_id = NodeId::sequential("node", 0);
        let mut root = Node::new(root_id.clone(), data, position, 0, 0);
        root.set_pinned(true);

        let mut nodes = BTreeMap::new();
        nodes.insert(root_id.clone(), root);

        Self { root_id, nodes, edges: BTreeMap::new(), highlights: BTreeMap::new(), next_seq: 1 }
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root_id
    }

    pub fn is_root(&self, node_id: &NodeId) -> bool {
        &self.root_id == node_id
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(&self.root_id)
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node_id)
    }

    pub fn edges(&self) -> &BTreeMap<EdgeId, Edge> {
        &self.edges
    }

    pub fn edge_mut(&mut self, edge_id: &EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(edge_id)
    }

    pub fn highlights(&self) -> &BTreeMap<HighlightId, Highlight> {
        &self.highlights
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        seq
    }

    pub fn insert_node(&mut self, data: NodeData, position: Point, page: u32) -> NodeId {
        let seq = self.take_seq();
        let node_id = NodeId::sequential("node", seq);
        self.nodes.insert(node_id.clone(), Node::new(node_id.clone(), data, position, page, seq));
        node_id
    }

    pub fn insert_edge(
        &mut self,
        source: NodeId,
        source_handle: Handle,
        target: NodeId,
        target_handle: Handle,
    ) -> EdgeId {
        let seq = self.take_seq();
        let edge_id = EdgeId::sequential("edge", seq);
        self.edges.insert(
            edge_id.clone(),
            Edge::new(edge_id.clone(), source, source_handle, target, target_handle, seq),
        );
        edge_id
    }

    pub fn insert_highlight(&mut self, text: impl Into<String>, node_id: NodeId, page: u32) -> HighlightId {
        let seq = self.take_seq();
        let highlight_id = HighlightId::sequential("highlight", seq);
        self.highlights
            .insert(highlight_id.clone(), Highlight::new(highlight_id.clone(), text, node_id, page));
        highlight_id
    }

    /// Removes a node together with every edge touching it and every highlight referencing it.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<RemovedNode> {
        let node = self.nodes.remove(node_id)?;

        let edges = self
            .edges
            .values()
            .filter(|edge| edge.touches(node_id))
            .map(|edge| edge.id().clone())
            .collect::<Vec<_>>();
        for edge_id in &edges {
            self.edges.remove(edge_id);
        }

        let highlights = self
            .highlights
            .values()
            .filter(|highlight| highlight.node_id() == node_id)
            .map(|highlight| highlight.id().clone())
            .collect::<Vec<_>>();
        for highlight_id in &highlights {
            self.highlights.remove(highlight_id);
        }

        Some(RemovedNode { node, edges, highlights })
    }

    /// The edge that created `node_id`: the earliest edge targeting it.
    ///
    /// Edges added later (user-drawn links) never replace it, so layout keeps honoring the
    /// original parent.
    pub fn structural_edge(&self, node_id: &NodeId) -> Option<&Edge> {
        self.edges
            .values()
            .filter(|edge| edge.target() == node_id)
            .min_by_key(|edge| edge.seq())
    }

    pub fn structural_parent(&self, node_id: &NodeId) -> Option<&NodeId> {
        self.structural_edge(node_id).map(Edge::source)
    }

    /// Maps every node that has a structural parent to that parent, in one pass over the edges.
    pub fn structural_parents(&self) -> BTreeMap<NodeId, NodeId> {
        let mut first = BTreeMap::<&NodeId, &Edge>::new();
        for edge in self.edges.values() {
            first
                .entry(edge.target())
                .and_modify(|current| {
                    if edge.seq() < current.seq() {
                        *current = edge;
                    }
                })
                .or_insert(edge);
        }
        first
            .into_iter()
            .map(|(target, edge)| (target.clone(), edge.source().clone()))
            .collect()
    }

    /// Structural children of `parent_id`, in creation order.
    pub fn children_of(&self, parent_id: &NodeId) -> Vec<&Node> {
        let mut children = self
            .structural_parents()
            .into_iter()
            .filter(|(_, parent)| parent == parent_id)
            .filter_map(|(child, _)| self.nodes.get(&child))
            .collect::<Vec<_>>();
        children.sort_by_key(|node| node.seq());
        children
    }

    /// A copy of this graph restricted to `node_ids` (plus edges whose endpoints both survive and
    /// highlights attached to surviving nodes).
    pub fn subgraph(&self, node_ids: &BTreeSet<NodeId>) -> Self {
        let nodes = self
            .nodes
            .iter()
            .filter(|(node_id, _)| node_ids.contains(*node_id))
            .map(|(node_id, node)| (node_id.clone(), node.clone()))
            .collect::<BTreeMap<_, _>>();
        let edges = self
            .edges
            .iter()
            .filter(|(_, edge)| nodes.contains_key(edge.source()) && nodes.contains_key(edge.target()))
            .map(|(edge_id, edge)| (edge_id.clone(), edge.clone()))
            .collect();
        let highlights = self
            .highlights
            .iter()
            .filter(|(_, highlight)| nodes.contains_key(highlight.node_id()))
            .map(|(highlight_id, highlight)| (highlight_id.clone(), highlight.clone()))
            .collect();

        Self { root_id: self.root_id.clone(), nodes, edges, highlights, next_seq: self.next_seq }
    }

    /// Writes geometry and handle changes made on a view back into this graph, by id.
    ///
    /// Only positions, measured sizes and edge handles are merged; objects missing from `self`
    /// are ignored.
    pub fn merge_geometry_from(&mut self, view: &CanvasGraph) {
        for (node_id, updated) in &view.nodes {
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.set_position(updated.position());
                node.set_measured_size(updated.measured_size());
            }
        }
        for (edge_id, updated) in &view.edges {
            if let Some(edge) = self.edges.get_mut(edge_id) {
                edge.set_handles(updated.source_handle(), updated.target_handle());
            }
        }
    }
}
