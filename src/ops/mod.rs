// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for a canvas.
//!
//! Every UI or streaming event becomes a [`CanvasOp`]. Applying one mutates the owned graph,
//! runs whichever layout passes the event calls for against the page's visible view, merges the
//! geometry back and reports a coarse [`Delta`] the UI can use to refresh.

use std::collections::BTreeSet;
use std::fmt;

use crate::layout::LayoutConfig;
use crate::model::{CanvasGraph, EdgeId, Handle, NodeData, NodeId, NodeStatus, Point, Size};
use crate::query::{extract_export, visible_view, ExportTree};

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    /// Spawn a node from `parent_id` (asking a question, invoking a tool).
    CreateNode {
        parent_id: NodeId,
        data: NodeData,
        pinned: bool,
        /// Quoted passage the node was spawned from.
        highlight: Option<String>,
    },
    /// The renderer measured a node.
    Measure { node_id: NodeId, size: Size },
    AppendAnswer { node_id: NodeId, chunk: String },
    FinishStream { node_id: NodeId, cancelled: bool },
    CompleteDrag { node_id: NodeId, position: Point },
    Delete { node_id: NodeId },
    Navigate { page: u32 },
    SetStatus { node_id: NodeId, status: NodeStatus },
    SetPinned { node_id: NodeId, pinned: bool },
    AddFollowUp { node_id: NodeId, question: String, answer: String },
}

impl CanvasOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateNode { .. } => "create_node",
            Self::Measure { .. } => "measure",
            Self::AppendAnswer { .. } => "append_answer",
            Self::FinishStream { .. } => "finish_stream",
            Self::CompleteDrag { .. } => "complete_drag",
            Self::Delete { .. } => "delete",
            Self::Navigate { .. } => "navigate",
            Self::SetStatus { .. } => "set_status",
            Self::SetPinned { .. } => "set_pinned",
            Self::AddFollowUp { .. } => "add_follow_up",
        }
    }
}

/// Result of [`CanvasOp::CreateNode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub node_id: NodeId,
    /// `None` when the parent was unknown or off screen and the node went to the fallback position.
    pub edge_id: Option<EdgeId>,
    pub position: Point,
    pub source_handle: Handle,
    pub target_handle: Handle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragVerdict {
    Accepted,
    /// The proposed position overlapped another visible node; nothing changed.
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyResult {
    pub rev: u64,
    pub delta: Delta,
    pub created: Option<Created>,
    pub drag: Option<DragVerdict>,
}

/// Objects affected by an operation.
///
/// Coarse on purpose: it names what changed, not how.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub updated: Vec<NodeId>,
    pub moved: Vec<NodeId>,
    pub removed_edges: Vec<EdgeId>,
    pub rerouted: Vec<EdgeId>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.updated.is_empty()
            && self.moved.is_empty()
            && self.removed_edges.is_empty()
            && self.rerouted.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<NodeId>,
    removed: BTreeSet<NodeId>,
    updated: BTreeSet<NodeId>,
    moved: BTreeSet<NodeId>,
    removed_edges: BTreeSet<EdgeId>,
    rerouted: BTreeSet<EdgeId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, node_id: NodeId) {
        self.removed.remove(&node_id);
        self.updated.remove(&node_id);
        self.added.insert(node_id);
    }

    fn record_removed(&mut self, node_id: NodeId) {
        self.added.remove(&node_id);
        self.updated.remove(&node_id);
        self.moved.remove(&node_id);
        self.removed.insert(node_id);
    }

    fn record_updated(&mut self, node_id: NodeId) {
        if self.added.contains(&node_id) || self.removed.contains(&node_id) {
            return;
        }
        self.updated.insert(node_id);
    }

    fn record_moved(&mut self, node_ids: impl IntoIterator<Item = NodeId>) {
        for node_id in node_ids {
            if !self.removed.contains(&node_id) {
                self.moved.insert(node_id);
            }
        }
    }

    fn record_rerouted(&mut self, edge_ids: impl IntoIterator<Item = EdgeId>) {
        self.rerouted.extend(edge_ids);
    }

    fn record_removed_edges(&mut self, edge_ids: impl IntoIterator<Item = EdgeId>) {
        for edge_id in edge_ids {
            self.rerouted.remove(&edge_id);
            self.removed_edges.insert(edge_id);
        }
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
            moved: self.moved.into_iter().collect(),
            removed_edges: self.removed_edges.into_iter().collect(),
            rerouted: self.rerouted.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    NotFound { node_id: NodeId },
    NotAnAnswer { node_id: NodeId },
    /// The root document node cannot be deleted.
    RootImmutable,
    /// A canvas has exactly one content node.
    DuplicateRoot,
    NonFiniteGeometry { node_id: NodeId },
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { node_id } => write!(f, "node not found (id={node_id})"),
            Self::NotAnAnswer { node_id } => write!(f, "node is not an answer (id={node_id})"),
            Self::RootImmutable => f.write_str("the root node cannot be deleted"),
            Self::DuplicateRoot => f.write_str("a canvas holds exactly one content node"),
            Self::NonFiniteGeometry { node_id } => {
                write!(f, "non-finite position or size for node {node_id}")
            }
        }
    }
}

impl std::error::Error for CanvasError {}

/// A document canvas: the full graph, the page being viewed and the layout tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    graph: CanvasGraph,
    active_page: u32,
    config: LayoutConfig,
    rev: u64,
}

impl Canvas {
    pub fn new(graph: CanvasGraph, config: LayoutConfig) -> Self {
        Self { graph, active_page: 0, config, rev: 0 }
    }

    /// Rebuilds a canvas from a persisted snapshot.
    pub fn restore(graph: CanvasGraph, active_page: u32, config: LayoutConfig) -> Self {
        Self { graph, active_page, config, rev: 0 }
    }

    /// A fresh canvas for an uploaded document, with the root at `config.root_position`.
    pub fn for_document(title: impl Into<String>, page_count: u32, config: LayoutConfig) -> Self {
        let graph = CanvasGraph::with_root(
            NodeData::Content { title: title.into(), page_count },
            config.root_position,
        );
        Self::new(graph, config)
    }

    pub fn graph(&self) -> &CanvasGraph {
        &self.graph
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn active_page(&self) -> u32 {
        self.active_page
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    /// The subgraph shown on the active page.
    pub fn visible(&self) -> CanvasGraph {
        visible_view(&self.graph, self.active_page)
    }

    pub fn export(&self) -> ExportTree {
        extract_export(&self.graph, self.config.extraction_depth_cap)
    }

    pub fn apply(&mut self, op: CanvasOp) -> Result<ApplyResult, CanvasError> {
        let name = op.name();
        let mut delta = DeltaBuilder::default();
        let mut created = None;
        let mut drag = None;

        let mutated = match op {
            CanvasOp::CreateNode { parent_id, data, pinned, highlight } => {
                created = Some(self.create_node(&parent_id, data, pinned, highlight, &mut delta)?);
                true
            }
            CanvasOp::Measure { node_id, size } => {
                self.measure(&node_id, size, &mut delta)?;
                true
            }
            CanvasOp::AppendAnswer { node_id, chunk } => {
                self.append_answer(&node_id, &chunk, &mut delta)?
            }
            CanvasOp::FinishStream { node_id, cancelled } => {
                self.finish_stream(&node_id, cancelled, &mut delta)?
            }
            CanvasOp::CompleteDrag { node_id, position } => {
                let verdict = self.complete_drag(&node_id, position, &mut delta)?;
                drag = Some(verdict);
                verdict == DragVerdict::Accepted
            }
            CanvasOp::Delete { node_id } => {
                self.delete(&node_id, &mut delta)?;
                true
            }
            CanvasOp::Navigate { page } => {
                self.active_page = page;
                false
            }
            CanvasOp::SetStatus { node_id, status } => {
                self.node_mut(&node_id)?.set_status(status);
                delta.record_updated(node_id);
                true
            }
            CanvasOp::SetPinned { node_id, pinned } => {
                self.node_mut(&node_id)?.set_pinned(pinned);
                delta.record_updated(node_id);
                true
            }
            CanvasOp::AddFollowUp { node_id, question, answer } => {
                self.add_follow_up(&node_id, question, answer, &mut delta)?;
                true
            }
        };

        if mutated {
            self.rev = self.rev.saturating_add(1);
        }
        let delta = delta.finish();
        tracing::debug!(op = name, rev = self.rev, changed = !delta.is_empty(), "applied canvas op");

        Ok(ApplyResult { rev: self.rev, delta, created, drag })
    }

    /// Applies `ops` in order; if any fails the canvas is left exactly as it was.
    pub fn apply_all(&mut self, ops: Vec<CanvasOp>) -> Result<Vec<ApplyResult>, CanvasError> {
        let mut staged = self.clone();
        let mut results = Vec::with_capacity(ops.len());
        for op in ops {
            results.push(staged.apply(op)?);
        }
        *self = staged;
        Ok(results)
    }
}

// Per-operation implementations.
include!("ops_impl.rs");
