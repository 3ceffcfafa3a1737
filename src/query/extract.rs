// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Export-time extraction of the question/answer hierarchy.
//!
//! The canvas stores a flat node/edge set. For export it is folded back into a forest of answer
//! trees (one per answer spawned directly from the document) plus each page's quiz questions.
//! Extraction never fails: edges pointing at missing nodes are skipped, and recursion is bounded
//! by a visited set and a depth cap.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::{CanvasGraph, Edge, FollowUp, Node, NodeData, NodeId, NodeKind, NodeStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaNode {
    pub id: NodeId,
    pub question: String,
    pub context: String,
    pub answer: String,
    pub follow_ups: Vec<FollowUp>,
    pub status: NodeStatus,
    pub children: Vec<QaNode>,
}

impl QaNode {
    /// Longest parent-to-descendant path below this node, in edges.
    pub fn depth(&self) -> usize {
        self.children.iter().map(|child| child.depth() + 1).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizItem {
    pub id: NodeId,
    pub question: String,
    pub sequence: u32,
    pub response: Option<String>,
    pub feedback: Option<String>,
    pub status: NodeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizPage {
    pub page: u32,
    pub questions: Vec<QuizItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExportTree {
    pub roots: Vec<QaNode>,
    /// Ascending by page.
    pub quizzes: Vec<QuizPage>,
}

/// Parent links from the earliest edge into each node. A node whose earliest incoming edge has a
/// missing endpoint has no parent; later edges are cross links and never stand in for it.
fn sound_structural_parents(graph: &CanvasGraph) -> BTreeMap<&NodeId, &NodeId> {
    let mut edges = graph.edges().values().collect::<Vec<&Edge>>();
    edges.sort_by_key(|edge| edge.seq());

    let mut structural = BTreeMap::<&NodeId, &Edge>::new();
    for edge in edges {
        structural.entry(edge.target()).or_insert(edge);
    }

    structural
        .into_iter()
        .filter(|(target, edge)| {
            let sound = graph.nodes().contains_key(edge.source()) && graph.nodes().contains_key(*target);
            if !sound {
                tracing::warn!(edge_id = %edge.id(), "skipping dangling edge during extraction");
            }
            sound
        })
        .map(|(target, edge)| (target, edge.source()))
        .collect()
}

struct TreeBuilder<'a> {
    children: BTreeMap<&'a NodeId, Vec<&'a Node>>,
    visited: BTreeSet<&'a NodeId>,
    depth_cap: usize,
}

impl<'a> TreeBuilder<'a> {
    fn build(&mut self, node: &'a Node, depth: usize) -> Option<QaNode> {
        let NodeData::Answer { question, context, answer, follow_ups, .. } = node.data() else {
            return None;
        };
        if !self.visited.insert(node.id()) {
            tracing::warn!(node_id = %node.id(), "cycle in answer graph; node already exported");
            return None;
        }

        let mut children = Vec::new();
        if depth < self.depth_cap {
            let next = self.children.get(node.id()).cloned().unwrap_or_default();
            for child in next {
                if let Some(qa) = self.build(child, depth + 1) {
                    children.push(qa);
                }
            }
        } else if self.children.contains_key(node.id()) {
            tracing::warn!(node_id = %node.id(), depth, "extraction depth cap reached; truncating");
        }

        Some(QaNode {
            id: node.id().clone(),
            question: question.clone(),
            context: context.clone(),
            answer: answer.clone(),
            follow_ups: follow_ups.clone(),
            status: node.status(),
            children,
        })
    }
}

pub fn extract_export(graph: &CanvasGraph, depth_cap: usize) -> ExportTree {
    let parents = sound_structural_parents(graph);

    let mut children = BTreeMap::<&NodeId, Vec<&Node>>::new();
    let mut top_level = Vec::<&Node>::new();
    for node in graph.nodes().values() {
        match node.kind() {
            NodeKind::Answer => {}
            NodeKind::Content | NodeKind::QuizQuestion | NodeKind::Flashcard => continue,
        }
        match parents.get(node.id()) {
            Some(parent) if !graph.is_root(parent) => {
                children.entry(*parent).or_default().push(node);
            }
            _ => top_level.push(node),
        }
    }
    for siblings in children.values_mut() {
        siblings.sort_by_key(|node| node.seq());
    }
    top_level.sort_by_key(|node| node.seq());

    let mut builder = TreeBuilder { children, visited: BTreeSet::new(), depth_cap };
    let roots = top_level.into_iter().filter_map(|node| builder.build(node, 0)).collect();

    ExportTree { roots, quizzes: quizzes_by_page(graph) }
}

/// Quiz questions grouped by page, each page ordered by its questions' sequence numbers.
pub fn quizzes_by_page(graph: &CanvasGraph) -> Vec<QuizPage> {
    let mut pages = BTreeMap::<u32, Vec<(u64, QuizItem)>>::new();
    for node in graph.nodes().values() {
        let NodeData::QuizQuestion { question, sequence, response, feedback } = node.data() else {
            continue;
        };
        pages.entry(node.page()).or_default().push((
            node.seq(),
            QuizItem {
                id: node.id().clone(),
                question: question.clone(),
                sequence: *sequence,
                response: response.clone(),
                feedback: feedback.clone(),
                status: node.status(),
            },
        ));
    }

    pages
        .into_iter()
        .map(|(page, mut items)| {
            items.sort_by(|(a_seq, a), (b_seq, b)| a.sequence.cmp(&b.sequence).then(a_seq.cmp(b_seq)));
            QuizPage { page, questions: items.into_iter().map(|(_, item)| item).collect() }
        })
        .collect()
}

/// Input for generating a review quiz from the answers a reader marked as struggling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSeed {
    pub highlighted_text: String,
    pub question: String,
    pub answer: String,
}

/// Struggling answers in creation order.
pub fn struggling_nodes(graph: &CanvasGraph) -> Vec<QuizSeed> {
    let mut nodes = graph
        .nodes()
        .values()
        .filter(|node| node.status() == NodeStatus::Struggling)
        .collect::<Vec<_>>();
    nodes.sort_by_key(|node| node.seq());

    nodes
        .into_iter()
        .filter_map(|node| match node.data() {
            NodeData::Answer { question, context, answer, .. } => Some(QuizSeed {
                highlighted_text: context.clone(),
                question: question.clone(),
                answer: answer.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// What a follow-up question asked from an answer node needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryContext {
    pub highlighted_text: String,
    /// The parent answer's text, when the node was spawned from another answer.
    pub parent_response: Option<String>,
}

pub fn query_context(graph: &CanvasGraph, node_id: &NodeId) -> Option<QueryContext> {
    let NodeData::Answer { context, .. } = graph.node(node_id)?.data() else {
        return None;
    };
    let parent_response = graph
        .structural_parent(node_id)
        .and_then(|parent_id| graph.node(parent_id))
        .and_then(|parent| match parent.data() {
            NodeData::Answer { answer, .. } => Some(answer.clone()),
            _ => None,
        });
    Some(QueryContext { highlighted_text: context.clone(), parent_response })
}
