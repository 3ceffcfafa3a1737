// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::geometry::{Point, Size};
use super::graph::CanvasGraph;
use super::handle::Handle;
use super::ids::NodeId;
use super::node::NodeData;

pub(crate) const ROOT_POSITION: Point = Point::new(100.0, 100.0);
pub(crate) const ROOT_SIZE: Size = Size::new(700.0, 600.0);

pub(crate) fn answer(label: &str) -> NodeData {
    NodeData::Answer {
        question: format!("Q {label}"),
        context: format!("passage {label}"),
        answer: format!("A {label}"),
        follow_ups: Vec::new(),
        streaming: Default::default(),
    }
}

pub(crate) fn quiz(question: &str, sequence: u32) -> NodeData {
    NodeData::QuizQuestion { question: question.to_owned(), sequence, response: None, feedback: None }
}

/// A document root at (100, 100), measured at 700x600.
pub(crate) fn canvas_with_root() -> CanvasGraph {
    let mut graph = CanvasGraph::with_root(
        NodeData::Content { title: "paper.pdf".to_owned(), page_count: 12 },
        ROOT_POSITION,
    );
    let root_id = graph.root_id().clone();
    graph.node_mut(&root_id).expect("root").set_measured_size(Some(ROOT_SIZE));
    graph
}

/// Adds an answer node at `position` with the given measured height, linked from `parent`.
pub(crate) fn add_answer(
    graph: &mut CanvasGraph,
    parent: &NodeId,
    label: &str,
    position: Point,
    height: f64,
) -> NodeId {
    let node_id = graph.insert_node(answer(label), position, 0);
    graph
        .node_mut(&node_id)
        .expect("node just inserted")
        .set_measured_size(Some(Size::new(360.0, height)));
    graph.insert_edge(parent.clone(), Handle::RIGHT, node_id.clone(), Handle::LEFT);
    node_id
}

/// root -> A1 -> A2 -> ... -> An, laid out left to right.
pub(crate) fn root_with_chain(len: usize) -> CanvasGraph {
    let mut graph = canvas_with_root();
    let mut parent = graph.root_id().clone();
    for idx in 0..len {
        let x = 880.0 + (idx as f64) * 440.0;
        parent = add_answer(&mut graph, &parent, &format!("{}", idx + 1), Point::new(x, 100.0), 200.0);
    }
    graph
}
