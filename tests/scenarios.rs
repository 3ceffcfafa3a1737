// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.


use marginalia::layout::{overlapping_pairs, LayoutConfig};
use marginalia::model::{NodeData, NodeId, Point, Size};
use marginalia::ops::{Canvas, CanvasOp, DragVerdict};
use marginalia::query::{visible_node_ids, visible_view};

fn document() -> Canvas {
    Canvas::for_document("lecture-notes.pdf", 12, LayoutConfig::default())
}

fn create(canvas: &mut Canvas, parent_id: &NodeId, data: NodeData, pinned: bool) -> NodeId {
    canvas
        .apply(CanvasOp::CreateNode { parent_id: parent_id.clone(), data, pinned, highlight: None })
        .unwrap_or_else(|err| panic!("create node from {parent_id}: {err}"))
        .created
        .expect("created")
        .node_id
}

fn ask(canvas: &mut Canvas, parent_id: &NodeId, label: &str) -> NodeId {
    create(canvas, parent_id, NodeData::pending_answer(format!("Q {label}"), "passage"), false)
}

fn answered(label: &str) -> NodeData {
    NodeData::Answer {
        question: format!("What does {label} mean?"),
        context: format!("... {label} ..."),
        answer: format!("{label} means something precise."),
        follow_ups: Vec::new(),
        streaming: Default::default(),
    }
}

fn position(canvas: &Canvas, node_id: &NodeId) -> Point {
    canvas.graph().node(node_id).expect("node").position()
}

#[test]
fn root_children_fill_the_right_column_then_switch_sides() {
    let mut canvas = document();
    let root_id = canvas.graph().root_id().clone();
    assert_eq!(position(&canvas, &root_id), Point::new(100.0, 100.0));

    let children = (0..5).map(|idx| ask(&mut canvas, &root_id, &idx.to_string())).collect::<Vec<_>>();

    assert_eq!(position(&canvas, &children[0]), Point::new(880.0, 100.0));
    assert_eq!(position(&canvas, &children[1]), Point::new(880.0, 340.0));
    assert_eq!(position(&canvas, &children[2]), Point::new(880.0, 580.0));
    assert_eq!(position(&canvas, &children[3]), Point::new(880.0, 820.0));
    assert_eq!(position(&canvas, &children[4]), Point::new(-340.0, 100.0));
}

#[test]
fn placement_is_deterministic_for_identical_canvases() {
    let build = || {
        let mut canvas = document();
        let root_id = canvas.graph().root_id().clone();
        let first = ask(&mut canvas, &root_id, "first");
        ask(&mut canvas, &first, "nested");
        canvas
    };

    let mut left = build();
    let mut right = build();
    let parent = left.graph().root_id().clone();
    let a = left.apply(CanvasOp::CreateNode {
        parent_id: parent.clone(),
        data: NodeData::pending_answer("same", "same"),
        pinned: false,
        highlight: None,
    });
    let b = right.apply(CanvasOp::CreateNode {
        parent_id: parent,
        data: NodeData::pending_answer("same", "same"),
        pinned: false,
        highlight: None,
    });

    assert_eq!(a.expect("left").created, b.expect("right").created);
    assert_eq!(left.graph(), right.graph());
}

#[test]
fn drag_onto_another_card_is_rejected_and_leaves_the_card_in_place() {
    let mut canvas = document();
    let root_id = canvas.graph().root_id().clone();
    let first = ask(&mut canvas, &root_id, "first");
    let second = ask(&mut canvas, &root_id, "second");
    let before = position(&canvas, &second);
    let rev = canvas.rev();

    let result = canvas
        .apply(CanvasOp::CompleteDrag { node_id: second.clone(), position: position(&canvas, &first) })
        .expect("drag");

    assert_eq!(result.drag, Some(DragVerdict::Rejected));
    assert_eq!(position(&canvas, &second), before);
    assert_eq!(canvas.rev(), rev);
}

#[test]
fn pinned_quiz_survives_page_changes_and_unpinned_does_not() {
    let mut canvas = document();
    let root_id = canvas.graph().root_id().clone();
    canvas.apply(CanvasOp::Navigate { page: 2 }).expect("navigate");
    let quiz = |question: &str| NodeData::QuizQuestion {
        question: question.to_owned(),
        sequence: 1,
        response: None,
        feedback: None,
    };
    let pinned = create(&mut canvas, &root_id, quiz("pinned"), true);
    let loose = create(&mut canvas, &root_id, quiz("loose"), false);

    canvas.apply(CanvasOp::Navigate { page: 5 }).expect("navigate");
    let visible = visible_node_ids(canvas.graph(), canvas.active_page());

    assert!(visible.contains(&root_id));
    assert!(visible.contains(&pinned));
    assert!(!visible.contains(&loose));
}

#[test]
fn visibility_filter_is_idempotent() {
    let mut canvas = document();
    let root_id = canvas.graph().root_id().clone();
    for page in 0..4 {
        canvas.apply(CanvasOp::Navigate { page }).expect("navigate");
        let card = ask(&mut canvas, &root_id, &format!("page {page}"));
        ask(&mut canvas, &card, &format!("page {page} follow-up"));
    }

    for page in 0..5 {
        let once = visible_view(canvas.graph(), page);
        let twice = visible_view(&once, page);
        assert_eq!(once, twice, "page {page}");
    }
}

#[test]
fn extraction_rebuilds_a_nested_chain() {
    let mut canvas = document();
    let root_id = canvas.graph().root_id().clone();
    let a = create(&mut canvas, &root_id, answered("alpha"), false);
    let b = create(&mut canvas, &a, answered("beta"), false);
    let c = create(&mut canvas, &b, answered("gamma"), false);

    let export = canvas.export();

    assert_eq!(export.roots.len(), 1);
    let top = &export.roots[0];
    assert_eq!(top.depth(), 2);
    assert_eq!(top.id, a);
    assert_eq!(top.question, "What does alpha mean?");
    assert_eq!(top.answer, "alpha means something precise.");
    assert_eq!(top.children.len(), 1);
    assert_eq!(top.children[0].id, b);
    assert_eq!(top.children[0].answer, "beta means something precise.");
    assert_eq!(top.children[0].children[0].id, c);
    assert_eq!(top.children[0].children[0].question, "What does gamma mean?");
    assert!(top.children[0].children[0].children.is_empty());
}

#[test]
fn streaming_growth_never_leaves_cards_overlapping() {
    let mut canvas = document();
    let root_id = canvas.graph().root_id().clone();
    let cards = (0..6).map(|idx| ask(&mut canvas, &root_id, &idx.to_string())).collect::<Vec<_>>();
    let nested = ask(&mut canvas, &cards[0], "nested");

    for (step, node_id) in cards.iter().chain(std::iter::once(&nested)).enumerate() {
        for chunk in 0..4 {
            canvas
                .apply(CanvasOp::AppendAnswer { node_id: node_id.clone(), chunk: "more text ".to_owned() })
                .expect("append");
            let height = 200.0 + 60.0 * f64::from(chunk) + 15.0 * step as f64;
            canvas
                .apply(CanvasOp::Measure { node_id: node_id.clone(), size: Size::new(360.0, height) })
                .expect("measure");
        }
        canvas
            .apply(CanvasOp::FinishStream { node_id: node_id.clone(), cancelled: false })
            .expect("finish");
    }

    assert_eq!(overlapping_pairs(canvas.graph(), canvas.config()), Vec::new());

    let right = cards[..4].iter().map(|id| position(&canvas, id).y).collect::<Vec<_>>();
    assert!(right.windows(2).all(|pair| pair[0] < pair[1]), "right column out of order: {right:?}");
}
