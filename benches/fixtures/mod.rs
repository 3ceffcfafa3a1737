// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.


#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::time::Duration;

use criterion::Criterion;

use marginalia::layout::LayoutConfig;
use marginalia::model::{CanvasGraph, Handle, NodeData, NodeId, Point, Size};
use marginalia::ops::{Canvas, CanvasOp};

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name).ok().and_then(|raw| raw.trim().parse::<usize>().ok()).unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name).ok().and_then(|raw| raw.trim().parse::<u64>().ok()).unwrap_or(default)
}

pub fn criterion() -> Criterion {
    let sample_size = env_usize("BENCH_SAMPLE_SIZE", 60).clamp(10, 200);
    let warmup_secs = env_u64("BENCH_WARMUP_SECS", 3).clamp(1, 60);
    let measurement_secs = env_u64("BENCH_MEASUREMENT_SECS", 5).clamp(1, 120);
    Criterion::default()
        .sample_size(sample_size)
        .warm_up_time(Duration::from_secs(warmup_secs))
        .measurement_time(Duration::from_secs(measurement_secs))
}

pub fn answer(label: usize) -> NodeData {
    NodeData::Answer {
        question: format!("question {label:04}"),
        context: format!("passage {label:04}"),
        answer: format!("answer {label:04} ").repeat(8),
        follow_ups: Vec::new(),
        streaming: Default::default(),
    }
}

pub fn document(config: LayoutConfig) -> Canvas {
    let mut canvas = Canvas::for_document("bench.pdf", 64, config);
    let root_id = canvas.graph().root_id().clone();
    canvas
        .apply(CanvasOp::Measure { node_id: root_id, size: Size::new(700.0, 600.0) })
        .expect("measure root");
    canvas
}

/// A canvas with `pages` pages, each holding `per_page` cards: a full root column on both sides
/// plus chains hanging off them. Every card is measured at a height that depends on its index.
pub fn canvas(pages: u32, per_page: usize) -> Canvas {
    let mut canvas = document(LayoutConfig::default());
    let root_id = canvas.graph().root_id().clone();
    let mut label = 0usize;

    for page in 0..pages {
        canvas.apply(CanvasOp::Navigate { page }).expect("navigate");
        let mut parents = vec![root_id.clone()];
        for idx in 0..per_page {
            let parent_id = if idx < 8 { root_id.clone() } else { parents[idx % parents.len()].clone() };
            let result = canvas
                .apply(CanvasOp::CreateNode {
                    parent_id,
                    data: answer(label),
                    pinned: idx == 0,
                    highlight: Some(format!("highlight {label:04}")),
                })
                .expect("create node");
            let node_id = result.created.expect("created").node_id;
            let height = 160.0 + ((label * 37) % 240) as f64;
            canvas
                .apply(CanvasOp::Measure { node_id: node_id.clone(), size: Size::new(360.0, height) })
                .expect("measure node");
            canvas
                .apply(CanvasOp::FinishStream { node_id: node_id.clone(), cancelled: false })
                .expect("finish stream");
            parents.push(node_id);
            label += 1;
        }
    }
    canvas
}

/// `count` cards stacked on top of each other to the right of the root.
pub fn pile(count: usize) -> CanvasGraph {
    let canvas = document(LayoutConfig::default());
    let mut graph = canvas.graph().clone();
    let root_id = graph.root_id().clone();
    for idx in 0..count {
        let x = 880.0 + ((idx % 3) as f64) * 120.0;
        let y = 100.0 + ((idx * 13) % 50) as f64;
        let node_id = graph.insert_node(answer(idx), Point::new(x, y), 0);
        if let Some(node) = graph.node_mut(&node_id) {
            node.set_measured_size(Some(Size::new(360.0, 180.0 + ((idx * 29) % 120) as f64)));
        }
        graph.insert_edge(root_id.clone(), Handle::RIGHT, node_id, Handle::LEFT);
    }
    graph
}

/// root -> A1 -> ... -> An.
pub fn chain(len: usize) -> CanvasGraph {
    let mut graph = document(LayoutConfig::default()).graph().clone();
    let mut parent: NodeId = graph.root_id().clone();
    for idx in 0..len {
        let node_id = graph.insert_node(answer(idx), Point::new(880.0 + idx as f64 * 440.0, 100.0), 0);
        graph.insert_edge(parent, Handle::RIGHT, node_id.clone(), Handle::LEFT);
        parent = node_id;
    }
    graph
}
