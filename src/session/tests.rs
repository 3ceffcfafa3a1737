// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;

use super::{CanvasActor, CanvasHandle, CanvasTask, SessionError, StreamEnd, StreamError};
use crate::layout::LayoutConfig;
use crate::model::{EdgeState, NodeData, NodeId, Size, StreamState};
use crate::ops::{Canvas, CanvasError, CanvasOp};
use crate::store::SnapshotFile;

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("marginalia-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

fn config(debounce_ms: u64) -> LayoutConfig {
    LayoutConfig { persist_debounce_ms: debounce_ms, ..LayoutConfig::default() }
}

fn spawn(store: Option<SnapshotFile>, debounce_ms: u64) -> (CanvasHandle, CanvasTask, NodeId) {
    let canvas = Canvas::for_document("paper.pdf", 12, config(debounce_ms));
    let root_id = canvas.graph().root_id().clone();
    let (handle, task) = CanvasActor::spawn(canvas, store);
    (handle, task, root_id)
}

async fn ask(handle: &CanvasHandle, parent_id: &NodeId, question: &str) -> NodeId {
    let result = handle
        .apply(CanvasOp::CreateNode {
            parent_id: parent_id.clone(),
            data: NodeData::pending_answer(question, "quoted passage"),
            pinned: false,
            highlight: None,
        })
        .await
        .expect("create node");
    result.created.expect("created").node_id
}

async fn answer_of(handle: &CanvasHandle, node_id: &NodeId) -> (String, StreamState) {
    let snapshot = handle.snapshot().await.expect("snapshot");
    match snapshot.graph.node(node_id).map(|node| node.data().clone()) {
        Some(NodeData::Answer { answer, streaming, .. }) => (answer, streaming),
        other => panic!("expected an answer node, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_callers_are_serialized() {
    let (handle, task, root_id) = spawn(None, 750);

    let mut joins = Vec::new();
    for idx in 0..6 {
        let handle = handle.clone();
        let root_id = root_id.clone();
        joins.push(tokio::spawn(async move { ask(&handle, &root_id, &format!("q{idx}")).await }));
    }
    for join in joins {
        join.await.expect("caller task");
    }

    handle.shutdown().await;
    let canvas = task.join().await.expect("actor");
    assert_eq!(canvas.graph().nodes().len(), 7);
    assert_eq!(canvas.rev(), 6);
    assert!(crate::layout::overlapping_pairs(canvas.graph(), canvas.config()).is_empty());
}

#[tokio::test]
async fn canvas_errors_come_back_through_the_handle() {
    let (handle, _task, _root_id) = spawn(None, 750);
    let missing = NodeId::new("node-404").unwrap();

    let err = handle
        .apply(CanvasOp::Measure { node_id: missing.clone(), size: Size::new(10.0, 10.0) })
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Canvas(CanvasError::NotFound { node_id }) if node_id == missing));
}

#[tokio::test]
async fn handle_reports_closed_after_shutdown() {
    let (handle, task, _root_id) = spawn(None, 750);
    handle.shutdown().await;
    task.join().await.expect("actor");

    assert!(matches!(handle.apply(CanvasOp::Navigate { page: 1 }).await, Err(SessionError::Closed)));
    assert!(handle.visible().await.is_err());
}

#[tokio::test]
async fn streamed_chunks_build_the_answer_and_settle_the_edge() {
    let (handle, _task, root_id) = spawn(None, 750);
    let node_id = ask(&handle, &root_id, "what is a monad").await;

    let (tx, rx) = mpsc::channel(8);
    let stream = handle.stream_answer(node_id.clone(), rx).await.expect("stream");
    tx.send("A monoid ".to_owned()).await.unwrap();
    tx.send("in the category of endofunctors".to_owned()).await.unwrap();
    drop(tx);

    assert_eq!(stream.finished().await, StreamEnd::Completed);
    let (answer, streaming) = answer_of(&handle, &node_id).await;
    assert_eq!(answer, "A monoid in the category of endofunctors");
    assert_eq!(streaming, StreamState::Finished);

    let snapshot = handle.snapshot().await.unwrap();
    let incoming = snapshot
        .graph
        .edges()
        .values()
        .filter(|edge| edge.target() == &node_id)
        .collect::<Vec<_>>();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].state(), EdgeState::Settled);
}

#[tokio::test]
async fn second_stream_for_the_same_node_is_rejected() {
    let (handle, _task, root_id) = spawn(None, 750);
    let node_id = ask(&handle, &root_id, "why").await;

    let (_tx1, rx1) = mpsc::channel(8);
    let first = handle.stream_answer(node_id.clone(), rx1).await.expect("first stream");
    let (_tx2, rx2) = mpsc::channel(8);
    let err = handle.stream_answer(node_id.clone(), rx2).await.unwrap_err();
    assert_eq!(err, StreamError::AlreadyActive { node_id: node_id.clone() });

    first.cancel();
    assert_eq!(first.finished().await, StreamEnd::Cancelled);
}

#[tokio::test]
async fn cancel_keeps_partial_answer_and_ends_the_node() {
    let (handle, _task, root_id) = spawn(None, 750);
    let node_id = ask(&handle, &root_id, "explain").await;

    let (tx, rx) = mpsc::channel(8);
    let stream = handle.stream_answer(node_id.clone(), rx).await.expect("stream");
    tx.send("partial".to_owned()).await.unwrap();

    let mut applied = false;
    for _ in 0..200 {
        if answer_of(&handle, &node_id).await.0 == "partial" {
            applied = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(applied, "first chunk never reached the canvas");

    stream.cancel();
    assert_eq!(stream.finished().await, StreamEnd::Cancelled);
    let _ = tx.send(" late".to_owned()).await;

    let (answer, streaming) = answer_of(&handle, &node_id).await;
    assert_eq!(answer, "partial");
    assert_eq!(streaming, StreamState::Cancelled);

    let (_tx, rx) = mpsc::channel(1);
    let err = handle.stream_answer(node_id.clone(), rx).await.unwrap_err();
    assert_eq!(err, StreamError::AlreadyFinished { node_id });
}

#[tokio::test]
async fn deleting_a_streaming_node_aborts_the_stream() {
    let (handle, _task, root_id) = spawn(None, 750);
    let node_id = ask(&handle, &root_id, "gone").await;

    let (tx, rx) = mpsc::channel(8);
    let stream = handle.stream_answer(node_id.clone(), rx).await.expect("stream");
    handle.apply(CanvasOp::Delete { node_id: node_id.clone() }).await.expect("delete");
    tx.send("orphan".to_owned()).await.unwrap();

    assert_eq!(
        stream.finished().await,
        StreamEnd::Aborted(CanvasError::NotFound { node_id: node_id.clone() })
    );
}

#[tokio::test]
async fn stream_for_a_non_answer_is_refused() {
    let (handle, _task, root_id) = spawn(None, 750);
    let (_tx, rx) = mpsc::channel(1);

    let err = handle.stream_answer(root_id.clone(), rx).await.unwrap_err();

    assert_eq!(err, StreamError::Canvas(CanvasError::NotAnAnswer { node_id: root_id }));
}

#[tokio::test]
async fn debounced_save_writes_the_snapshot() {
    let tmp = TempDir::new("session");
    let file = SnapshotFile::new(tmp.path.join("canvas.json"));
    let (handle, _task, root_id) = spawn(Some(file.clone()), 5);
    let node_id = ask(&handle, &root_id, "persist me").await;

    let mut saved = None;
    for _ in 0..400 {
        if let Ok(snapshot) = file.load() {
            saved = Some(snapshot);
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let saved = saved.expect("snapshot written after the debounce window");
    assert!(saved.graph.node(&node_id).is_some());
}

#[tokio::test]
async fn shutdown_flushes_pending_changes() {
    let tmp = TempDir::new("session");
    let file = SnapshotFile::new(tmp.path.join("canvas.json"));
    let (handle, task, root_id) = spawn(Some(file.clone()), 60_000);
    ask(&handle, &root_id, "flush").await;
    handle.apply(CanvasOp::Navigate { page: 4 }).await.unwrap();

    handle.shutdown().await;
    let canvas = task.join().await.expect("actor");

    let saved = file.load().expect("flushed snapshot");
    assert_eq!(&saved.graph, canvas.graph());
    assert_eq!(saved.active_page, 4);
}

#[tokio::test]
async fn read_only_commands_do_not_persist() {
    let tmp = TempDir::new("session");
    let file = SnapshotFile::new(tmp.path.join("canvas.json"));
    let (handle, task, _root_id) = spawn(Some(file.clone()), 60_000);
    let _ = handle.visible().await.unwrap();
    let _ = handle.export().await.unwrap();
    let _ = handle.snapshot().await.unwrap();

    handle.shutdown().await;
    task.join().await.expect("actor");

    assert!(!file.path().exists());
}
