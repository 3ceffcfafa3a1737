// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pumps streamed answer chunks into the canvas queue.

use std::fmt;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{CanvasHandle, SessionError};
use crate::model::NodeId;
use crate::ops::{CanvasError, CanvasOp};

#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// Another stream is still feeding this node.
    AlreadyActive { node_id: NodeId },
    /// The answer already finished or was cancelled.
    AlreadyFinished { node_id: NodeId },
    Canvas(CanvasError),
    Closed,
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive { node_id } => {
                write!(f, "answer node {node_id} already has an active stream")
            }
            Self::AlreadyFinished { node_id } => {
                write!(f, "answer node {node_id} is no longer streaming")
            }
            Self::Canvas(err) => fmt::Display::fmt(err, f),
            Self::Closed => f.write_str("canvas session is closed"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Canvas(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CanvasError> for StreamError {
    fn from(value: CanvasError) -> Self {
        Self::Canvas(value)
    }
}

/// How an answer stream ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEnd {
    /// The chunk sender closed; the answer is complete.
    Completed,
    /// [`StreamHandle::cancel`] was called; the partial answer is kept.
    Cancelled,
    /// The canvas refused a chunk, typically because the node was deleted mid-stream.
    Aborted(CanvasError),
    SessionClosed,
}

/// Control side of a running answer stream.
#[derive(Debug)]
pub struct StreamHandle {
    node_id: NodeId,
    cancel: watch::Sender<bool>,
    task: JoinHandle<StreamEnd>,
}

impl StreamHandle {
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Stops consuming chunks. Chunks already applied stay in the answer.
    pub fn cancel(&self) {
        // The pump may already be gone; nothing left to stop then.
        let _ = self.cancel.send(true);
    }

    pub async fn finished(self) -> StreamEnd {
        let Self { node_id, task, .. } = self;
        match task.await {
            Ok(end) => end,
            Err(err) => {
                tracing::warn!(node = %node_id, %err, "answer stream task failed");
                StreamEnd::SessionClosed
            }
        }
    }
}

pub(super) fn spawn_pump(
    handle: CanvasHandle,
    node_id: NodeId,
    token: u64,
    mut chunks: mpsc::Receiver<String>,
) -> StreamHandle {
    let (cancel, mut cancel_rx) = watch::channel(false);
    let pump_node = node_id.clone();

    let task = tokio::spawn(async move {
        let node_id = pump_node;
        let mut cancel_open = true;
        let mut aborted = None;
        let mut chunk_count = 0usize;

        let cancelled = loop {
            tokio::select! {
                biased;
                changed = cancel_rx.changed(), if cancel_open => match changed {
                    Ok(()) => {
                        if *cancel_rx.borrow_and_update() {
                            break true;
                        }
                    }
                    // Handle dropped without cancelling: keep streaming.
                    Err(_) => cancel_open = false,
                },
                chunk = chunks.recv() => {
                    let Some(chunk) = chunk else {
                        break false;
                    };
                    let op = CanvasOp::AppendAnswer { node_id: node_id.clone(), chunk };
                    match handle.apply(op).await {
                        Ok(_) => chunk_count += 1,
                        Err(SessionError::Closed) => return StreamEnd::SessionClosed,
                        Err(SessionError::Canvas(err)) => {
                            tracing::warn!(node = %node_id, %err, "answer chunk rejected; ending stream");
                            aborted = Some(err);
                            break false;
                        }
                    }
                }
            }
        };
        drop(chunks);

        tracing::debug!(node = %node_id, chunks = chunk_count, cancelled, "answer stream ended");
        let finish = handle.end_stream(node_id.clone(), token, cancelled).await;
        match (aborted, finish) {
            (Some(err), _) => StreamEnd::Aborted(err),
            (None, Err(SessionError::Closed)) => StreamEnd::SessionClosed,
            (None, Err(SessionError::Canvas(err))) => StreamEnd::Aborted(err),
            (None, Ok(_)) if cancelled => StreamEnd::Cancelled,
            (None, Ok(_)) => StreamEnd::Completed,
        }
    });

    StreamHandle { node_id, cancel, task }
}
