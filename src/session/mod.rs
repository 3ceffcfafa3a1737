// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Single update queue for a live canvas.
//!
//! A [`CanvasActor`] task owns the [`Canvas`]; every mutation, whether it comes from the UI or
//! from an answer stream, travels through one `mpsc` channel and is applied in arrival order.
//! Layout therefore always observes a consistent graph. Mutations schedule a debounced snapshot
//! save that runs off the queue.

mod persist;
mod stream;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::model::{CanvasGraph, NodeId};
use crate::ops::{ApplyResult, Canvas, CanvasError, CanvasOp};
use crate::query::ExportTree;
use crate::store::{Snapshot, SnapshotFile};

use persist::SnapshotWriter;
pub use stream::{StreamEnd, StreamError, StreamHandle};

const COMMAND_QUEUE_CAPACITY: usize = 256;

/// The actor stopped before it could answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClosed;

impl fmt::Display for SessionClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("canvas session is closed")
    }
}

impl std::error::Error for SessionClosed {}

#[derive(Debug)]
pub enum SessionError {
    Closed,
    Canvas(CanvasError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => fmt::Display::fmt(&SessionClosed, f),
            Self::Canvas(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Closed => None,
            Self::Canvas(err) => Some(err),
        }
    }
}

impl From<CanvasError> for SessionError {
    fn from(value: CanvasError) -> Self {
        Self::Canvas(value)
    }
}

impl From<SessionClosed> for SessionError {
    fn from(_: SessionClosed) -> Self {
        Self::Closed
    }
}

enum Command {
    Apply {
        op: CanvasOp,
        reply: oneshot::Sender<Result<ApplyResult, CanvasError>>,
    },
    Visible {
        reply: oneshot::Sender<CanvasGraph>,
    },
    Export {
        reply: oneshot::Sender<ExportTree>,
    },
    Snapshot {
        reply: oneshot::Sender<Snapshot>,
    },
    BeginStream {
        node_id: NodeId,
        reply: oneshot::Sender<Result<u64, StreamError>>,
    },
    EndStream {
        node_id: NodeId,
        token: u64,
        cancelled: bool,
        reply: oneshot::Sender<Result<ApplyResult, CanvasError>>,
    },
    Shutdown,
}

/// Cloneable sender side of a canvas session.
#[derive(Debug, Clone)]
pub struct CanvasHandle {
    tx: mpsc::Sender<Command>,
}

impl CanvasHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(build(reply)).await.map_err(|_| SessionClosed)?;
        rx.await.map_err(|_| SessionClosed)
    }

    pub async fn apply(&self, op: CanvasOp) -> Result<ApplyResult, SessionError> {
        Ok(self.request(|reply| Command::Apply { op, reply }).await??)
    }

    /// The subgraph shown on the active page.
    pub async fn visible(&self) -> Result<CanvasGraph, SessionClosed> {
        self.request(|reply| Command::Visible { reply }).await
    }

    pub async fn export(&self) -> Result<ExportTree, SessionClosed> {
        self.request(|reply| Command::Export { reply }).await
    }

    pub async fn snapshot(&self) -> Result<Snapshot, SessionClosed> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Feeds `chunks` into the answer node `node_id` until the sender side closes or the returned
    /// handle is cancelled.
    ///
    /// Only one stream may be active per node.
    pub async fn stream_answer(
        &self,
        node_id: NodeId,
        chunks: mpsc::Receiver<String>,
    ) -> Result<StreamHandle, StreamError> {
        let token = self
            .request(|reply| Command::BeginStream { node_id: node_id.clone(), reply })
            .await
            .map_err(|_| StreamError::Closed)??;
        Ok(stream::spawn_pump(self.clone(), node_id, token, chunks))
    }

    async fn end_stream(
        &self,
        node_id: NodeId,
        token: u64,
        cancelled: bool,
    ) -> Result<ApplyResult, SessionError> {
        Ok(self
            .request(|reply| Command::EndStream { node_id, token, cancelled, reply })
            .await??)
    }

    /// Asks the actor to stop after the commands already queued. Pending snapshot writes are
    /// flushed before [`CanvasTask::join`] resolves.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }
}

/// Join side of a spawned session.
#[derive(Debug)]
pub struct CanvasTask {
    task: JoinHandle<Canvas>,
}

impl CanvasTask {
    /// Waits for the actor to stop and returns the final canvas.
    pub async fn join(self) -> Result<Canvas, tokio::task::JoinError> {
        self.task.await
    }
}

pub struct CanvasActor {
    canvas: Canvas,
    rx: mpsc::Receiver<Command>,
    writer: Option<SnapshotWriter>,
    debounce: Duration,
    save_at: Option<Instant>,
    streams: BTreeMap<NodeId, u64>,
    next_token: u64,
}

impl CanvasActor {
    /// Spawns the actor on the current tokio runtime. With a `store`, mutations are persisted
    /// after `persist_debounce_ms` of quiet.
    pub fn spawn(canvas: Canvas, store: Option<SnapshotFile>) -> (CanvasHandle, CanvasTask) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let debounce = Duration::from_millis(canvas.config().persist_debounce_ms);
        let actor = Self {
            canvas,
            rx,
            writer: store.map(SnapshotWriter::spawn),
            debounce,
            save_at: None,
            streams: BTreeMap::new(),
            next_token: 0,
        };
        let task = tokio::spawn(actor.run());
        (CanvasHandle { tx }, CanvasTask { task })
    }

    async fn run(mut self) -> Canvas {
        tracing::debug!(root = %self.canvas.graph().root_id(), "canvas session started");
        loop {
            let save_at = self.save_at;
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                _ = sleep_until_opt(save_at), if save_at.is_some() => self.persist(),
            }
        }

        if self.save_at.is_some() {
            self.persist();
        }
        if let Some(writer) = self.writer.take() {
            writer.close().await;
        }
        tracing::debug!(rev = self.canvas.rev(), "canvas session stopped");
        self.canvas
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Apply { op, reply } => {
                let result = self.apply(op);
                let _ = reply.send(result);
            }
            Command::Visible { reply } => {
                let _ = reply.send(self.canvas.visible());
            }
            Command::Export { reply } => {
                let _ = reply.send(self.canvas.export());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::BeginStream { node_id, reply } => {
                let _ = reply.send(self.begin_stream(node_id));
            }
            Command::EndStream { node_id, token, cancelled, reply } => {
                if self.streams.get(&node_id) == Some(&token) {
                    self.streams.remove(&node_id);
                }
                let result = self.apply(CanvasOp::FinishStream { node_id, cancelled });
                let _ = reply.send(result);
            }
            Command::Shutdown => {}
        }
    }

    fn apply(&mut self, op: CanvasOp) -> Result<ApplyResult, CanvasError> {
        let before = (self.canvas.rev(), self.canvas.active_page());
        let result = self.canvas.apply(op);
        if (self.canvas.rev(), self.canvas.active_page()) != before {
            self.schedule_save();
        }
        result
    }

    fn begin_stream(&mut self, node_id: NodeId) -> Result<u64, StreamError> {
        if self.streams.contains_key(&node_id) {
            return Err(StreamError::AlreadyActive { node_id });
        }
        let node = self
            .canvas
            .graph()
            .node(&node_id)
            .ok_or_else(|| CanvasError::NotFound { node_id: node_id.clone() })?;
        let state = node
            .data()
            .stream_state()
            .ok_or_else(|| CanvasError::NotAnAnswer { node_id: node_id.clone() })?;
        if state.is_terminal() {
            return Err(StreamError::AlreadyFinished { node_id });
        }

        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);
        tracing::debug!(node = %node_id, token, "answer stream registered");
        self.streams.insert(node_id, token);
        Ok(token)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.canvas.graph().clone(), self.canvas.active_page())
    }

    fn schedule_save(&mut self) {
        if self.writer.is_some() {
            self.save_at = Some(Instant::now() + self.debounce);
        }
    }

    fn persist(&mut self) {
        self.save_at = None;
        if let Some(writer) = &self.writer {
            writer.publish(self.snapshot());
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests;
