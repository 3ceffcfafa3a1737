// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect, Size};
use super::ids::NodeId;

/// Fieldless projection of [`NodeData`], used where only the kind matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Content,
    Answer,
    QuizQuestion,
    Flashcard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Unread,
    Read,
    Correct,
    Struggling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    #[default]
    Idle,
    Streaming,
    Finished,
    /// Aborted by the user; the partial answer is kept.
    Cancelled,
}

impl StreamState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

/// One follow-up question asked inside an existing answer node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    pub question: String,
    pub answer: String,
}

/// Kind-specific node payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeData {
    /// The uploaded document. There is exactly one per canvas and it is the layout root.
    Content { title: String, page_count: u32 },
    Answer {
        question: String,
        /// The highlighted passage the question was asked about.
        context: String,
        answer: String,
        #[serde(default)]
        follow_ups: Vec<FollowUp>,
        #[serde(default)]
        streaming: StreamState,
    },
    QuizQuestion {
        question: String,
        /// Ordering key within the page's quiz.
        sequence: u32,
        #[serde(default)]
        response: Option<String>,
        #[serde(default)]
        feedback: Option<String>,
    },
    Flashcard { front: String, back: String },
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Content { .. } => NodeKind::Content,
            Self::Answer { .. } => NodeKind::Answer,
            Self::QuizQuestion { .. } => NodeKind::QuizQuestion,
            Self::Flashcard { .. } => NodeKind::Flashcard,
        }
    }

    /// A fresh answer node waiting for its first streamed chunk.
    pub fn pending_answer(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Answer {
            question: question.into(),
            context: context.into(),
            answer: String::new(),
            follow_ups: Vec::new(),
            streaming: StreamState::Idle,
        }
    }

    pub fn stream_state(&self) -> Option<StreamState> {
        match self {
            Self::Answer { streaming, .. } => Some(*streaming),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    data: NodeData,
    position: Point,
    /// Last measured render size. `None` until the renderer reports one.
    #[serde(default)]
    size: Option<Size>,
    page: u32,
    #[serde(default)]
    pinned: bool,
    #[serde(default)]
    status: NodeStatus,
    seq: u64,
}

impl Node {
    pub(crate) fn new(id: NodeId, data: NodeData, position: Point, page: u32, seq: u64) -> Self {
        Self {
            id,
            data,
            position,
            size: None,
            page,
            pinned: false,
            status: NodeStatus::Unread,
            seq,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn measured_size(&self) -> Option<Size> {
        self.size
    }

    pub fn set_measured_size(&mut self, size: Option<Size>) {
        self.size = size;
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn pinned(&self) -> bool {
        self.pinned
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn set_status(&mut self, status: NodeStatus) {
        self.status = status;
    }

    /// Creation sequence number; lower means created earlier.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The node's size, substituting `fallback` for whatever has not been measured yet.
    pub fn size_or(&self, fallback: Size) -> Size {
        self.size.unwrap_or(fallback)
    }

    pub fn rect_with(&self, fallback: Size) -> Rect {
        Rect::from_origin_size(self.position, self.size_or(fallback))
    }
}
