// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::handle::Handle;
use super::ids::{EdgeId, HighlightId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeState {
    /// The target is still receiving streamed content.
    InProgress,
    #[default]
    Settled,
}

/// A directed connector between two node handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    id: EdgeId,
    source: NodeId,
    source_handle: Handle,
    target: NodeId,
    target_handle: Handle,
    /// Drawn by the user rather than created alongside a spawned node. Only these may be deleted
    /// from the UI.
    #[serde(default)]
    user_created: bool,
    #[serde(default)]
    state: EdgeState,
    seq: u64,
}

impl Edge {
    pub(crate) fn new(
        id: EdgeId,
        source: NodeId,
        source_handle: Handle,
        target: NodeId,
        target_handle: Handle,
        seq: u64,
    ) -> Self {
        Self {
            id,
            source,
            source_handle,
            target,
            target_handle,
            user_created: false,
            state: EdgeState::Settled,
            seq,
        }
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn source_handle(&self) -> Handle {
        self.source_handle
    }

    pub fn target_handle(&self) -> Handle {
        self.target_handle
    }

    pub fn set_handles(&mut self, source_handle: Handle, target_handle: Handle) {
        self.source_handle = source_handle;
        self.target_handle = target_handle;
    }

    pub fn user_created(&self) -> bool {
        self.user_created
    }

    pub fn set_user_created(&mut self, user_created: bool) {
        self.user_created = user_created;
    }

    pub fn state(&self) -> EdgeState {
        self.state
    }

    pub fn set_state(&mut self, state: EdgeState) {
        self.state = state;
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }
}

/// A quoted passage of the document, linked to the node spawned from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    id: HighlightId,
    text: String,
    node_id: NodeId,
    page: u32,
}

impl Highlight {
    pub(crate) fn new(id: HighlightId, text: impl Into<String>, node_id: NodeId, page: u32) -> Self {
        Self { id, text: text.into(), node_id, page }
    }

    pub fn id(&self) -> &HighlightId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}
