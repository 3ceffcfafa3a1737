// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas data model.
//!
//! A canvas holds one document (root) node plus the answer, quiz and flashcard nodes spawned from
//! it, the edges connecting them and the highlights that anchor them to the document text.

pub mod edge;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod geometry;
pub mod graph;
pub mod handle;
pub mod ids;
pub mod node;

pub use edge::{Edge, EdgeState, Highlight};
pub use geometry::{Point, Rect, Size};
pub use graph::{CanvasGraph, RemovedNode};
pub use handle::{handles_for, Handle, ParseHandleError, Side, ROOT_SLOTS_PER_SIDE};
pub use ids::{EdgeId, HighlightId, Id, IdError, NodeId};
pub use node::{FollowUp, Node, NodeData, NodeKind, NodeStatus, StreamState};
