// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over a canvas graph: what is visible on a page, and what gets exported.

pub mod extract;
pub mod visibility;

pub use extract::{
    extract_export, query_context, quizzes_by_page, struggling_nodes, ExportTree, QaNode,
    QueryContext, QuizItem, QuizPage, QuizSeed,
};
pub use visibility::{is_visible, visible_node_ids, visible_view};
