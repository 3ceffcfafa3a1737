// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.


//! Marginalia: node layout and graph extraction for a document Q&A canvas.
//!
//! A canvas is a flat graph of question/answer cards spawned from a document root. The engine
//! decides where new cards go, keeps them from overlapping as answers stream in, picks connector
//! anchors, filters the graph down to the page being read, and rebuilds a Q&A tree for export.
//!
//! - [`model`]: ids, geometry, nodes, edges and the graph itself.
//! - [`layout`]: pure placement, collision, reflow and routing passes.
//! - [`query`]: visibility filtering and tree extraction.
//! - [`ops`]: [`ops::Canvas`], the stateful facade every UI event goes through.
//! - [`session`]: the async update queue and answer streaming.
//! - [`store`]: JSON snapshots on disk.

pub mod layout;
pub mod model;
pub mod ops;
pub mod query;
pub mod session;
pub mod store;
