// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Layout algorithms for the canvas.
//!
//! Placement positions new nodes, collision resolution and reflow keep nodes from overlapping as
//! their measured sizes change, and routing picks edge handles after manual moves. All passes are
//! pure functions over a [`crate::model::CanvasGraph`] snapshot.

pub mod collision;
pub mod config;
pub mod placement;
pub mod reflow;
pub mod routing;

pub use collision::{overlapping_pairs, resolve_collisions, CollisionOutcome};
pub use config::{ConfigError, LayoutConfig};
pub use placement::{place_child, Placement};
pub use reflow::{absorb_root_growth, reflow_side_chain, side_chain, side_of_root, ReflowOutcome};
pub use routing::{best_handle_pair, reroute_edges, RerouteOutcome};
