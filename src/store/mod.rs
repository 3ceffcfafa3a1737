// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for canvases on disk.
//!
//! A canvas is stored as one JSON snapshot file. Writes go through a temp file and an atomic
//! rename so a crash never leaves a half-written snapshot behind.

pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotFile, StoreError, WriteDurability, SNAPSHOT_VERSION};
