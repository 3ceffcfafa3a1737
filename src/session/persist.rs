// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Background snapshot writer.
//!
//! The actor publishes the newest snapshot on a `watch` channel; this task writes whatever is
//! latest on a blocking thread. Intermediate snapshots published during a write are skipped, and
//! failures are logged, never reported back to the layout path.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::store::{Snapshot, SnapshotFile};

pub(crate) struct SnapshotWriter {
    tx: watch::Sender<Option<Snapshot>>,
    task: JoinHandle<()>,
}

impl SnapshotWriter {
    pub(crate) fn spawn(file: SnapshotFile) -> Self {
        let (tx, mut rx) = watch::channel::<Option<Snapshot>>(None);
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let Some(snapshot) = rx.borrow_and_update().clone() else {
                    continue;
                };
                let file = file.clone();
                let path = file.path().to_path_buf();
                match tokio::task::spawn_blocking(move || file.save(&snapshot)).await {
                    Ok(Ok(())) => tracing::debug!(path = %path.display(), "snapshot saved"),
                    Ok(Err(err)) => tracing::warn!(%err, "snapshot save failed"),
                    Err(err) => tracing::warn!(%err, "snapshot writer task panicked"),
                }
            }
        });
        Self { tx, task }
    }

    pub(crate) fn publish(&self, snapshot: Snapshot) {
        self.tx.send_replace(Some(snapshot));
    }

    /// Waits for the last published snapshot to be written.
    pub(crate) async fn close(self) {
        drop(self.tx);
        if let Err(err) = self.task.await {
            tracing::warn!(%err, "snapshot writer did not shut down cleanly");
        }
    }
}
