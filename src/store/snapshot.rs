// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::CanvasGraph;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Also flushes file contents to stable storage before the rename, where the platform allows.
    Durable,
}

/// What gets written to disk: the full graph plus the page the reader was on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub active_page: u32,
    pub graph: CanvasGraph,
}

impl Snapshot {
    pub fn new(graph: CanvasGraph, active_page: u32) -> Self {
        Self { version: SNAPSHOT_VERSION, active_page, graph }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    UnsupportedVersion { path: PathBuf, version: u32 },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error at {}: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid snapshot json at {}: {source}", path.display())
            }
            Self::UnsupportedVersion { path, version } => write!(
                f,
                "unsupported snapshot version {version} at {} (expected {SNAPSHOT_VERSION})",
                path.display()
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::UnsupportedVersion { .. } => None,
        }
    }
}

/// A canvas snapshot stored as a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    durability: WriteDurability,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|source| StoreError::Io { path: self.path.clone(), source })?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                path: self.path.clone(),
                version: snapshot.version,
            });
        }
        Ok(snapshot)
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut contents = serde_json::to_vec_pretty(snapshot)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        contents.push(b'\n');
        write_atomic(&self.path, &contents, self.durability)
    }
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> Result<(), StoreError> {
    let io_err = |source: io::Error| StoreError::Io { path: path.to_path_buf(), source };

    let Some(file_name) = path.file_name() else {
        return Err(io_err(io::Error::other("path has no file name")));
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(io_err)?;

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let tmp_path = parent.join(format!(
        ".marginalia.tmp.{}.{}.{nanos}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let result = (|| -> io::Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        if durability == WriteDurability::Durable {
            file.sync_all()?;
        }
        drop(file);
        rename_overwrite(&tmp_path, path)
    })();

    if let Err(source) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(source));
    }
    Ok(())
}
