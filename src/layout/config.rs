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
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{Node, NodeKind, Point, Rect, Size};

/// Tunables shared by every layout pass.
///
/// All fields have defaults, so a config file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Space between vertically stacked siblings.
    pub vertical_gap: f64,
    /// Space between a parent's edge and its child column.
    pub horizontal_gap: f64,
    /// Direct root children kept on the right before new ones go left.
    pub root_side_capacity: usize,
    /// Minimum vertical clearance enforced by collision resolution.
    pub collision_margin: f64,
    pub max_collision_passes: usize,
    pub content_size: Size,
    pub answer_size: Size,
    pub quiz_size: Size,
    pub flashcard_size: Size,
    /// Top-left corner of a new document's root.
    pub root_position: Point,
    /// Where a node lands when its parent is not on screen. Sits below the default root.
    pub fallback_position: Point,
    pub extraction_depth_cap: usize,
    pub persist_debounce_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            vertical_gap: 40.0,
            horizontal_gap: 80.0,
            root_side_capacity: 4,
            collision_margin: 20.0,
            max_collision_passes: 100,
            content_size: Size::new(700.0, 600.0),
            answer_size: Size::new(360.0, 200.0),
            quiz_size: Size::new(360.0, 240.0),
            flashcard_size: Size::new(320.0, 200.0),
            root_position: Point::new(100.0, 100.0),
            fallback_position: Point::new(100.0, 780.0),
            extraction_depth_cap: 64,
            persist_debounce_ms: 750,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        serde_json::from_str(&raw).map_err(ConfigError::Json)
    }

    /// Size assumed for a node of `kind` until the renderer measures it.
    pub fn default_size(&self, kind: NodeKind) -> Size {
        match kind {
            NodeKind::Content => self.content_size,
            NodeKind::Answer => self.answer_size,
            NodeKind::QuizQuestion => self.quiz_size,
            NodeKind::Flashcard => self.flashcard_size,
        }
    }

    pub fn node_size(&self, node: &Node) -> Size {
        node.size_or(self.default_size(node.kind()))
    }

    pub fn node_rect(&self, node: &Node) -> Rect {
        node.rect_with(self.default_size(node.kind()))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read layout config: {err}"),
            Self::Json(err) => write!(f, "invalid layout config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}
