// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Discrete edge attachment points on a node's perimeter.
//!
//! Every node exposes one centered handle per side (`top`, `bottom`, `left`, `right`). The root
//! additionally exposes [`ROOT_SLOTS_PER_SIDE`] evenly spaced, indexed handles per side
//! (`right-0` .. `right-9`), so many children can attach without sharing a single point.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use super::geometry::{Point, Rect};

pub const ROOT_SLOTS_PER_SIDE: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    side: Side,
    slot: Option<u8>,
}

impl Handle {
    pub const TOP: Handle = Handle::plain(Side::Top);
    pub const BOTTOM: Handle = Handle::plain(Side::Bottom);
    pub const LEFT: Handle = Handle::plain(Side::Left);
    pub const RIGHT: Handle = Handle::plain(Side::Right);

    pub const fn plain(side: Side) -> Self {
        Self { side, slot: None }
    }

    pub fn slotted(side: Side, slot: u8) -> Result<Self, ParseHandleError> {
        if slot >= ROOT_SLOTS_PER_SIDE {
            return Err(ParseHandleError::SlotOutOfRange(slot));
        }
        Ok(Self { side, slot: Some(slot) })
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn slot(&self) -> Option<u8> {
        self.slot
    }

    /// Position of this handle on the perimeter of `rect`.
    pub fn anchor(&self, rect: &Rect) -> Point {
        let fraction = match self.slot {
            None => 0.5,
            Some(slot) => (f64::from(slot) + 0.5) / f64::from(ROOT_SLOTS_PER_SIDE),
        };
        match self.side {
            Side::Top => Point::new(rect.x + rect.width * fraction, rect.y),
            Side::Bottom => Point::new(rect.x + rect.width * fraction, rect.bottom()),
            Side::Left => Point::new(rect.x, rect.y + rect.height * fraction),
            Side::Right => Point::new(rect.right(), rect.y + rect.height * fraction),
        }
    }
}

/// All handles a node exposes, in a stable order (plain handles first, then slots side by side).
pub fn handles_for(is_root: bool) -> SmallVec<[Handle; 4]> {
    let mut handles = Side::ALL.iter().copied().map(Handle::plain).collect::<SmallVec<[Handle; 4]>>();
    if is_root {
        for side in Side::ALL {
            for slot in 0..ROOT_SLOTS_PER_SIDE {
                handles.push(Handle { side, slot: Some(slot) });
            }
        }
    }
    handles
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            None => f.write_str(self.side.as_str()),
            Some(slot) => write!(f, "{}-{slot}", self.side.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseHandleError {
    UnknownSide(String),
    InvalidSlot(String),
    SlotOutOfRange(u8),
}

impl fmt::Display for ParseHandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSide(side) => write!(f, "unknown handle side '{side}'"),
            Self::InvalidSlot(slot) => write!(f, "invalid handle slot '{slot}'"),
            Self::SlotOutOfRange(slot) => {
                write!(f, "handle slot {slot} out of range (max {})", ROOT_SLOTS_PER_SIDE - 1)
            }
        }
    }
}

impl std::error::Error for ParseHandleError {}

impl FromStr for Handle {
    type Err = ParseHandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side_raw, slot_raw) = match s.split_once('-') {
            Some((side, slot)) => (side, Some(slot)),
            None => (s, None),
        };
        let side = match side_raw {
            "top" => Side::Top,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            "right" => Side::Right,
            other => return Err(ParseHandleError::UnknownSide(other.to_owned())),
        };
        match slot_raw {
            None => Ok(Self::plain(side)),
            Some(raw) => {
                let slot = raw
                    .parse::<u8>()
                    .map_err(|_| ParseHandleError::InvalidSlot(raw.to_owned()))?;
                Self::slotted(side, slot)
            }
        }
    }
}

impl Serialize for Handle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Handle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
