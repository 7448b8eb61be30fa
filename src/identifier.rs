//! Composite identifiers.
//!
//! Every room, device and synthesized logical device is addressed by a
//! dash-separated string: `BLDG-ROOM` for rooms and `BLDG-ROOM-suffix` for
//! anything that lives inside a room. This module is the only place that
//! splits or joins those strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SEPARATOR: char = '-';

pub const DISPLAY_PREFIX: &str = "Display";
pub const MASTER_AUDIO_PREFIX: &str = "MasterAudio";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("invalid identifier '{id}': expected at least {expected} '-' separated segments")]
    TooFewSegments { id: String, expected: usize },

    #[error("invalid room identifier '{id}': expected exactly 2 '-' separated segments")]
    TooManySegments { id: String },

    #[error("invalid identifier suffix '{suffix}': expected prefix '{prefix}'")]
    PrefixMismatch { suffix: String, prefix: String },

    #[error("invalid identifier suffix '{suffix}': index is not numeric")]
    NotNumeric { suffix: String },

    #[error("invalid identifier suffix '{suffix}': index must be at least 1")]
    IndexOutOfRange { suffix: String },
}

/// `BUILDING-ROOM`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId {
    pub building: String,
    pub room: String,
}

impl RoomId {
    pub fn new(building: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            building: building.into(),
            room: room.into(),
        }
    }

    /// Parse a room-scoped identifier. Building and room never contain the
    /// separator, so anything past the second segment is rejected.
    pub fn parse(id: &str) -> Result<Self, IdentifierError> {
        let mut parts = id.splitn(3, SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(building), Some(room), None) => Ok(Self::new(building, room)),
            (Some(_), Some(_), Some(_)) => Err(IdentifierError::TooManySegments { id: id.to_string() }),
            _ => Err(IdentifierError::TooFewSegments {
                id: id.to_string(),
                expected: 2,
            }),
        }
    }

    /// Both segments are present and non-empty.
    pub fn is_complete(&self) -> bool {
        !self.building.is_empty() && !self.room.is_empty()
    }

    /// ID of a raw or synthesized device inside this room.
    pub fn device(&self, suffix: &str) -> String {
        format!("{}{}{}", self, SEPARATOR, suffix)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.building, SEPARATOR, self.room)
    }
}

/// `BUILDING-ROOM-suffix`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId {
    pub room: RoomId,
    pub suffix: String,
}

impl DeviceId {
    /// Parse a device-scoped identifier. Everything after the second
    /// separator is the suffix.
    pub fn parse(id: &str) -> Result<Self, IdentifierError> {
        let mut parts = id.splitn(3, SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(building), Some(room), Some(suffix)) => Ok(Self {
                room: RoomId::new(building, room),
                suffix: suffix.to_string(),
            }),
            _ => Err(IdentifierError::TooFewSegments {
                id: id.to_string(),
                expected: 3,
            }),
        }
    }

    pub fn building(&self) -> &str {
        &self.room.building
    }

    pub fn room_number(&self) -> &str {
        &self.room.room
    }

    /// 1-based preset index encoded in a `Display<N>` suffix.
    pub fn display_index(&self) -> Result<usize, IdentifierError> {
        parse_indexed_suffix(&self.suffix, DISPLAY_PREFIX)
    }

    /// `MasterAudio<N>` suffixes name grouped outputs; anything else is a
    /// raw device name.
    pub fn is_master_audio(&self) -> bool {
        self.suffix.starts_with(MASTER_AUDIO_PREFIX)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.room, SEPARATOR, self.suffix)
    }
}

/// Strip `prefix` from `suffix` and parse the remainder as a 1-based index.
pub fn parse_indexed_suffix(suffix: &str, prefix: &str) -> Result<usize, IdentifierError> {
    let remainder = suffix
        .strip_prefix(prefix)
        .ok_or_else(|| IdentifierError::PrefixMismatch {
            suffix: suffix.to_string(),
            prefix: prefix.to_string(),
        })?;

    if remainder.is_empty() || !remainder.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdentifierError::NotNumeric {
            suffix: suffix.to_string(),
        });
    }

    let index: usize = remainder.parse().map_err(|_| IdentifierError::NotNumeric {
        suffix: suffix.to_string(),
    })?;

    if index < 1 {
        return Err(IdentifierError::IndexOutOfRange {
            suffix: suffix.to_string(),
        });
    }

    Ok(index)
}

pub fn build_display_id(room: &RoomId, n: usize) -> String {
    room.device(&format!("{}{}", DISPLAY_PREFIX, n))
}

pub fn build_master_audio_id(room: &RoomId, n: usize) -> String {
    room.device(&format!("{}{}", MASTER_AUDIO_PREFIX, n))
}
