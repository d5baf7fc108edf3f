//! Room records and the validation applied to admin edits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Room status. Discriminants match the `room_statuses` seed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum RoomStatus {
    Active = 1,
    Inactive = 2,
}

impl RoomStatus {
    /// Return the database status ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Active),
            2 => Some(Self::Inactive),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(CoreError::Validation(format!("Unknown room status '{other}'"))),
        }
    }
}

/// A stored room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub id: DbId,
    pub room_number: String,
    pub room_type: String,
    pub capacity: i32,
    pub price_per_night: f64,
    pub status: RoomStatus,
    pub description: Option<String>,
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Room {
    pub fn is_active(&self) -> bool {
        self.status == RoomStatus::Active
    }
}

/// Admin-supplied room fields, used for both create and full replace.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoomSpec {
    pub room_number: String,
    pub room_type: String,
    pub capacity: i32,
    pub price_per_night: f64,
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
}

impl RoomSpec {
    /// Trim text fields and check the room invariants.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        self.room_number = self.room_number.trim().to_string();
        self.room_type = self.room_type.trim().to_string();
        self.amenities = self
            .amenities
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        if self.room_number.is_empty() {
            return Err(CoreError::Validation("Room number is required".into()));
        }
        if self.room_type.is_empty() {
            return Err(CoreError::Validation("Room type is required".into()));
        }
        if self.capacity < 1 {
            return Err(CoreError::Validation(format!(
                "Room capacity must be at least 1, got {}",
                self.capacity
            )));
        }
        if !self.price_per_night.is_finite() || self.price_per_night <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Price per night must be greater than 0, got {}",
                self.price_per_night
            )));
        }
        Ok(self)
    }
}

/// Filter for room listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomFilter {
    pub status: Option<RoomStatus>,
    pub room_type: Option<String>,
    pub min_capacity: Option<i32>,
}

impl RoomFilter {
    pub fn active() -> Self {
        Self {
            status: Some(RoomStatus::Active),
            ..Default::default()
        }
    }

    pub fn matches(&self, room: &Room) -> bool {
        self.status.map_or(true, |s| s == room.status)
            && self
                .room_type
                .as_deref()
                .map_or(true, |t| t.eq_ignore_ascii_case(&room.room_type))
            && self.min_capacity.map_or(true, |c| room.capacity >= c)
    }
}
