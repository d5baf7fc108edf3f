//! Room rows.

use innkeep_core::error::CoreError;
use innkeep_core::room::{Room, RoomStatus};
use innkeep_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `rooms` table.
#[derive(Debug, Clone, FromRow)]
pub struct RoomRow {
    pub id: DbId,
    pub room_number: String,
    pub room_type: String,
    pub capacity: i32,
    pub price_per_night: f64,
    pub status_id: i16,
    pub description: Option<String>,
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<RoomRow> for Room {
    type Error = CoreError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        let status = RoomStatus::from_id(row.status_id)
            .ok_or_else(|| super::unknown_status("room", row.status_id))?;
        Ok(Room {
            id: row.id,
            room_number: row.room_number,
            room_type: row.room_type,
            capacity: row.capacity,
            price_per_night: row.price_per_night,
            status,
            description: row.description,
            amenities: row.amenities,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
