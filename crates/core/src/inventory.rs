//! Room inventory.
//!
//! Rooms with booking history are never hard-deleted: `deactivate_room`
//! marks them inactive so past bookings keep resolving, and refuses while a
//! blocking booking still has nights ahead.

use std::sync::Arc;

use crate::clock::Clock;
use crate::error::CoreError;
use crate::room::{Room, RoomFilter, RoomSpec};
use crate::store::{BookingStore, RoomDeactivation};
use crate::types::DbId;

#[derive(Clone)]
pub struct RoomInventory {
    store: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
}

impl RoomInventory {
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn create_room(&self, spec: RoomSpec) -> Result<Room, CoreError> {
        let spec = spec.validated()?;
        let room = self.store.insert_room(&spec).await?;
        tracing::info!(room_id = room.id, room_number = %room.room_number, "Room created");
        Ok(room)
    }

    /// Replace all editable fields of a room.
    pub async fn update_room(&self, id: DbId, spec: RoomSpec) -> Result<Room, CoreError> {
        let spec = spec.validated()?;
        let room = self
            .store
            .replace_room(id, &spec)
            .await?
            .ok_or(CoreError::NotFound { entity: "Room", id })?;
        tracing::info!(room_id = id, "Room updated");
        Ok(room)
    }

    pub async fn deactivate_room(&self, id: DbId) -> Result<Room, CoreError> {
        match self.store.deactivate_room(id, self.clock.today()).await? {
            RoomDeactivation::Deactivated(room) => {
                tracing::info!(room_id = id, "Room deactivated");
                Ok(room)
            }
            RoomDeactivation::HasActiveBookings(count) => Err(CoreError::Conflict(format!(
                "Room {id} has {count} active booking(s) and cannot be deactivated"
            ))),
            RoomDeactivation::NotFound => Err(CoreError::NotFound { entity: "Room", id }),
        }
    }

    pub async fn activate_room(&self, id: DbId) -> Result<Room, CoreError> {
        let room = self
            .store
            .activate_room(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Room", id })?;
        tracing::info!(room_id = id, "Room activated");
        Ok(room)
    }

    pub async fn get_room(&self, id: DbId) -> Result<Room, CoreError> {
        self.store
            .find_room(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Room", id })
    }

    pub async fn list_rooms(&self, filter: &RoomFilter) -> Result<Vec<Room>, CoreError> {
        self.store.list_rooms(filter).await
    }

    /// Distinct room types across every room, active or not, in the order
    /// they first appear by room id.
    pub async fn room_types(&self) -> Result<Vec<String>, CoreError> {
        let rooms = self.store.list_rooms(&RoomFilter::default()).await?;
        let mut types: Vec<String> = Vec::new();
        for room in rooms {
            if !types.contains(&room.room_type) {
                types.push(room.room_type);
            }
        }
        Ok(types)
    }
}
