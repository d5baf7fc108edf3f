use std::sync::Arc;

use innkeep_core::availability::AvailabilityEngine;
use innkeep_core::clock::Clock;
use innkeep_core::inventory::RoomInventory;
use innkeep_core::lifecycle::BookingManager;
use innkeep_core::notify::Notifier;
use innkeep_core::registry::GuestRegistry;
use innkeep_core::store::BookingStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every service holds its collaborators behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Present when running on PostgreSQL; probed by `/health`.
    pub pool: Option<innkeep_db::DbPool>,
    pub config: Arc<ServerConfig>,
    pub rooms: RoomInventory,
    pub availability: AvailabilityEngine,
    pub bookings: BookingManager,
    pub guests: GuestRegistry,
}

impl AppState {
    /// Wire the domain services over one store, notifier and clock.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn BookingStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        pool: Option<innkeep_db::DbPool>,
    ) -> Self {
        Self {
            pool,
            rooms: RoomInventory::new(store.clone(), clock.clone()),
            availability: AvailabilityEngine::new(store.clone()),
            bookings: BookingManager::new(
                store.clone(),
                notifier,
                clock,
                config.booking.clone(),
            ),
            guests: GuestRegistry::new(store),
            config: Arc::new(config),
        }
    }
}
