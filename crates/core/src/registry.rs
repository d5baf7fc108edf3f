//! Guest registry.
//!
//! One guest record per email address. Booking flows call
//! [`GuestRegistry::create_or_get_guest`] with whatever contact details the
//! guest typed; a returning guest's name and phone are refreshed from the
//! latest non-empty values.

use std::sync::Arc;

use crate::booking::{BookingQuery, BookingStatus};
use crate::error::CoreError;
use crate::guest::{Guest, GuestContact};
use crate::store::{BookingStore, GuestPage};
use crate::types::DbId;

/// Page size used when a listing does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page a listing may request.
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct GuestRegistry {
    store: Arc<dyn BookingStore>,
}

impl GuestRegistry {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Resolve a guest by email, creating one if none exists.
    ///
    /// The email lookup is case-sensitive. When two requests race to
    /// register the same email, the loser re-reads and returns the winner's
    /// record.
    pub async fn create_or_get_guest(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<Guest, CoreError> {
        let contact = GuestContact::new(name, email, phone).validated()?;

        if let Some(existing) = self.store.find_guest_by_email(&contact.email).await? {
            return self.refresh(existing, &contact).await;
        }

        if contact.name.is_empty() {
            return Err(CoreError::Validation("Guest name is required".into()));
        }

        match self.store.insert_guest(&contact).await {
            Ok(guest) => {
                tracing::info!(guest_id = guest.id, "Guest registered");
                Ok(guest)
            }
            Err(CoreError::Conflict(_)) => {
                let existing = self
                    .store
                    .find_guest_by_email(&contact.email)
                    .await?
                    .ok_or_else(|| {
                        CoreError::Storage(format!(
                            "guest '{}' conflicted on insert but cannot be found",
                            contact.email
                        ))
                    })?;
                self.refresh(existing, &contact).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_guest(&self, id: DbId) -> Result<Guest, CoreError> {
        self.store
            .find_guest(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Guest",
                id,
            })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Guest>, CoreError> {
        self.store.find_guest_by_email(email.trim()).await
    }

    /// Overwrite a guest's contact details. The new email must not belong to
    /// another guest.
    pub async fn update_guest(&self, id: DbId, contact: GuestContact) -> Result<Guest, CoreError> {
        let contact = contact.validated()?;
        if contact.name.is_empty() {
            return Err(CoreError::Validation("Guest name is required".into()));
        }
        let guest = self
            .store
            .update_guest(id, &contact)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Guest",
                id,
            })?;
        tracing::info!(guest_id = id, "Guest updated");
        Ok(guest)
    }

    /// Search guests by name, email or phone. `limit` is clamped to
    /// `1..=MAX_PAGE_SIZE`.
    pub async fn list_guests(
        &self,
        search: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<GuestPage, CoreError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);
        self.store.list_guests(search, limit, offset).await
    }

    /// Delete a guest who has never booked.
    pub async fn delete_guest(&self, id: DbId) -> Result<(), CoreError> {
        let active = self
            .store
            .list_bookings(&BookingQuery {
                guest_id: Some(id),
                statuses: vec![BookingStatus::Confirmed, BookingStatus::CheckedIn],
                ..Default::default()
            })
            .await?;
        if !active.is_empty() {
            return Err(CoreError::Conflict(format!(
                "Guest {id} has {} active booking(s)",
                active.len()
            )));
        }

        if !self.store.delete_guest(id).await? {
            return Err(CoreError::NotFound {
                entity: "Guest",
                id,
            });
        }
        tracing::info!(guest_id = id, "Guest deleted");
        Ok(())
    }

    async fn refresh(&self, existing: Guest, contact: &GuestContact) -> Result<Guest, CoreError> {
        let Some(merged) = contact.merge_into(&existing) else {
            return Ok(existing);
        };
        let id = existing.id;
        let guest = self
            .store
            .update_guest(id, &merged)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Guest",
                id,
            })?;
        tracing::debug!(guest_id = id, "Guest contact details refreshed");
        Ok(guest)
    }
}
