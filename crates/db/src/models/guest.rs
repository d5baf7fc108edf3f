//! Guest rows.

use innkeep_core::guest::Guest;
use innkeep_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `guests` table.
#[derive(Debug, Clone, FromRow)]
pub struct GuestRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<GuestRow> for Guest {
    fn from(row: GuestRow) -> Self {
        Guest {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
