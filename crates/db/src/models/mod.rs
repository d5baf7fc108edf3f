//! Row types for the Innkeep tables.
//!
//! Status columns are stored as SMALLINT ids into lookup tables; each row
//! converts into its core record with `TryFrom`, failing on an id the core
//! enums do not know.

pub mod booking;
pub mod guest;
pub mod room;

use innkeep_core::error::CoreError;

pub(crate) fn unknown_status(table: &str, id: i16) -> CoreError {
    CoreError::Storage(format!("unknown {table} status id {id}"))
}
