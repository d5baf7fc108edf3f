//! Guest records and contact validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// A stored guest. Email is unique across guests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guest {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Contact details supplied by a guest or staff member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GuestContact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl GuestContact {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Trim all fields and check the email shape.
    pub fn validated(self) -> Result<Self, CoreError> {
        let contact = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        };
        validate_email(&contact.email)?;
        Ok(contact)
    }

    /// Fold newer contact details into an existing record: non-empty values
    /// that differ replace the stored ones. Returns `None` when nothing
    /// changed.
    pub fn merge_into(&self, existing: &Guest) -> Option<GuestContact> {
        let mut merged = GuestContact::new(&existing.name, &existing.email, &existing.phone);
        let mut changed = false;

        if !self.name.is_empty() && self.name != existing.name {
            merged.name = self.name.clone();
            changed = true;
        }
        if !self.phone.is_empty() && self.phone != existing.phone {
            merged.phone = self.phone.clone();
            changed = true;
        }

        changed.then_some(merged)
    }
}

/// Basic syntactic email check: `local@domain` where the domain contains a
/// dot that is neither its first nor last character.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let invalid = || CoreError::Validation(format!("Invalid email address '{email}'"));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let dot = domain.rfind('.').ok_or_else(invalid)?;
    if domain.starts_with('.') || dot == domain.len() - 1 {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn guest() -> Guest {
        Guest {
            id: 1,
            name: "Aiko Tanaka".into(),
            email: "aiko@example.jp".into(),
            phone: "090-0000-0000".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn accepts_plain_address() {
        assert!(validate_email("guest@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.co.jp").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "",
            "guest",
            "@example.com",
            "guest@",
            "guest@localhost",
            "guest@example.",
            "guest@.com",
            "a@b@c.com",
            "guest @example.com",
        ] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn merge_takes_latest_non_empty_values() {
        let update = GuestContact::new("Aiko T.", "aiko@example.jp", "");
        let merged = update.merge_into(&guest()).unwrap();
        assert_eq!(merged.name, "Aiko T.");
        assert_eq!(merged.phone, "090-0000-0000");
    }

    #[test]
    fn merge_without_changes_is_none() {
        let same = GuestContact::new("Aiko Tanaka", "aiko@example.jp", "090-0000-0000");
        assert!(same.merge_into(&guest()).is_none());
        let blank = GuestContact::new("", "aiko@example.jp", "");
        assert!(blank.merge_into(&guest()).is_none());
    }
}
