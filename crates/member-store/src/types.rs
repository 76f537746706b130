//! Member record types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member to be inserted. The store assigns the id and creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub email: String,
    pub phone: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub invited_to_whatsapp: bool,
    pub should_invite_to_whatsapp: bool,
    pub should_receive_updates: bool,
}

/// A persisted member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: Uuid,

    /// Unique across all records
    pub email: String,

    /// Unique across all records, stored as entered
    pub phone: String,

    pub name: String,
    pub date_of_birth: NaiveDate,

    /// True when the member was already in the WhatsApp group at sign-up
    pub invited_to_whatsapp: bool,

    pub should_invite_to_whatsapp: bool,
    pub should_receive_updates: bool,
    pub created_at: DateTime<Utc>,
}

impl MemberRecord {
    /// Materialize a new member with a fresh id and the current time.
    pub fn create(member: NewMember) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: member.email,
            phone: member.phone,
            name: member.name,
            date_of_birth: member.date_of_birth,
            invited_to_whatsapp: member.invited_to_whatsapp,
            should_invite_to_whatsapp: member.should_invite_to_whatsapp,
            should_receive_updates: member.should_receive_updates,
            created_at: Utc::now(),
        }
    }

    /// Whether this record collides with the given email or phone.
    pub fn matches(&self, email: &str, phone: &str) -> bool {
        self.email == email || self.phone == phone
    }
}
