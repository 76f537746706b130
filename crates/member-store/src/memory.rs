//! In-memory member table and store.

use crate::error::{StoreError, UniqueField};
use crate::types::{MemberRecord, NewMember};
use crate::MemberStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Schema version of the serialized table.
const DATA_VERSION: u32 = 1;

/// Member records in insertion order, unique by email and by phone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberTable {
    /// Schema version for migrations.
    pub version: u32,
    members: Vec<MemberRecord>,
}

impl Default for MemberTable {
    fn default() -> Self {
        Self {
            version: DATA_VERSION,
            members: Vec::new(),
        }
    }
}

impl MemberTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the first member whose email or phone matches.
    pub fn find_by_email_or_phone(&self, email: &str, phone: &str) -> Option<&MemberRecord> {
        self.members.iter().find(|m| m.matches(email, phone))
    }

    /// Insert a new member, rejecting any email or phone already present.
    pub fn insert(&mut self, member: NewMember) -> Result<MemberRecord, StoreError> {
        if self.members.iter().any(|m| m.email == member.email) {
            return Err(StoreError::UniqueViolation(UniqueField::Email));
        }
        if self.members.iter().any(|m| m.phone == member.phone) {
            return Err(StoreError::UniqueViolation(UniqueField::Phone));
        }

        let record = MemberRecord::create(member);
        self.members.push(record.clone());
        Ok(record)
    }

    /// Remove a member by id.
    pub(crate) fn remove(&mut self, id: Uuid) -> Option<MemberRecord> {
        let index = self.members.iter().position(|m| m.id == id)?;
        Some(self.members.remove(index))
    }

    /// All members, oldest first.
    pub fn list(&self) -> &[MemberRecord] {
        &self.members
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Check a table read from outside: known version, no repeated email or phone.
    pub fn verify(&self) -> Result<(), StoreError> {
        if self.version != DATA_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.version,
                supported: DATA_VERSION,
            });
        }

        let mut emails = HashSet::new();
        let mut phones = HashSet::new();
        for member in &self.members {
            if !emails.insert(member.email.as_str()) {
                return Err(StoreError::Inconsistent(format!(
                    "member {} repeats an email",
                    member.id
                )));
            }
            if !phones.insert(member.phone.as_str()) {
                return Err(StoreError::Inconsistent(format!(
                    "member {} repeats a phone number",
                    member.id
                )));
            }
        }
        Ok(())
    }
}

/// Member store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<MemberTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all members, oldest first.
    pub async fn list(&self) -> Vec<MemberRecord> {
        self.table.read().await.list().to_vec()
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn find_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<MemberRecord>, StoreError> {
        let table = self.table.read().await;
        Ok(table.find_by_email_or_phone(email, phone).cloned())
    }

    async fn insert(&self, member: NewMember) -> Result<MemberRecord, StoreError> {
        let mut table = self.table.write().await;
        let record = table.insert(member)?;
        debug!(member_id = %record.id, "Inserted member into memory store");
        Ok(record)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.read().await.count())
    }
}
