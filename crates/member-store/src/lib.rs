//! Member record storage for supporters' club sign-ups.
//!
//! Records are uniquely keyed by email and by phone. The store enforces
//! that uniqueness on every insert, so it remains the final arbiter even
//! when callers pre-check for duplicates.

mod error;
mod file;
mod memory;
mod types;

pub use error::{StoreError, UniqueField};
pub use file::FileStore;
pub use memory::{MemberTable, MemoryStore};
pub use types::{MemberRecord, NewMember};

use async_trait::async_trait;
use std::path::PathBuf;

/// Keyed member storage.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Find any member whose email equals `email` or whose phone equals `phone`.
    async fn find_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<MemberRecord>, StoreError>;

    /// Insert a new member.
    ///
    /// Fails with [`StoreError::UniqueViolation`] if the email or phone is
    /// already taken.
    async fn insert(&self, member: NewMember) -> Result<MemberRecord, StoreError>;

    /// Number of stored members.
    async fn count(&self) -> Result<usize, StoreError>;
}

/// Storage backend selected at startup.
#[derive(Debug)]
pub enum Store {
    Memory(MemoryStore),
    File(FileStore),
}

impl Store {
    /// In-memory store (no persistence).
    pub fn memory() -> Self {
        Store::Memory(MemoryStore::new())
    }

    /// File-backed store, loading any members already saved at `path`.
    pub async fn file(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Store::File(FileStore::open(path).await?))
    }

    /// Snapshot of all members, oldest first.
    pub async fn list(&self) -> Vec<MemberRecord> {
        match self {
            Store::Memory(s) => s.list().await,
            Store::File(s) => s.list().await,
        }
    }
}

#[async_trait]
impl MemberStore for Store {
    async fn find_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<MemberRecord>, StoreError> {
        match self {
            Store::Memory(s) => s.find_by_email_or_phone(email, phone).await,
            Store::File(s) => s.find_by_email_or_phone(email, phone).await,
        }
    }

    async fn insert(&self, member: NewMember) -> Result<MemberRecord, StoreError> {
        match self {
            Store::Memory(s) => s.insert(member).await,
            Store::File(s) => s.insert(member).await,
        }
    }

    async fn count(&self) -> Result<usize, StoreError> {
        match self {
            Store::Memory(s) => s.count().await,
            Store::File(s) => s.count().await,
        }
    }
}
