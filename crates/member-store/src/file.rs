//! JSON file-backed persistent member store.

use crate::error::StoreError;
use crate::memory::MemberTable;
use crate::types::{MemberRecord, NewMember};
use crate::MemberStore;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Member store persisted to a JSON file.
///
/// The whole table lives in memory and is rewritten on every insert.
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-write leaves the previous file intact.
#[derive(Debug)]
pub struct FileStore {
    table: RwLock<MemberTable>,
    storage_path: PathBuf,
}

impl FileStore {
    /// Open the store, loading existing members from `storage_path`.
    ///
    /// A missing file yields an empty store. A file written under another
    /// schema version, or one repeating an email or phone, is refused.
    pub async fn open(storage_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let storage_path = storage_path.into();
        let table = Self::load(&storage_path).await?;

        Ok(Self {
            table: RwLock::new(table),
            storage_path,
        })
    }

    async fn load(path: &Path) -> Result<MemberTable, StoreError> {
        if !path.exists() {
            info!("Member file not found at {:?}, starting with empty store", path);
            return Ok(MemberTable::new());
        }

        let data = fs::read(path).await?;
        if data.is_empty() {
            warn!("Member file {:?} is empty, starting with empty store", path);
            return Ok(MemberTable::new());
        }

        let table: MemberTable = serde_json::from_slice(&data)?;
        table.verify()?;
        info!("Loaded {} members from {:?}", table.count(), path);
        Ok(table)
    }

    async fn save(&self, table: &MemberTable) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(table)?;

        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.storage_path.with_extension("tmp");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &self.storage_path).await?;

        debug!("Saved member file ({} bytes) to {:?}", data.len(), self.storage_path);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Snapshot of all members, oldest first.
    pub async fn list(&self) -> Vec<MemberRecord> {
        self.table.read().await.list().to_vec()
    }
}

#[async_trait]
impl MemberStore for FileStore {
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

        if let Err(e) = self.save(&table).await {
            error!(member_id = %record.id, "Failed to persist member, rolling back: {}", e);
            table.remove(record.id);
            return Err(e);
        }

        Ok(record)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.read().await.count())
    }
}
