use async_trait::async_trait;
use thiserror::Error;

pub use models::user::Attributes;

/// One page of a full-table scan.
#[derive(Debug)]
pub struct ScanPage {
    pub items: Vec<Attributes>,
    /// Primary key to resume the scan from; `None` on the final page.
    pub last_evaluated_key: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional write's existence precondition did not hold.
    #[error("conditional check failed")]
    ConditionFailed,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Capability set of the backing user table: get by key, paged scan with a
/// continuation key, and writes conditioned on key existence, each evaluated
/// atomically. Implementations can be file-backed, in-memory, or remote KV.
#[async_trait]
pub trait UserTable: Send + Sync {
    /// Fetch the attribute map stored under `email`, if any.
    async fn get_item(&self, email: &str) -> Result<Option<Attributes>, StoreError>;

    /// Return one page of the scan, resuming after `exclusive_start_key`.
    async fn scan_page(&self, exclusive_start_key: Option<&str>) -> Result<ScanPage, StoreError>;

    /// Write `item` only if no record with that key exists.
    async fn put_item_new(&self, email: &str, item: Attributes) -> Result<(), StoreError>;

    /// Apply `changes` only if a record with that key exists; returns the
    /// post-update image.
    async fn update_item_existing(
        &self,
        email: &str,
        changes: Attributes,
    ) -> Result<Attributes, StoreError>;

    /// Remove the record only if one with that key exists.
    async fn delete_item_existing(&self, email: &str) -> Result<(), StoreError>;
}
