use std::{collections::BTreeMap, ops::Bound, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};

use super::table::{Attributes, ScanPage, StoreError, UserTable};

/// JSON file-backed user table.
///
/// Persists a `BTreeMap<email, attributes>` to a JSON file and serves the
/// `UserTable` capability set over it. Mutations run under a single write
/// lock, which gives the conditional writes their atomic check-and-write.
/// Scans page through key order; the continuation key is the last key of a
/// page and is only present while further items remain.
#[derive(Clone)]
pub struct JsonTableStore {
    inner: Arc<RwLock<BTreeMap<String, Attributes>>>,
    file_path: PathBuf,
    page_size: usize,
}

impl JsonTableStore {
    /// Initialize the store from a path. Creates the file with an empty table
    /// if missing.
    pub async fn new<P: Into<PathBuf>>(path: P, page_size: usize) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: BTreeMap<String, Attributes> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => {
                let empty = BTreeMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty)?).await?;
                empty
            }
        };

        Ok(Arc::new(Self {
            inner: Arc::new(RwLock::new(map)),
            file_path,
            page_size: page_size.max(1),
        }))
    }

    async fn save(&self) -> Result<(), StoreError> {
        let map = self.inner.read().await;
        let data = serde_json::to_vec(&*map)?;
        fs::write(&self.file_path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl UserTable for JsonTableStore {
    async fn get_item(&self, email: &str) -> Result<Option<Attributes>, StoreError> {
        let map = self.inner.read().await;
        Ok(map.get(email).cloned())
    }

    async fn scan_page(&self, exclusive_start_key: Option<&str>) -> Result<ScanPage, StoreError> {
        let map = self.inner.read().await;
        let start = match exclusive_start_key {
            Some(key) => Bound::Excluded(key.to_string()),
            None => Bound::Unbounded,
        };

        let mut items = Vec::new();
        let mut last_key = None;
        let mut range = map.range((start, Bound::Unbounded));
        for (key, item) in range.by_ref().take(self.page_size) {
            last_key = Some(key.clone());
            items.push(item.clone());
        }
        let more_remaining = range.next().is_some();

        Ok(ScanPage {
            items,
            last_evaluated_key: if more_remaining { last_key } else { None },
        })
    }

    async fn put_item_new(&self, email: &str, item: Attributes) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        if map.contains_key(email) {
            return Err(StoreError::ConditionFailed);
        }
        map.insert(email.to_string(), item);
        drop(map);
        self.save().await
    }

    async fn update_item_existing(
        &self,
        email: &str,
        changes: Attributes,
    ) -> Result<Attributes, StoreError> {
        let mut map = self.inner.write().await;
        let existing = match map.get_mut(email) {
            Some(existing) => existing,
            None => return Err(StoreError::ConditionFailed),
        };
        for (key, value) in changes {
            existing.insert(key, value);
        }
        let updated = existing.clone();
        drop(map);
        self.save().await?;
        Ok(updated)
    }

    async fn delete_item_existing(&self, email: &str) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        if map.remove(email).is_none() {
            return Err(StoreError::ConditionFailed);
        }
        drop(map);
        self.save().await
    }
}
