// FICHIER : docstash/tests/storage_suite/fake_driver.rs

use docstash::identity::{ID_FIELD, KEY_FIELD};
use docstash::storage::remote::{CollectionKind, CreateCollectionOptions, DocumentDriver};
use docstash::storage::{Document, OverwriteMode};
use docstash::utils::json::merge_map;
use docstash::utils::prelude::*;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

type Collections = BTreeMap<String, (CollectionKind, BTreeMap<String, Document>)>;

/// Serveur documentaire simulé : mêmes règles qu'un serveur distant
/// (écriture refusée dans une collection inexistante).
#[derive(Debug, Default)]
pub struct FakeDriver {
    collections: Mutex<Collections>,
}

impl FakeDriver {
    pub async fn kind_of(&self, name: &str) -> Option<CollectionKind> {
        self.collections.lock().await.get(name).map(|(k, _)| *k)
    }
}

fn missing(name: &str) -> StoreError {
    StoreError::CollectionNotFound(name.to_string())
}

#[async_trait]
impl DocumentDriver for FakeDriver {
    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        Ok(self.collections.lock().await.keys().cloned().collect())
    }

    async fn collection_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.collections.lock().await.contains_key(name))
    }

    async fn create_collection(&self, name: &str, opts: &CreateCollectionOptions) -> StoreResult<()> {
        let mut cols = self.collections.lock().await;
        if cols.contains_key(name) {
            return Err(StoreError::Backend {
                status: 409,
                message: "duplicate name".to_string(),
            });
        }
        cols.insert(name.to_string(), (opts.kind, BTreeMap::new()));
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        self.collections
            .lock()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| missing(name))
    }

    async fn count(&self, name: &str) -> StoreResult<usize> {
        let cols = self.collections.lock().await;
        cols.get(name).map(|(_, d)| d.len()).ok_or_else(|| missing(name))
    }

    async fn truncate(&self, name: &str) -> StoreResult<()> {
        let mut cols = self.collections.lock().await;
        let (_, docs) = cols.get_mut(name).ok_or_else(|| missing(name))?;
        docs.clear();
        Ok(())
    }

    async fn document_exists(&self, collection: &str, key: &str) -> StoreResult<bool> {
        let cols = self.collections.lock().await;
        Ok(cols.get(collection).is_some_and(|(_, d)| d.contains_key(key)))
    }

    async fn document(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        let cols = self.collections.lock().await;
        Ok(cols.get(collection).and_then(|(_, d)| d.get(key)).cloned())
    }

    async fn save_document(
        &self,
        collection: &str,
        doc: &Document,
        mode: OverwriteMode,
    ) -> StoreResult<()> {
        let mut cols = self.collections.lock().await;
        let (_, docs) = cols.get_mut(collection).ok_or_else(|| missing(collection))?;
        let key = doc
            .get(KEY_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let Some(current) = docs.get_mut(&key) else {
            docs.insert(key, doc.clone());
            return Ok(());
        };
        match mode {
            OverwriteMode::Replace => *current = doc.clone(),
            OverwriteMode::Update => merge_map(current, doc.clone()),
            OverwriteMode::Ignore => {}
            OverwriteMode::Conflict => {
                let id = current.get(ID_FIELD).and_then(Value::as_str).unwrap_or_default();
                return Err(StoreError::DocumentExists(id.to_string()));
            }
        }
        Ok(())
    }

    async fn remove_document(&self, collection: &str, key: &str) -> StoreResult<bool> {
        let mut cols = self.collections.lock().await;
        Ok(cols
            .get_mut(collection)
            .and_then(|(_, d)| d.remove(key))
            .is_some())
    }

    async fn scan(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let cols = self.collections.lock().await;
        cols.get(collection)
            .map(|(_, d)| d.values().cloned().collect())
            .ok_or_else(|| missing(collection))
    }
}
