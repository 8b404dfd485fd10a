// FICHIER : docstash/src/storage/memory_store.rs

use crate::identity::{IdentityTriple, Selector};
use crate::query::FilterSpec;
use crate::storage::{
    apply_overwrite, compile_filter, prepare_document, validate_collection_name, CollectionPolicy,
    CollectionState, Document, SaveOptions, StorageSystem, WithCollections, WithQueries,
};
use crate::utils::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

/// Backend volatile : `collection -> clé -> document`, protégé par un seul verrou.
///
/// Les clones partagent les mêmes données.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageSystem for MemoryStore {
    #[instrument(skip(self, doc), level = "debug")]
    async fn save(&self, doc: Value, opts: SaveOptions) -> StoreResult<IdentityTriple> {
        let (triple, incoming) = prepare_document(doc)?;

        // Verrou d'écriture tenu pendant toute la lecture-modification-écriture.
        let mut data = self.data.write().await;
        let collection = data.entry(triple.collection.clone()).or_default();
        let existing = collection.get(&triple.key);
        if let Some(next) = apply_overwrite(existing, incoming, opts.overwrite, &triple)? {
            collection.insert(triple.key.clone(), next);
        }
        debug!(id = %triple, "document enregistré");
        Ok(triple)
    }

    async fn has(&self, selector: Selector<'_>) -> StoreResult<bool> {
        let triple = self.resolve(selector)?;
        let data = self.data.read().await;
        Ok(data
            .get(&triple.collection)
            .is_some_and(|c| c.contains_key(&triple.key)))
    }

    async fn fetch(&self, selector: Selector<'_>) -> StoreResult<Option<Document>> {
        let triple = self.resolve(selector)?;
        let data = self.data.read().await;
        Ok(data
            .get(&triple.collection)
            .and_then(|c| c.get(&triple.key))
            .cloned())
    }

    async fn delete(&self, selector: Selector<'_>) -> StoreResult<bool> {
        let triple = self.resolve(selector)?;
        let mut data = self.data.write().await;
        let removed = data
            .get_mut(&triple.collection)
            .and_then(|c| c.remove(&triple.key))
            .is_some();
        debug!(id = %triple, removed, "suppression");
        Ok(removed)
    }

    fn collection_policy(&self) -> CollectionPolicy {
        CollectionPolicy::AutoCreate
    }
}

#[async_trait]
impl WithCollections for MemoryStore {
    async fn get_collections(&self) -> StoreResult<Vec<String>> {
        Ok(self.data.read().await.keys().cloned().collect())
    }

    async fn ensure_collection(&self, name: &str) -> StoreResult<CollectionState> {
        validate_collection_name(name)?;
        let mut data = self.data.write().await;
        match data.get(name) {
            Some(docs) => Ok(CollectionState::Existing(docs.len())),
            None => {
                data.insert(name.to_string(), BTreeMap::new());
                info!(collection = name, "collection créée");
                Ok(CollectionState::Created)
            }
        }
    }

    async fn empty_collection(&self, name: &str) -> StoreResult<Option<usize>> {
        validate_collection_name(name)?;
        let mut data = self.data.write().await;
        Ok(data.get_mut(name).map(|docs| {
            let removed = docs.len();
            docs.clear();
            info!(collection = name, removed, "collection vidée");
            removed
        }))
    }

    async fn destroy_collection(&self, name: &str) -> StoreResult<bool> {
        validate_collection_name(name)?;
        let removed = self.data.write().await.remove(name).is_some();
        if removed {
            info!(collection = name, "collection supprimée");
        }
        Ok(removed)
    }
}

#[async_trait]
impl WithQueries for MemoryStore {
    async fn fetch_all(
        &self,
        collection: &str,
        filter: Option<&FilterSpec>,
    ) -> StoreResult<Vec<Document>> {
        let predicate = compile_filter(filter);
        let data = self.data.read().await;
        let Some(docs) = data.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .values()
            .filter(|d| predicate.matches_map(d))
            .cloned()
            .collect())
    }
}
