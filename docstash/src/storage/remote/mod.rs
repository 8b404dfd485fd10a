// FICHIER : docstash/src/storage/remote/mod.rs

//! Backend adossé à une base documentaire distante, via un `DocumentDriver`.

pub mod arango;

use crate::identity::{IdentityTriple, Selector};
use crate::query::FilterSpec;
use crate::storage::{
    compile_filter, prepare_document, validate_collection_name, CollectionPolicy, CollectionState,
    Document, OverwriteMode, SaveOptions, StorageSystem, WithCollections, WithQueries,
};
use crate::utils::prelude::*;
use std::sync::Arc;

/// Nature d'une collection distante.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    #[default]
    Document,
    Edge,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCollectionOptions {
    #[serde(default)]
    pub kind: CollectionKind,
}

impl CreateCollectionOptions {
    pub fn edge() -> Self {
        Self {
            kind: CollectionKind::Edge,
        }
    }
}

/// Opérations élémentaires attendues d'un serveur documentaire.
///
/// Un document ou une collection absents sont des valeurs (`false`, `None`),
/// pas des erreurs. `save_document` dans une collection inexistante échoue.
#[async_trait]
pub trait DocumentDriver: Send + Sync {
    async fn list_collections(&self) -> StoreResult<Vec<String>>;
    async fn collection_exists(&self, name: &str) -> StoreResult<bool>;
    async fn create_collection(&self, name: &str, opts: &CreateCollectionOptions) -> StoreResult<()>;
    async fn drop_collection(&self, name: &str) -> StoreResult<()>;
    async fn count(&self, name: &str) -> StoreResult<usize>;
    async fn truncate(&self, name: &str) -> StoreResult<()>;

    async fn document_exists(&self, collection: &str, key: &str) -> StoreResult<bool>;
    async fn document(&self, collection: &str, key: &str) -> StoreResult<Option<Document>>;
    async fn save_document(
        &self,
        collection: &str,
        doc: &Document,
        mode: OverwriteMode,
    ) -> StoreResult<()>;
    async fn remove_document(&self, collection: &str, key: &str) -> StoreResult<bool>;

    /// Tous les documents d'une collection.
    async fn scan(&self, collection: &str) -> StoreResult<Vec<Document>>;
}

/// `StorageSystem` complet au-dessus d'un driver.
/// Le filtrage de `fetch_all` est fait localement, après un scan complet.
#[derive(Debug)]
pub struct RemoteStore<D: DocumentDriver> {
    driver: Arc<D>,
}

impl<D: DocumentDriver> Clone for RemoteStore<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
        }
    }
}

impl<D: DocumentDriver> RemoteStore<D> {
    pub fn new(driver: D) -> Self {
        Self::from_shared(Arc::new(driver))
    }

    pub fn from_shared(driver: Arc<D>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// `ensure_collection` avec options de création (collections d'arêtes).
    pub async fn ensure_collection_with(
        &self,
        name: &str,
        opts: &CreateCollectionOptions,
    ) -> StoreResult<CollectionState> {
        validate_collection_name(name)?;
        if self.driver.collection_exists(name).await? {
            return Ok(CollectionState::Existing(self.driver.count(name).await?));
        }
        self.driver.create_collection(name, opts).await?;
        info!(collection = name, kind = ?opts.kind, "collection distante créée");
        Ok(CollectionState::Created)
    }
}

#[async_trait]
impl<D: DocumentDriver> StorageSystem for RemoteStore<D> {
    #[instrument(skip(self, doc), level = "debug")]
    async fn save(&self, doc: Value, opts: SaveOptions) -> StoreResult<IdentityTriple> {
        let (triple, stored) = prepare_document(doc)?;
        self.driver
            .save_document(&triple.collection, &stored, opts.overwrite)
            .await?;
        Ok(triple)
    }

    async fn has(&self, selector: Selector<'_>) -> StoreResult<bool> {
        let triple = self.resolve(selector)?;
        self.driver.document_exists(&triple.collection, &triple.key).await
    }

    async fn fetch(&self, selector: Selector<'_>) -> StoreResult<Option<Document>> {
        let triple = self.resolve(selector)?;
        self.driver.document(&triple.collection, &triple.key).await
    }

    async fn delete(&self, selector: Selector<'_>) -> StoreResult<bool> {
        let triple = self.resolve(selector)?;
        self.driver.remove_document(&triple.collection, &triple.key).await
    }

    fn collection_policy(&self) -> CollectionPolicy {
        CollectionPolicy::RequireExisting
    }
}

#[async_trait]
impl<D: DocumentDriver> WithCollections for RemoteStore<D> {
    async fn get_collections(&self) -> StoreResult<Vec<String>> {
        let mut names = self.driver.list_collections().await?;
        names.sort();
        Ok(names)
    }

    async fn ensure_collection(&self, name: &str) -> StoreResult<CollectionState> {
        self.ensure_collection_with(name, &CreateCollectionOptions::default())
            .await
    }

    async fn empty_collection(&self, name: &str) -> StoreResult<Option<usize>> {
        validate_collection_name(name)?;
        if !self.driver.collection_exists(name).await? {
            return Ok(None);
        }
        let count = self.driver.count(name).await?;
        self.driver.truncate(name).await?;
        info!(collection = name, removed = count, "collection distante vidée");
        Ok(Some(count))
    }

    async fn destroy_collection(&self, name: &str) -> StoreResult<bool> {
        validate_collection_name(name)?;
        if !self.driver.collection_exists(name).await? {
            return Ok(false);
        }
        self.driver.drop_collection(name).await?;
        info!(collection = name, "collection distante supprimée");
        Ok(true)
    }
}

#[async_trait]
impl<D: DocumentDriver> WithQueries for RemoteStore<D> {
    async fn fetch_all(
        &self,
        collection: &str,
        filter: Option<&FilterSpec>,
    ) -> StoreResult<Vec<Document>> {
        if !self.driver.collection_exists(collection).await? {
            return Ok(Vec::new());
        }
        let predicate = compile_filter(filter);
        let mut docs = self.driver.scan(collection).await?;
        docs.retain(|d| predicate.matches_map(d));
        Ok(docs)
    }
}
