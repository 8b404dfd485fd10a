// FICHIER : docstash/src/storage/mod.rs

//! Contrat de stockage commun aux backends (mémoire, fichiers, distant).

pub mod file_store;
pub mod memory_store;
pub mod remote;

use crate::identity::{self, IdentityTriple, Selector};
use crate::query::{CompiledFilter, FilterSpec};
use crate::utils::config::{BackendKind, StoreConfig};
use crate::utils::json;
use crate::utils::prelude::*;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use remote::{arango::ArangoDriver, DocumentDriver, RemoteStore};

/// Un document stocké : objet JSON portant ses champs d'identité.
pub type Document = Map<String, Value>;

// --- OPTIONS D'ÉCRITURE ---

/// Comportement de `save` quand le document existe déjà.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwriteMode {
    /// Fusion profonde des nouveaux champs sur l'existant.
    #[default]
    Update,
    Replace,
    /// Le document existant est laissé intact.
    Ignore,
    /// `StoreError::DocumentExists`.
    Conflict,
}

impl OverwriteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OverwriteMode::Update => "update",
            OverwriteMode::Replace => "replace",
            OverwriteMode::Ignore => "ignore",
            OverwriteMode::Conflict => "conflict",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    #[serde(default)]
    pub overwrite: OverwriteMode,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overwrite(mode: OverwriteMode) -> Self {
        Self { overwrite: mode }
    }
}

// --- ÉTATS DE COLLECTION ---

/// Résultat de `ensure_collection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionState {
    Created,
    /// La collection existait déjà, avec ce nombre de documents.
    Existing(usize),
}

impl CollectionState {
    /// Valeur historique sur le fil : `-1` si créée, sinon le nombre de documents.
    pub fn as_count(self) -> i64 {
        match self {
            CollectionState::Created => -1,
            CollectionState::Existing(n) => n as i64,
        }
    }
}

/// Valeur historique de `empty_collection` : `-1` si la collection n'existait pas.
pub fn count_or_missing(removed: Option<usize>) -> i64 {
    removed.map(|n| n as i64).unwrap_or(-1)
}

/// Un `save` dans une collection absente la crée-t-il ?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionPolicy {
    AutoCreate,
    RequireExisting,
}

// --- TRAITS ---

#[async_trait]
pub trait StorageSystem: Send + Sync {
    fn resolve(&self, selector: Selector<'_>) -> StoreResult<IdentityTriple> {
        identity::resolve(&selector)
    }

    /// Écrit un document (objet JSON) et renvoie son identité.
    async fn save(&self, doc: Value, opts: SaveOptions) -> StoreResult<IdentityTriple>;

    /// `save` séquentiel : la première erreur est renvoyée, les écritures
    /// précédentes restent acquises.
    async fn save_all(&self, docs: Vec<Value>, opts: SaveOptions) -> StoreResult<Vec<IdentityTriple>> {
        let mut ids = Vec::with_capacity(docs.len());
        for doc in docs {
            ids.push(self.save(doc, opts).await?);
        }
        Ok(ids)
    }

    async fn has(&self, selector: Selector<'_>) -> StoreResult<bool>;

    async fn fetch(&self, selector: Selector<'_>) -> StoreResult<Option<Document>>;

    /// `true` si un document a été supprimé.
    async fn delete(&self, selector: Selector<'_>) -> StoreResult<bool>;

    fn collection_policy(&self) -> CollectionPolicy;
}

#[async_trait]
pub trait WithCollections: Send + Sync {
    async fn get_collections(&self) -> StoreResult<Vec<String>>;

    async fn ensure_collection(&self, name: &str) -> StoreResult<CollectionState>;

    /// `None` si la collection n'existe pas, sinon le nombre de documents retirés.
    async fn empty_collection(&self, name: &str) -> StoreResult<Option<usize>>;

    async fn destroy_collection(&self, name: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait WithQueries: Send + Sync {
    /// Scan complet filtré. Collection inconnue : liste vide.
    async fn fetch_all(
        &self,
        collection: &str,
        filter: Option<&FilterSpec>,
    ) -> StoreResult<Vec<Document>>;
}

/// Union des capacités, implémentée automatiquement.
pub trait DocumentStore: StorageSystem + WithCollections + WithQueries {}

impl<T: StorageSystem + WithCollections + WithQueries + ?Sized> DocumentStore for T {}

// --- FACTORY ---

/// Construit le backend décrit par la configuration.
pub async fn open_store(config: &StoreConfig) -> StoreResult<Box<dyn DocumentStore>> {
    info!(backend = ?config.backend, "ouverture du stockage");
    match config.backend {
        BackendKind::Memory => Ok(Box::new(MemoryStore::new())),
        BackendKind::File => {
            let store = FileStore::open(config.require_data_root()?).await?;
            Ok(Box::new(store))
        }
        BackendKind::Arango => {
            let driver = ArangoDriver::connect(&config.arango).await?;
            Ok(Box::new(RemoteStore::new(driver)))
        }
    }
}

// --- OUTILS PARTAGÉS PAR LES BACKENDS ---

/// Nom de collection : non vide, sans `/`.
pub fn validate_collection_name(name: &str) -> StoreResult<()> {
    if name.is_empty() || name.contains('/') {
        return Err(StoreError::invalid_selector(format!(
            "nom de collection invalide : '{}'",
            name
        )));
    }
    Ok(())
}

/// Résout l'identité d'un document à écrire et y inscrit ses champs d'identité.
pub(crate) fn prepare_document(doc: Value) -> StoreResult<(IdentityTriple, Document)> {
    let mut map = match doc {
        Value::Object(map) => map,
        other => {
            return Err(StoreError::invalid_selector(format!(
                "un document doit être un objet, reçu : {}",
                other
            )))
        }
    };
    let triple = identity::resolve(&Selector::Fields(&map))?;
    triple.stamp(&mut map);
    Ok((triple, map))
}

/// Calcule le document à écrire selon le mode. `None` : rien à écrire.
pub(crate) fn apply_overwrite(
    existing: Option<&Document>,
    incoming: Document,
    mode: OverwriteMode,
    id: &IdentityTriple,
) -> StoreResult<Option<Document>> {
    match (existing, mode) {
        (None, _) | (Some(_), OverwriteMode::Replace) => Ok(Some(incoming)),
        (Some(current), OverwriteMode::Update) => {
            let mut merged = current.clone();
            json::merge_map(&mut merged, incoming);
            Ok(Some(merged))
        }
        (Some(_), OverwriteMode::Ignore) => Ok(None),
        (Some(_), OverwriteMode::Conflict) => Err(StoreError::DocumentExists(id.id.clone())),
    }
}

pub(crate) fn compile_filter(filter: Option<&FilterSpec>) -> CompiledFilter {
    filter.map(FilterSpec::compile).unwrap_or_default()
}
