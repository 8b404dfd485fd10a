// FICHIER : docstash/src/storage/file_store.rs

use crate::identity::{self, IdentityTriple, Selector};
use crate::query::FilterSpec;
use crate::storage::{
    apply_overwrite, compile_filter, prepare_document, validate_collection_name, CollectionPolicy,
    CollectionState, Document, SaveOptions, StorageSystem, WithCollections, WithQueries,
};
use crate::utils::fs::{self, Path, PathBuf};
use crate::utils::prelude::*;

const DOC_EXTENSION: &str = "json";

/// Backend sur disque : un dossier par collection, un fichier JSON par document.
///
/// ```text
/// {root}/{collection}/{key}.json
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Ouvre (et crée au besoin) la racine du stockage.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::ensure_dir(&root).await?;
        info!(root = ?root, "FileStore ouvert");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, name: &str) -> StoreResult<PathBuf> {
        validate_collection_name(name)?;
        if !identity::is_safe_collection(name) {
            return Err(StoreError::UnsafeIdentifier(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn document_path(&self, triple: &IdentityTriple) -> StoreResult<PathBuf> {
        if !triple.is_path_safe() {
            return Err(StoreError::UnsafeIdentifier(triple.id.clone()));
        }
        Ok(self
            .root
            .join(&triple.collection)
            .join(format!("{}.{}", triple.key, DOC_EXTENSION)))
    }

    async fn keys(&self, dir: &Path) -> StoreResult<Vec<String>> {
        fs::list_file_stems(dir, DOC_EXTENSION).await
    }
}

#[async_trait]
impl StorageSystem for FileStore {
    #[instrument(skip(self, doc), level = "debug")]
    async fn save(&self, doc: Value, opts: SaveOptions) -> StoreResult<IdentityTriple> {
        let (triple, incoming) = prepare_document(doc)?;
        let path = self.document_path(&triple)?;

        let existing: Option<Document> = fs::read_json_opt(&path).await?;
        if let Some(next) = apply_overwrite(existing.as_ref(), incoming, opts.overwrite, &triple)? {
            fs::write_json_atomic(&path, &next).await?;
        }
        debug!(id = %triple, "document écrit");
        Ok(triple)
    }

    async fn has(&self, selector: Selector<'_>) -> StoreResult<bool> {
        let triple = self.resolve(selector)?;
        Ok(fs::is_file(&self.document_path(&triple)?).await)
    }

    async fn fetch(&self, selector: Selector<'_>) -> StoreResult<Option<Document>> {
        let triple = self.resolve(selector)?;
        fs::read_json_opt(&self.document_path(&triple)?).await
    }

    async fn delete(&self, selector: Selector<'_>) -> StoreResult<bool> {
        let triple = self.resolve(selector)?;
        let removed = fs::remove_file(&self.document_path(&triple)?).await?;
        debug!(id = %triple, removed, "suppression");
        Ok(removed)
    }

    fn collection_policy(&self) -> CollectionPolicy {
        CollectionPolicy::AutoCreate
    }
}

#[async_trait]
impl WithCollections for FileStore {
    async fn get_collections(&self) -> StoreResult<Vec<String>> {
        fs::list_dirs(&self.root).await
    }

    async fn ensure_collection(&self, name: &str) -> StoreResult<CollectionState> {
        let dir = self.collection_path(name)?;
        if fs::is_dir(&dir).await {
            return Ok(CollectionState::Existing(self.keys(&dir).await?.len()));
        }
        fs::ensure_dir(&dir).await?;
        info!(collection = name, "collection créée");
        Ok(CollectionState::Created)
    }

    async fn empty_collection(&self, name: &str) -> StoreResult<Option<usize>> {
        let dir = self.collection_path(name)?;
        if !fs::is_dir(&dir).await {
            return Ok(None);
        }
        let mut removed = 0;
        for key in self.keys(&dir).await? {
            let file = dir.join(format!("{}.{}", key, DOC_EXTENSION));
            if fs::remove_file(&file).await? {
                removed += 1;
            }
        }
        info!(collection = name, removed, "collection vidée");
        Ok(Some(removed))
    }

    async fn destroy_collection(&self, name: &str) -> StoreResult<bool> {
        let dir = self.collection_path(name)?;
        let removed = fs::remove_dir_all(&dir).await?;
        if removed {
            info!(collection = name, "collection supprimée");
        }
        Ok(removed)
    }
}

#[async_trait]
impl WithQueries for FileStore {
    async fn fetch_all(
        &self,
        collection: &str,
        filter: Option<&FilterSpec>,
    ) -> StoreResult<Vec<Document>> {
        let dir = self.collection_path(collection)?;
        let predicate = compile_filter(filter);

        let mut out = Vec::new();
        for key in self.keys(&dir).await? {
            let file = dir.join(format!("{}.{}", key, DOC_EXTENSION));
            match fs::read_json_opt::<Document>(&file).await {
                Ok(Some(doc)) if predicate.matches_map(&doc) => out.push(doc),
                Ok(_) => {}
                Err(e) => warn!(file = ?file, error = %e, "document illisible ignoré"),
            }
        }
        debug!(collection, found = out.len(), "scan terminé");
        Ok(out)
    }
}
