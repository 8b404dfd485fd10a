// FICHIER : docstash/src/storage/remote/arango.rs

//! Driver HTTP pour ArangoDB (API REST `/_db/{db}/_api/...`).

use crate::storage::remote::{CollectionKind, CreateCollectionOptions, DocumentDriver};
use crate::storage::{Document, OverwriteMode};
use crate::utils::config::{ArangoConfig, SYSTEM_DB};
use crate::utils::json;
use crate::utils::prelude::*;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

const SCAN_QUERY: &str = "FOR d IN @@col RETURN d";
const SCAN_BATCH_SIZE: usize = 1000;

// --- RÉPONSES DE L'API ---

#[derive(Debug, Deserialize)]
struct CollectionList {
    result: Vec<CollectionInfo>,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: usize,
}

#[derive(Debug, Deserialize)]
struct DatabaseList {
    result: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CursorResponse {
    #[serde(default)]
    result: Vec<Document>,
    #[serde(default)]
    has_more: bool,
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_message: Option<String>,
}

/// Connexion explicite à une base ArangoDB.
#[derive(Debug, Clone)]
pub struct ArangoDriver {
    client: Client,
    base: Url,
    database: String,
    username: String,
    password: Option<String>,
}

impl ArangoDriver {
    /// Prépare le client sans contacter le serveur.
    pub fn new(config: &ArangoConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("docstash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base: config.base_url()?,
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Comme [`ArangoDriver::new`], puis crée la base cible via `_system`
    /// si elle n'existe pas encore.
    #[instrument(skip(config), fields(database = %config.database))]
    pub async fn connect(config: &ArangoConfig) -> StoreResult<Self> {
        let driver = Self::new(config)?;
        if driver.database != SYSTEM_DB {
            driver.ensure_database().await?;
        }
        Ok(driver)
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    async fn ensure_database(&self) -> StoreResult<()> {
        let url = self.url_in(SYSTEM_DB, &["database"])?;
        let resp = self.send(self.request(Method::GET, url)).await?;
        let existing: DatabaseList = read_json(expect_success(resp).await?).await?;
        if existing.result.iter().any(|name| name == &self.database) {
            return Ok(());
        }

        let url = self.url_in(SYSTEM_DB, &["database"])?;
        let body = json!({ "name": self.database });
        let resp = self.send(self.request(Method::POST, url).json(&body)).await?;
        expect_success(resp).await?;
        info!(database = %self.database, "base ArangoDB créée");
        Ok(())
    }

    // --- CONSTRUCTION DES REQUÊTES ---

    /// `{base}/_db/{db}/_api/{parts...}`, segments encodés.
    fn url_in(&self, db: &str, parts: &[&str]) -> StoreResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Config(format!("URL de base inutilisable : {}", self.base)))?
            .pop_if_empty()
            .extend(["_db", db, "_api"])
            .extend(parts);
        Ok(url)
    }

    fn url(&self, parts: &[&str]) -> StoreResult<Url> {
        self.url_in(&self.database, parts)
    }

    fn save_url(&self, collection: &str, mode: OverwriteMode) -> StoreResult<Url> {
        let mut url = self.url(&["document", collection])?;
        url.query_pairs_mut()
            .append_pair("overwriteMode", mode.as_str());
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.username, self.password.as_deref())
    }

    async fn send(&self, builder: RequestBuilder) -> StoreResult<Response> {
        let resp = builder.send().await?;
        debug!(status = resp.status().as_u16(), url = %resp.url(), "réponse ArangoDB");
        Ok(resp)
    }
}

/// Les statuts non 2xx deviennent `StoreError::Backend`.
async fn expect_success(resp: Response) -> StoreResult<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    Err(backend_error(resp).await)
}

/// Décode un corps 2xx. Un corps illisible est une `StoreError::Serialization`.
async fn read_json<T: DeserializeOwned>(resp: Response) -> StoreResult<T> {
    let text = resp.text().await?;
    json::parse(&text)
}

async fn backend_error(resp: Response) -> StoreError {
    let status = resp.status();
    let body: ErrorBody = resp.json().await.unwrap_or_default();
    let message = body
        .error_message
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("erreur inconnue").to_string());
    warn!(status = status.as_u16(), %message, "erreur ArangoDB");
    StoreError::Backend {
        status: status.as_u16(),
        message,
    }
}

fn collection_type(kind: CollectionKind) -> u8 {
    match kind {
        CollectionKind::Document => 2,
        CollectionKind::Edge => 3,
    }
}

#[async_trait]
impl DocumentDriver for ArangoDriver {
    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        let mut url = self.url(&["collection"])?;
        url.query_pairs_mut().append_pair("excludeSystem", "true");
        let resp = self.send(self.request(Method::GET, url)).await?;
        let list: CollectionList = read_json(expect_success(resp).await?).await?;
        Ok(list.result.into_iter().map(|c| c.name).collect())
    }

    async fn collection_exists(&self, name: &str) -> StoreResult<bool> {
        let url = self.url(&["collection", name])?;
        let resp = self.send(self.request(Method::GET, url)).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => expect_success(resp).await.map(|_| true),
        }
    }

    async fn create_collection(&self, name: &str, opts: &CreateCollectionOptions) -> StoreResult<()> {
        let url = self.url(&["collection"])?;
        let body = json!({ "name": name, "type": collection_type(opts.kind) });
        let resp = self.send(self.request(Method::POST, url).json(&body)).await?;
        expect_success(resp).await?;
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        let url = self.url(&["collection", name])?;
        let resp = self.send(self.request(Method::DELETE, url)).await?;
        expect_success(resp).await?;
        Ok(())
    }

    async fn count(&self, name: &str) -> StoreResult<usize> {
        let url = self.url(&["collection", name, "count"])?;
        let resp = self.send(self.request(Method::GET, url)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::CollectionNotFound(name.to_string()));
        }
        let count: CountResponse = read_json(expect_success(resp).await?).await?;
        Ok(count.count)
    }

    async fn truncate(&self, name: &str) -> StoreResult<()> {
        let url = self.url(&["collection", name, "truncate"])?;
        let resp = self.send(self.request(Method::PUT, url)).await?;
        expect_success(resp).await?;
        Ok(())
    }

    async fn document_exists(&self, collection: &str, key: &str) -> StoreResult<bool> {
        let url = self.url(&["document", collection, key])?;
        let resp = self.send(self.request(Method::HEAD, url)).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => expect_success(resp).await.map(|_| true),
        }
    }

    async fn document(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        let url = self.url(&["document", collection, key])?;
        let resp = self.send(self.request(Method::GET, url)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(read_json(expect_success(resp).await?).await?))
    }

    async fn save_document(
        &self,
        collection: &str,
        doc: &Document,
        mode: OverwriteMode,
    ) -> StoreResult<()> {
        let url = self.save_url(collection, mode)?;
        let resp = self.send(self.request(Method::POST, url).json(doc)).await?;
        match resp.status() {
            StatusCode::CONFLICT => {
                let id = doc
                    .get(crate::identity::ID_FIELD)
                    .and_then(Value::as_str)
                    .unwrap_or(collection);
                Err(StoreError::DocumentExists(id.to_string()))
            }
            StatusCode::NOT_FOUND => Err(StoreError::CollectionNotFound(collection.to_string())),
            _ => expect_success(resp).await.map(|_| ()),
        }
    }

    async fn remove_document(&self, collection: &str, key: &str) -> StoreResult<bool> {
        let url = self.url(&["document", collection, key])?;
        let resp = self.send(self.request(Method::DELETE, url)).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => expect_success(resp).await.map(|_| true),
        }
    }

    async fn scan(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let url = self.url(&["cursor"])?;
        let body = json!({
            "query": SCAN_QUERY,
            "bindVars": { "@col": collection },
            "batchSize": SCAN_BATCH_SIZE,
        });
        let resp = self.send(self.request(Method::POST, url).json(&body)).await?;
        let mut page: CursorResponse = read_json(expect_success(resp).await?).await?;

        let mut docs = std::mem::take(&mut page.result);
        while page.has_more {
            let Some(cursor_id) = page.id.clone() else {
                break;
            };
            let url = self.url(&["cursor", &cursor_id])?;
            let resp = self.send(self.request(Method::PUT, url)).await?;
            page = read_json(expect_success(resp).await?).await?;
            docs.append(&mut page.result);
        }
        debug!(collection, count = docs.len(), "scan ArangoDB");
        Ok(docs)
    }
}
