// FICHIER : docstash/src/utils/config.rs

use crate::utils::{env, json, StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_ARANGO_URL: &str = "http://127.0.0.1:8529";
pub const SYSTEM_DB: &str = "_system";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Backend de stockage sélectionné par la configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    File,
    Arango,
}

impl std::str::FromStr for BackendKind {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(BackendKind::Memory),
            "file" | "fs" | "filesystem" => Ok(BackendKind::File),
            "arango" | "arangodb" | "remote" => Ok(BackendKind::Arango),
            other => Err(StoreError::Config(format!("Backend inconnu : {}", other))),
        }
    }
}

/// Paramètres de connexion au serveur ArangoDB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArangoConfig {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: Option<String>,
    /// Surcharge le port de `url` (pratique pour les conteneurs de test).
    pub port: Option<u16>,
}

impl Default for ArangoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ARANGO_URL.to_string(),
            database: SYSTEM_DB.to_string(),
            username: "root".to_string(),
            password: None,
            port: None,
        }
    }
}

impl ArangoConfig {
    /// Lit `ARANGO_URL`, `ARANGO_DATABASE`, `ARANGO_USER`, `ARANGO_PASS`, `ARANGO_PORT`.
    pub fn from_env() -> StoreResult<Self> {
        let port = match env::get_optional("ARANGO_PORT") {
            Some(_) => Some(env::get_parsed::<u16>("ARANGO_PORT")?),
            None => None,
        };
        Ok(Self {
            url: env::get_or("ARANGO_URL", DEFAULT_ARANGO_URL),
            database: env::get_or("ARANGO_DATABASE", SYSTEM_DB),
            username: env::get_or("ARANGO_USER", "root"),
            password: env::get_optional("ARANGO_PASS"),
            port,
        })
    }

    /// URL de base effective, port surchargé appliqué.
    pub fn base_url(&self) -> StoreResult<Url> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| StoreError::Config(format!("URL ArangoDB invalide '{}' : {}", self.url, e)))?;
        if let Some(port) = self.port {
            url.set_port(Some(port))
                .map_err(|_| StoreError::Config(format!("Port non applicable à {}", self.url)))?;
        }
        Ok(url)
    }
}

/// Configuration globale de la couche de stockage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Racine du `FileStore` (obligatoire pour `BackendKind::File`).
    #[serde(default)]
    pub data_root: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Dossier des journaux JSON quotidiens. Absent : console seulement.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub arango: ArangoConfig,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_root: None,
            log_level: default_log_level(),
            log_dir: None,
            arango: ArangoConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn file(data_root: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::File,
            data_root: Some(data_root.into()),
            ..Self::default()
        }
    }

    /// Construit la configuration depuis les variables `DOCSTASH_*` et `ARANGO_*`.
    pub fn from_env() -> StoreResult<Self> {
        let backend = match env::get_optional("DOCSTASH_BACKEND") {
            Some(raw) => raw.parse()?,
            None => BackendKind::default(),
        };
        Ok(Self {
            backend,
            data_root: env::get_optional("DOCSTASH_DATA_ROOT").map(PathBuf::from),
            log_level: env::get_or("DOCSTASH_LOG_LEVEL", DEFAULT_LOG_LEVEL),
            log_dir: env::get_optional("DOCSTASH_LOG_DIR").map(PathBuf::from),
            arango: ArangoConfig::from_env()?,
        })
    }

    /// Charge une configuration JSON depuis le disque.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("Lecture impossible de {:?} : {}", path, e))
        })?;
        json::parse(&content)
    }

    /// Racine du `FileStore`, exigée par le backend fichier.
    pub fn require_data_root(&self) -> StoreResult<&Path> {
        self.data_root
            .as_deref()
            .ok_or_else(|| StoreError::Config("data_root est requis pour le backend fichier".into()))
    }
}
