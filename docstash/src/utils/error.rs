// FICHIER : docstash/src/utils/error.rs

use serde::Serialize;
use std::io;

/// Type de résultat standard de la couche de stockage.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Enumération centrale des erreurs de stockage.
///
/// Un document absent n'est PAS une erreur : `fetch`/`has`/`delete` le
/// signalent par une valeur (`None` / `false`). De même, une comparaison de
/// types incompatibles dans un filtre fait simplement échouer la clause.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Sélecteur invalide : {0}")]
    InvalidSelector(String),

    #[error("Identifiant non sûr pour le stockage : {0}")]
    UnsafeIdentifier(String),

    #[error("Le document existe déjà : {0}")]
    DocumentExists(String),

    #[error("Collection introuvable : {0}")]
    CollectionNotFound(String),

    #[error("Backend indisponible : {0}")]
    BackendUnavailable(#[from] reqwest::Error),

    #[error("Erreur backend (HTTP {status}) : {message}")]
    Backend { status: u16, message: String },

    #[error("Erreur de configuration : {0}")]
    Config(String),

    #[error("Erreur d'entrée/sortie : {0}")]
    Io(#[from] io::Error),

    #[error("Erreur de sérialisation : {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn invalid_selector(reason: impl Into<String>) -> Self {
        StoreError::InvalidSelector(reason.into())
    }
}

// Les hôtes qui renvoient les erreurs en JSON (IPC, HTTP) n'ont besoin que du message.
impl Serialize for StoreError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
