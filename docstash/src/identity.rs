// FICHIER : docstash/src/identity.rs

//! Résolution d'identité : tout sélecteur (chaîne `collection/clé`, objet
//! partiel ou document complet) est normalisé en un triplet
//! `{collection, key, id}` avec `id == collection + "/" + key`.

use crate::utils::prelude::*;
use rand::prelude::*;
use std::fmt;

pub const COLLECTION_FIELD: &str = "_collection";
pub const KEY_FIELD: &str = "_key";
pub const ID_FIELD: &str = "_id";

/// Longueur des clés générées.
pub const KEY_LENGTH: usize = 16;

/// Alphabet sans caractères ambigus (pas de 0/O, 1/l/I, 2/Z, 5/S...).
pub const KEY_ALPHABET: &[u8] = b"346789ABCDEFGHJKLMNPQRTUVWXYabcdefghijkmnpqrtwxyz";

const KEY_PUNCTUATION: &str = "_-:.@()+,=;$!*'%";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityTriple {
    #[serde(rename = "_collection")]
    pub collection: String,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_id")]
    pub id: String,
}

impl IdentityTriple {
    fn new(collection: &str, key: String) -> Self {
        Self {
            id: format!("{}/{}", collection, key),
            collection: collection.to_string(),
            key,
        }
    }

    /// Vérifie les jeux de caractères stricts (collection `[A-Za-z0-9_-]`,
    /// clé `[A-Za-z0-9_\-:.@()+,=;$!*'%]`, ni `.` ni `..`).
    pub fn is_path_safe(&self) -> bool {
        let key_ok = !self.key.is_empty()
            && self.key != "."
            && self.key != ".."
            && self
                .key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || KEY_PUNCTUATION.contains(c));
        is_safe_collection(&self.collection) && key_ok
    }

    /// Écrit `_collection`, `_key` et `_id` dans le document.
    pub fn stamp(&self, doc: &mut Map<String, Value>) {
        doc.insert(COLLECTION_FIELD.to_string(), Value::String(self.collection.clone()));
        doc.insert(KEY_FIELD.to_string(), Value::String(self.key.clone()));
        doc.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
    }
}

impl fmt::Display for IdentityTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Toute entrée à partir de laquelle un triplet peut être résolu.
#[derive(Debug, Clone, Copy)]
pub enum Selector<'a> {
    /// `"collection/clé"` ou `"collection"` seule.
    Path(&'a str),
    /// Objet portant `_id`, ou `_collection` et éventuellement `_key`.
    Fields(&'a Map<String, Value>),
    Triple(&'a IdentityTriple),
    /// Valeur JSON ni chaîne ni objet : toujours invalide.
    Unsupported(&'a Value),
}

impl Selector<'_> {
    pub fn resolve(&self) -> StoreResult<IdentityTriple> {
        resolve(self)
    }
}

impl<'a> From<&'a str> for Selector<'a> {
    fn from(s: &'a str) -> Self {
        Selector::Path(s)
    }
}

impl<'a> From<&'a String> for Selector<'a> {
    fn from(s: &'a String) -> Self {
        Selector::Path(s.as_str())
    }
}

impl<'a> From<&'a Map<String, Value>> for Selector<'a> {
    fn from(m: &'a Map<String, Value>) -> Self {
        Selector::Fields(m)
    }
}

impl<'a> From<&'a IdentityTriple> for Selector<'a> {
    fn from(t: &'a IdentityTriple) -> Self {
        Selector::Triple(t)
    }
}

impl<'a> From<&'a Value> for Selector<'a> {
    fn from(v: &'a Value) -> Self {
        match v {
            Value::String(s) => Selector::Path(s),
            Value::Object(m) => Selector::Fields(m),
            other => Selector::Unsupported(other),
        }
    }
}

/// Normalise un sélecteur en triplet d'identité.
///
/// Seule erreur possible : `InvalidSelector` quand aucune collection ne peut
/// être déterminée ou que `_key` n'est ni une chaîne ni un nombre. Une clé
/// absente ou vide est générée aléatoirement.
pub fn resolve(selector: &Selector<'_>) -> StoreResult<IdentityTriple> {
    let (collection, key) = match selector {
        Selector::Path(s) => split_id(s),
        Selector::Triple(t) => (Some(t.collection.as_str()), Some(t.key.clone())),
        Selector::Fields(map) => match map.get(ID_FIELD) {
            // `_id` fait autorité sur `_collection`/`_key`
            Some(Value::String(id)) => split_id(id),
            Some(_) => (None, None),
            None => (
                map.get(COLLECTION_FIELD).and_then(Value::as_str),
                key_field(map.get(KEY_FIELD))?,
            ),
        },
        Selector::Unsupported(v) => {
            return Err(StoreError::invalid_selector(format!(
                "un sélecteur doit être une chaîne ou un objet, reçu : {}",
                v
            )))
        }
    };

    let collection = match collection {
        Some(c) if !c.is_empty() && !c.contains('/') => c,
        Some(c) if c.contains('/') => {
            return Err(StoreError::invalid_selector(format!(
                "la collection ne peut pas contenir '/' : {}",
                c
            )))
        }
        _ => return Err(StoreError::invalid_selector("collection indéterminée")),
    };

    let key = match key {
        Some(k) if !k.is_empty() => k,
        _ => generate_key(),
    };

    Ok(IdentityTriple::new(collection, key))
}

/// Nom de collection utilisable tel quel comme nom de dossier.
pub fn is_safe_collection(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Génère une clé de [`KEY_LENGTH`] caractères tirés de [`KEY_ALPHABET`].
pub fn generate_key() -> String {
    let mut rng = rand::rng();
    (0..KEY_LENGTH)
        .map(|_| KEY_ALPHABET[rng.random_range(0..KEY_ALPHABET.len())] as char)
        .collect()
}

fn split_id(s: &str) -> (Option<&str>, Option<String>) {
    match s.split_once('/') {
        Some((collection, key)) => (Some(collection), Some(key.to_string())),
        None => (Some(s), None),
    }
}

/// Un `_key` numérique prend sa forme décimale ; `null` vaut absence.
fn key_field(value: Option<&Value>) -> StoreResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(k)) => Ok(Some(k.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(StoreError::invalid_selector(format!(
            "`_key` doit être une chaîne ou un nombre, reçu : {}",
            other
        ))),
    }
}
