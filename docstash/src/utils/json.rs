// FICHIER : docstash/src/utils/json.rs

use crate::utils::StoreResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

// --- RE-EXPORTS (Single Source of Truth pour le JSON) ---
pub use serde_json::{json, Map, Value};

/// Parse une chaîne JSON en un type T.
/// Journalise un extrait du contenu en cas d'échec.
pub fn parse<T: DeserializeOwned>(s: &str) -> StoreResult<T> {
    serde_json::from_str(s).map_err(|e| {
        let snippet: String = s.chars().take(100).collect();
        warn!(error = %e, snippet = %snippet, "JSON illisible");
        e.into()
    })
}

/// Convertit un type T en chaîne JSON formatée (pretty).
pub fn stringify_pretty<T: Serialize>(v: &T) -> StoreResult<String> {
    Ok(serde_json::to_string_pretty(v)?)
}

/// Fusionne récursivement deux objets JSON (Deep Merge).
/// L'objet `b` écrase les valeurs de `a` en cas de conflit.
pub fn merge(a: &mut Value, b: Value) {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            for (k, v) in b {
                merge(a.entry(k).or_insert(Value::Null), v);
            }
        }
        (a, b) => *a = b,
    }
}

/// Variante de [`merge`] au niveau d'une map (document complet).
pub fn merge_map(a: &mut Map<String, Value>, b: Map<String, Value>) {
    for (k, v) in b {
        merge(a.entry(k).or_insert(Value::Null), v);
    }
}
