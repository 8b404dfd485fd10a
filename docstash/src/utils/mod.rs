// FICHIER : docstash/src/utils/mod.rs

// =========================================================================
//  DOCSTASH UTILS - Foundation Layer
// =========================================================================

pub mod config;
pub mod env;
pub mod error;
pub mod fs;
pub mod json;
pub mod logger;

// --- FAÇADES SÉMANTIQUES ---

/// **Data Abstraction** : Manipulation JSON.
pub mod data {
    pub use super::json::{json, merge, merge_map, parse, stringify_pretty, Map, Value};
    pub use serde::{Deserialize, Serialize};
}

/// **Le Prélude** : À utiliser via `use crate::utils::prelude::*;`
pub mod prelude {
    pub use super::data::{json, Deserialize, Map, Serialize, Value};
    pub use super::error::{StoreError, StoreResult};
    pub use async_trait::async_trait;
    pub use tracing::{debug, info, instrument, warn};
}

// --> Config & Erreurs
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use logger::init_logging;
