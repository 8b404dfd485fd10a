// FICHIER : docstash/src/utils/logger.rs

use crate::utils::config::StoreConfig;
use std::sync::Once;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Sécurité pour éviter la double initialisation (crash fréquent en tests)
static INIT: Once = Once::new();

/// Installe le subscriber global une seule fois.
///
/// Console compacte filtrée par `RUST_LOG` (sinon `config.log_level`), plus une
/// couche fichier JSON quotidienne quand `config.log_dir` est renseigné.
pub fn init_logging(config: &StoreConfig) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

        let console_layer = fmt::layer()
            .compact()
            .with_target(false)
            .with_filter(env_filter);

        let file_layer = config.log_dir.as_ref().and_then(|dir| {
            if let Err(e) = std::fs::create_dir_all(dir) {
                eprintln!("⚠️ [Logger] Dossier de logs inutilisable {:?} : {}", dir, e);
                return None;
            }
            let appender = rolling::daily(dir, "docstash.log");
            Some(
                fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
        });

        let registry = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        if registry.try_init().is_err() {
            tracing::warn!("[Logger] Ré-initialisation ignorée (subscriber global déjà actif).");
            return;
        }

        tracing::info!(log_dir = ?config.log_dir, "Logger initialisé");
    });
}
