// FICHIER : docstash/src/utils/fs.rs

use crate::utils::{json, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use std::io::ErrorKind;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

// --- RE-EXPORTS (Isolation de la couche OS) ---
pub use std::path::{Path, PathBuf};

/// Indique si le chemin existe (fichier ou dossier).
pub async fn exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}

/// Indique si le chemin est un fichier régulier.
pub async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

/// Indique si le chemin est un dossier.
pub async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

pub async fn ensure_dir(path: &Path) -> StoreResult<()> {
    fs::create_dir_all(path).await?;
    Ok(())
}

/// Lit un fichier JSON. `None` si le fichier n'existe pas.
#[instrument(skip(path), fields(path = ?path))]
pub async fn read_json_opt<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(json::parse(&content)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// --- ÉCRITURE ATOMIQUE ---

/// Écriture atomique (write -> sync -> rename).
/// Chaque écriture passe par son propre fichier temporaire, voisin de la cible.
#[instrument(skip(content, path), fields(path = ?path))]
pub async fn write_atomic(path: &Path, content: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let tmp_path = temp_sibling(path);
    {
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(content).await?;
        file.flush().await?;
        file.sync_all().await?;
    }

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    Ok(())
}

/// `{nom}.{suffixe aléatoire}.tmp` dans le dossier de `path`.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}.{:016x}.tmp", name, rand::random::<u64>()))
}

pub async fn write_json_atomic<T: Serialize>(path: &Path, data: &T) -> StoreResult<()> {
    let content = json::stringify_pretty(data)?;
    write_atomic(path, content.as_bytes()).await
}

/// Supprime un fichier. `false` s'il n'existait pas.
pub async fn remove_file(path: &Path) -> StoreResult<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Supprime un dossier et son contenu. `false` s'il n'existait pas.
pub async fn remove_dir_all(path: &Path) -> StoreResult<bool> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Liste les noms des sous-dossiers directs, triés.
pub async fn list_dirs(root: &Path) -> StoreResult<Vec<String>> {
    let mut out = Vec::new();
    let mut entries = match fs::read_dir(root).await {
        Ok(e) => e,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            if let Ok(name) = entry.file_name().into_string() {
                out.push(name);
            }
        }
    }
    out.sort();
    Ok(out)
}

/// Liste les stems des fichiers `*.{ext}` d'un dossier, triés.
/// Les autres extensions (dont `.tmp`) sont ignorées.
pub async fn list_file_stems(dir: &Path, ext: &str) -> StoreResult<Vec<String>> {
    let mut out = Vec::new();
    let mut entries = match fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        let p = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if p.extension().and_then(|s| s.to_str()) != Some(ext) {
            continue;
        }
        if let Some(stem) = p.file_stem().and_then(|s| s.to_str()) {
            out.push(stem.to_string());
        }
    }
    out.sort();
    Ok(out)
}
