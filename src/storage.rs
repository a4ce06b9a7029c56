use crate::errors::AppError;
use crate::models::MetricsStore;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

pub async fn load_store(path: &Path) -> MetricsStore {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<MetricsStore>(&bytes) {
            Ok(store) => {
                info!(sites = store.sites.len(), "loaded metrics store");
                store
            }
            Err(err) => {
                error!("failed to parse metrics store: {err}");
                MetricsStore::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => MetricsStore::default(),
        Err(err) => {
            error!("failed to read metrics store: {err}");
            MetricsStore::default()
        }
    }
}

pub async fn persist_store(path: &Path, store: &MetricsStore) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(store)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    let staging = staging_path(path);
    fs::write(&staging, payload).await?;
    if let Err(err) = fs::rename(&staging, path).await {
        let _ = fs::remove_file(&staging).await;
        return Err(err.into());
    }
    Ok(())
}

// Sibling of the store file, so the rename stays on one filesystem.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("metrics.json"));
    name.push(".tmp");
    path.with_file_name(name)
}
