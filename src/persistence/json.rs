// ABOUTME: JSON file helpers shared by the persistence layer
// ABOUTME: Reads and writes backend-info sets, KVM collections and other JSON documents

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tokio::fs;

use super::error::{PersistenceError, Result};
use crate::kvm::{BackendInfoSet, Kvm};

/// KVMs of every environment, keyed by environment name
pub type EnvironmentKvms = IndexMap<String, Vec<Kvm>>;

pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| PersistenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    fs::write(path, content)
        .await
        .map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Load backend-info entries, either a bare array or a set with its high-water mark
pub async fn load_backend_info(path: &Path) -> Result<BackendInfoSet> {
    read_json(path).await
}

pub async fn save_backend_info(path: &Path, set: &BackendInfoSet) -> Result<()> {
    write_json(path, set).await
}

/// Load a KVM collection; a missing file is an empty collection
pub async fn load_kvms(path: &Path) -> Result<EnvironmentKvms> {
    let exists = fs::try_exists(path)
        .await
        .map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    if exists {
        read_json(path).await
    } else {
        Ok(EnvironmentKvms::new())
    }
}

pub async fn save_kvms(path: &Path, kvms: &EnvironmentKvms) -> Result<()> {
    write_json(path, kvms).await
}
