// ABOUTME: Override store abstraction and its file and memory implementations
// ABOUTME: Loads and saves the override map the template registry reports after each change

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::error::{PersistenceError, Result};
use super::json;
use crate::registry::OverrideMap;

/// Durable home of the override map.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    async fn load(&self) -> Result<OverrideMap>;

    async fn save(&self, overrides: &OverrideMap) -> Result<()>;
}

/// Overrides kept as a pretty-printed JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OverrideStore for JsonFileStore {
    async fn load(&self) -> Result<OverrideMap> {
        if !fs::try_exists(&self.path)
            .await
            .map_err(|source| PersistenceError::Io {
                path: self.path.clone(),
                source,
            })?
        {
            debug!("No override file at {}, starting empty", self.path.display());
            return Ok(OverrideMap::new());
        }

        json::read_json(&self.path).await
    }

    async fn save(&self, overrides: &OverrideMap) -> Result<()> {
        json::write_json(&self.path, overrides).await?;
        debug!(
            "Saved {} overrides to {}",
            overrides.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// In-process store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    overrides: Mutex<OverrideMap>,
}

impl MemoryStore {
    pub fn new(overrides: OverrideMap) -> Self {
        Self {
            overrides: Mutex::new(overrides),
        }
    }
}

#[async_trait]
impl OverrideStore for MemoryStore {
    async fn load(&self) -> Result<OverrideMap> {
        Ok(self.overrides.lock().await.clone())
    }

    async fn save(&self, overrides: &OverrideMap) -> Result<()> {
        *self.overrides.lock().await = overrides.clone();
        Ok(())
    }
}
