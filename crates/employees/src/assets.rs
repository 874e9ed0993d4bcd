//! Photo storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset name '{0}' is not a plain file name")]
    InvalidName(String),

    #[error("asset io: {0}")]
    Io(#[from] std::io::Error),

    #[error("asset store lock poisoned")]
    Poisoned,
}

/// Named blob storage for employee photos.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn write(&self, name: &str, bytes: Vec<u8>) -> Result<(), AssetError>;

    /// Deleting a missing asset is not an error.
    async fn delete(&self, name: &str) -> Result<(), AssetError>;
}

fn check_name(name: &str) -> Result<(), AssetError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some_and(|f| f == name);
    if plain { Ok(()) } else { Err(AssetError::InvalidName(name.to_string())) }
}

/// Files under a single directory (e.g. `wwwroot/images`).
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn write(&self, name: &str, bytes: Vec<u8>) -> Result<(), AssetError> {
        check_name(name)?;
        fs::write(self.root.join(name), bytes).await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), AssetError> {
        check_name(name)?;
        match fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAssetStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.blobs.read().ok()?.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.blobs.read().map(|b| b.keys().cloned().collect()).unwrap_or_default();
        names.sort();
        names
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn write(&self, name: &str, bytes: Vec<u8>) -> Result<(), AssetError> {
        check_name(name)?;
        self.blobs.write().map_err(|_| AssetError::Poisoned)?.insert(name.to_string(), bytes);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), AssetError> {
        check_name(name)?;
        self.blobs.write().map_err(|_| AssetError::Poisoned)?.remove(name);
        Ok(())
    }
}
