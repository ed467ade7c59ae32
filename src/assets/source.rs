use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::store::normalize_rel_path;
use crate::foundation::error::{DrapeError, DrapeResult};

/// Byte source for garment, design, and element images.
///
/// Hosts with network access implement this over their HTTP client; the engine itself never
/// performs IO outside an `AssetSource`.
pub trait AssetSource {
    fn fetch(&self, url: &str) -> DrapeResult<Vec<u8>>;
}

/// In-memory source keyed by exact URL.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(url.into(), bytes);
    }

    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }
}

impl AssetSource for MemoryAssetSource {
    fn fetch(&self, url: &str) -> DrapeResult<Vec<u8>> {
        self.entries
            .get(url)
            .cloned()
            .ok_or_else(|| DrapeError::asset_load(url, "not found"))
    }
}

/// Resolves relative URLs (optionally `file://`-prefixed) under a root directory.
#[derive(Clone, Debug)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, url: &str) -> DrapeResult<PathBuf> {
        let rel = url.strip_prefix("file://").unwrap_or(url);
        let norm = normalize_rel_path(rel)?;
        Ok(self.root.join(norm))
    }
}

impl AssetSource for DirAssetSource {
    fn fetch(&self, url: &str) -> DrapeResult<Vec<u8>> {
        let path = self.resolve(url)?;
        std::fs::read(&path)
            .with_context(|| format!("read asset '{}'", path.display()))
            .map_err(|e| DrapeError::asset_load(url, format!("{e:#}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
