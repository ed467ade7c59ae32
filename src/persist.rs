//! Persistence boundary: per-view PNG snapshots and the serialized design.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::assets::store::normalize_rel_path;
use crate::foundation::core::ViewId;
use crate::foundation::error::{DrapeError, DrapeResult};

/// Where a stored snapshot ended up.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SnapshotRef {
    pub view: ViewId,
    pub location: String,
    /// Increases with every store for the same view.
    pub revision: u64,
}

/// Receives snapshots and design JSON. Every failure is reported as [`DrapeError::Persist`].
pub trait PersistenceSink {
    fn store_snapshot(&mut self, view: &ViewId, png: &[u8]) -> DrapeResult<SnapshotRef>;

    fn store_design(&mut self, json: &str) -> DrapeResult<()>;
}

/// Keeps everything in memory. Can be told to fail to exercise retry paths.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    snapshots: BTreeMap<ViewId, (u64, Vec<u8>)>,
    design: Option<String>,
    failing: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every store returns a persist error.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn snapshot(&self, view: &ViewId) -> Option<&[u8]> {
        self.snapshots.get(view).map(|(_, png)| png.as_slice())
    }

    pub fn snapshot_revision(&self, view: &ViewId) -> u64 {
        self.snapshots.get(view).map_or(0, |(rev, _)| *rev)
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    pub fn design(&self) -> Option<&str> {
        self.design.as_deref()
    }
}

impl PersistenceSink for MemorySink {
    fn store_snapshot(&mut self, view: &ViewId, png: &[u8]) -> DrapeResult<SnapshotRef> {
        if self.failing {
            return Err(DrapeError::persist(format!("snapshot upload for '{view}' failed")));
        }
        let entry = self.snapshots.entry(view.clone()).or_default();
        entry.0 += 1;
        entry.1 = png.to_vec();
        Ok(SnapshotRef {
            view: view.clone(),
            location: format!("memory://{view}.png"),
            revision: entry.0,
        })
    }

    fn store_design(&mut self, json: &str) -> DrapeResult<()> {
        if self.failing {
            return Err(DrapeError::persist("design upload failed"));
        }
        self.design = Some(json.to_string());
        Ok(())
    }
}

/// Writes `<view>.png` and `design.json` under a directory.
#[derive(Clone, Debug)]
pub struct DirSink {
    root: PathBuf,
    revisions: BTreeMap<ViewId, u64>,
}

pub const DESIGN_FILE: &str = "design.json";

impl DirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            revisions: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self, view: &ViewId) -> DrapeResult<PathBuf> {
        let rel = normalize_rel_path(&format!("{view}.png"))
            .map_err(|e| DrapeError::persist(format!("view key '{view}': {e}")))?;
        Ok(self.root.join(rel))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> DrapeResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DrapeError::persist(format!(
                    "failed to create snapshot directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
        std::fs::write(path, bytes).map_err(|e| {
            DrapeError::persist(format!("failed to write '{}': {e}", path.display()))
        })
    }
}

impl PersistenceSink for DirSink {
    fn store_snapshot(&mut self, view: &ViewId, png: &[u8]) -> DrapeResult<SnapshotRef> {
        let path = self.snapshot_path(view)?;
        self.write(&path, png)?;
        let rev = self.revisions.entry(view.clone()).or_default();
        *rev += 1;
        Ok(SnapshotRef {
            view: view.clone(),
            location: path.display().to_string(),
            revision: *rev,
        })
    }

    fn store_design(&mut self, json: &str) -> DrapeResult<()> {
        let path = self.root.join(DESIGN_FILE);
        self.write(&path, json.as_bytes())
    }
}

#[cfg(test)]
#[path = "../tests/unit/persist.rs"]
mod tests;
