use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::math::Fnv1a64;

/// What an asset is used for. Garments and designs decode differently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    Garment,
    Design,
}

impl AssetKind {
    fn tag(self) -> u8 {
        match self {
            AssetKind::Garment => 0,
            AssetKind::Design => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Stable hashed identifier of a `(kind, url)` pair.
pub struct AssetId(pub(crate) u64);

impl AssetId {
    pub fn for_url(kind: AssetKind, url: &str) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_u8(kind.tag());
        h.write_str(url);
        Self(h.finish())
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Load state of one asset.
#[derive(Clone, Debug)]
pub enum AssetState {
    /// A load has been issued and not yet completed.
    Pending,
    Ready(Arc<PreparedImage>),
    /// The load failed; the slot stays empty until the asset is requested again.
    Failed(String),
}

/// Decoded images keyed by source URL.
///
/// Renderers only read from the store; all fetching and decoding happens at the load boundary.
#[derive(Clone, Debug, Default)]
pub struct AssetStore {
    states: HashMap<AssetId, AssetState>,
    urls: HashMap<AssetId, String>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, kind: AssetKind, url: &str) -> Option<&AssetState> {
        self.states.get(&AssetId::for_url(kind, url))
    }

    pub fn image(&self, kind: AssetKind, url: &str) -> Option<&Arc<PreparedImage>> {
        match self.state(kind, url) {
            Some(AssetState::Ready(img)) => Some(img),
            _ => None,
        }
    }

    /// Whether a load for this asset is worth issuing.
    pub fn needs_load(&self, kind: AssetKind, url: &str) -> bool {
        self.state(kind, url).is_none()
    }

    pub fn mark_pending(&mut self, kind: AssetKind, url: &str) -> AssetId {
        let id = AssetId::for_url(kind, url);
        self.states.insert(id, AssetState::Pending);
        self.urls.insert(id, url.to_string());
        id
    }

    pub fn insert_ready(&mut self, kind: AssetKind, url: &str, image: PreparedImage) -> AssetId {
        let id = AssetId::for_url(kind, url);
        self.states.insert(id, AssetState::Ready(Arc::new(image)));
        self.urls.insert(id, url.to_string());
        id
    }

    pub fn insert_failed(&mut self, kind: AssetKind, url: &str, reason: impl Into<String>) {
        let id = AssetId::for_url(kind, url);
        self.states.insert(id, AssetState::Failed(reason.into()));
        self.urls.insert(id, url.to_string());
    }

    /// Forget an asset so a later request reloads it.
    pub fn release(&mut self, kind: AssetKind, url: &str) -> bool {
        let id = AssetId::for_url(kind, url);
        self.urls.remove(&id);
        self.states.remove(&id).is_some()
    }

    /// Drop pending markers whose loads were cancelled.
    pub fn clear_pending(&mut self) {
        let stale: Vec<AssetId> = self
            .states
            .iter()
            .filter(|(_, s)| matches!(s, AssetState::Pending))
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            self.states.remove(&id);
            self.urls.remove(&id);
        }
    }

    pub fn failure(&self, kind: AssetKind, url: &str) -> Option<DrapeError> {
        match self.state(kind, url) {
            Some(AssetState::Failed(reason)) => Some(DrapeError::asset_load(url, reason.clone())),
            _ => None,
        }
    }

    pub fn ready_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| matches!(s, AssetState::Ready(_)))
            .count()
    }

    pub fn url_of(&self, id: AssetId) -> Option<&str> {
        self.urls.get(&id).map(String::as_str)
    }
}

/// Normalize and validate a store-relative asset path.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> DrapeResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(DrapeError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(DrapeError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(DrapeError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(DrapeError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
