use std::collections::{BTreeMap, BTreeSet};

use crate::cache::signature::Signature;
use crate::foundation::core::{Rgb8, ViewId};
use crate::persist::SnapshotRef;

/// Identity of one rendered preview.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub view: ViewId,
    /// Garment colour; `None` is the untinted photo.
    pub color: Option<Rgb8>,
    pub design: Signature,
    pub settings: Signature,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheDecision {
    /// Show this snapshot instead of rendering.
    Cached(SnapshotRef),
    /// Drive the live pipeline.
    Live,
}

/// Tracks persisted previews and which views they no longer describe.
///
/// Colour changes dirty every view but never trigger a capture on their own; design changes dirty
/// one view and do. Snapshots are a display shortcut only, never design state.
#[derive(Clone, Debug, Default)]
pub struct PreviewCacheManager {
    entries: BTreeMap<CacheKey, SnapshotRef>,
    color_dirty: BTreeSet<ViewId>,
    design_dirty: BTreeSet<ViewId>,
}

impl PreviewCacheManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_color_changed<'a>(&mut self, views: impl IntoIterator<Item = &'a ViewId>) {
        for v in views {
            self.color_dirty.insert(v.clone());
        }
    }

    pub fn mark_design_changed(&mut self, view: &ViewId) {
        self.design_dirty.insert(view.clone());
    }

    pub fn is_color_dirty(&self, view: &ViewId) -> bool {
        self.color_dirty.contains(view)
    }

    pub fn is_design_dirty(&self, view: &ViewId) -> bool {
        self.design_dirty.contains(view)
    }

    /// Views an explicit save has to capture.
    pub fn dirty_views(&self) -> BTreeSet<ViewId> {
        self.color_dirty.union(&self.design_dirty).cloned().collect()
    }

    /// Dirty views always render live; clean views reuse a snapshot taken under the same key.
    pub fn decide(&self, key: &CacheKey) -> CacheDecision {
        let view = &key.view;
        let decision = if self.is_color_dirty(view) || self.is_design_dirty(view) {
            CacheDecision::Live
        } else {
            match self.entries.get(key) {
                Some(snap) => CacheDecision::Cached(snap.clone()),
                None => CacheDecision::Live,
            }
        };
        tracing::debug!(
            view = %view,
            design = %key.design,
            cached = matches!(decision, CacheDecision::Cached(_)),
            "preview cache decision"
        );
        decision
    }

    pub fn should_auto_persist(&self, view: &ViewId) -> bool {
        self.is_design_dirty(view)
    }

    /// A snapshot for `key` was persisted; the view is clean under that key.
    pub fn record_capture(&mut self, key: CacheKey, snapshot: SnapshotRef) {
        self.color_dirty.remove(&key.view);
        self.design_dirty.remove(&key.view);
        self.entries.insert(key, snapshot);
    }

    /// Explicit save of a view that needed no new capture.
    pub fn mark_saved(&mut self, view: &ViewId) {
        self.color_dirty.remove(view);
        self.design_dirty.remove(view);
    }

    pub fn snapshot_for(&self, key: &CacheKey) -> Option<&SnapshotRef> {
        self.entries.get(key)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/manager.rs"]
mod tests;
