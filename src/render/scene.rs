use std::collections::BTreeMap;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::displacement::{DisplacementFilter, DisplacementMap, FilterRegistry, FilterToken};
use crate::foundation::core::{ElementId, PlaceholderId, Rect, ViewId};
use crate::geometry::units::{CanvasLayout, fit_garment};

/// A warped layer: a design upload or an element.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerKey {
    Design(PlaceholderId),
    Element(ElementId),
}

/// The decoded garment photo and where it sits on the canvas.
#[derive(Clone, Debug)]
pub struct GarmentSprite {
    pub url: String,
    pub image: Arc<PreparedImage>,
    pub placement: Rect,
}

/// Resources owned by one view: garment sprite, displacement filter, and layer bindings.
///
/// Teardown always runs children first: layer bindings, then the filter, then the sprite.
/// Layers hold a [`FilterToken`], never the filter itself.
#[derive(Debug)]
pub struct ViewScene {
    view: ViewId,
    garment: Option<GarmentSprite>,
    filters: FilterRegistry,
    bindings: BTreeMap<LayerKey, Option<FilterToken>>,
    rebinds: u64,
}

impl ViewScene {
    pub fn new(view: ViewId) -> Self {
        Self {
            view,
            garment: None,
            filters: FilterRegistry::new(),
            bindings: BTreeMap::new(),
            rebinds: 0,
        }
    }

    pub fn view(&self) -> &ViewId {
        &self.view
    }

    pub fn garment(&self) -> Option<&GarmentSprite> {
        self.garment.as_ref()
    }

    pub fn garment_url(&self) -> Option<&str> {
        self.garment.as_ref().map(|g| g.url.as_str())
    }

    pub fn filter(&self) -> Option<&DisplacementFilter> {
        self.filters.current()
    }

    pub fn filter_token(&self) -> Option<FilterToken> {
        self.filters.current_token()
    }

    /// Install a new garment, releasing whatever the old one owned first.
    pub fn set_garment(&mut self, url: &str, image: Arc<PreparedImage>, layout: &CanvasLayout) {
        if self.garment_url() == Some(url)
            && self
                .garment
                .as_ref()
                .is_some_and(|g| Arc::ptr_eq(&g.image, &image))
        {
            return;
        }
        self.teardown();
        let placement = fit_garment(layout, image.width, image.height);
        self.garment = Some(GarmentSprite {
            url: url.to_string(),
            image,
            placement,
        });
    }

    /// Regenerate the displacement filter when the garment or boost changed.
    ///
    /// A generation failure leaves the scene without a filter so layers draw unwarped.
    pub fn ensure_filter(&mut self, contrast_boost: f32) -> Option<FilterToken> {
        let garment = self.garment.as_ref()?;
        if self.filters.is_current_for(&garment.url, contrast_boost) {
            return self.filters.current_token();
        }
        match DisplacementMap::generate(&garment.image, garment.placement, contrast_boost) {
            Ok(map) => Some(self.filters.publish(garment.url.clone(), map)),
            Err(e) => {
                tracing::warn!(view = %self.view, error = %e, "displacement generation failed");
                self.filters.clear();
                None
            }
        }
    }

    /// Point `layer` at the current filter. Returns the token it was bound to before.
    pub fn bind(&mut self, layer: LayerKey) -> Option<FilterToken> {
        let token = self.filters.current_token();
        let prev = self.bindings.insert(layer, token).flatten();
        if prev != token {
            self.rebinds += 1;
        }
        prev
    }

    pub fn binding(&self, layer: &LayerKey) -> Option<FilterToken> {
        self.bindings.get(layer).copied().flatten()
    }

    /// Drop bindings for layers that were not drawn this frame.
    pub fn retain_layers(&mut self, live: &[LayerKey]) {
        self.bindings.retain(|k, _| live.contains(k));
    }

    /// Number of times any layer moved to a different token.
    pub fn rebind_count(&self) -> u64 {
        self.rebinds
    }

    pub fn teardown(&mut self) {
        let layers = self.bindings.len();
        self.bindings.clear();
        self.filters.clear();
        let had_garment = self.garment.take().is_some();
        if layers > 0 || had_garment {
            tracing::debug!(view = %self.view, layers, had_garment, "view scene torn down");
        }
    }
}

impl Drop for ViewScene {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
