use crate::config::EngineConfig;
use crate::document::DesignDocument;
use crate::foundation::core::{ElementId, PlaceholderId, Rect, ViewId};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::geometry::units::ViewGeometry;
use crate::model::constrain::RegionBounds;
use crate::model::element::CanvasElement;
use crate::model::update::ElementUpdate;
use crate::model::view::ViewSpec;
use crate::text::measure::TextMeasure;

/// The document seen from the active view, with everything an edit needs to clamp itself.
pub struct EditScope<'a> {
    pub doc: &'a mut DesignDocument,
    pub view: ViewId,
    pub geometry: ViewGeometry,
    pub config: &'a EngineConfig,
    pub measure: &'a dyn TextMeasure,
}

/// Where a new element goes.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetArea {
    pub placeholder: Option<PlaceholderId>,
    pub bounds: Rect,
    pub rotation_deg: f64,
}

impl EditScope<'_> {
    pub fn spec(&self) -> DrapeResult<&ViewSpec> {
        Ok(&self.doc.require_view(&self.view)?.spec)
    }

    /// Pixel bounds the element must stay inside.
    ///
    /// A global element is drawn on every view, so it is held to the intersection of its region
    /// on each view that defines the placeholder.
    pub fn region_for(&self, el: &CanvasElement) -> Option<RegionBounds> {
        let pid = el.placeholder_id.as_ref()?;
        self.doc
            .views_showing(el)
            .iter()
            .filter_map(|v| {
                let spec = &self.doc.view(v)?.spec;
                let geom = if *v == self.view {
                    self.geometry
                } else {
                    spec.geometry(
                        &self.config.canvas,
                        self.config.default_physical_size,
                        self.config.fallback_px_per_inch,
                    )
                };
                spec.region_bounds(pid, &geom)
            })
            .reduce(|a, b| RegionBounds {
                bounds: a.bounds.intersect(b.bounds),
                lock_size: a.lock_size || b.lock_size,
            })
    }

    /// The requested placeholder, else the view's first one, else the padded canvas.
    pub fn target_area(&self, placeholder: Option<&PlaceholderId>) -> DrapeResult<TargetArea> {
        let spec = self.spec()?;
        let chosen = match placeholder {
            Some(pid) => Some(spec.placeholder(pid).ok_or_else(|| {
                DrapeError::validation(format!("view '{}' has no placeholder '{pid}'", self.view))
            })?),
            None => spec.placeholders.first(),
        };
        Ok(match chosen {
            Some(p) => TargetArea {
                placeholder: Some(p.id.clone()),
                bounds: p.pixel_bounds(&self.geometry),
                rotation_deg: p.rotation_deg,
            },
            None => TargetArea {
                placeholder: None,
                bounds: self.config.canvas.padded_rect(),
                rotation_deg: 0.0,
            },
        })
    }

    pub fn element(&self, id: &ElementId) -> DrapeResult<&CanvasElement> {
        self.doc
            .element(id)
            .ok_or_else(|| DrapeError::validation(format!("unknown element '{id}'")))
    }

    /// Clamp `update` against the element's region and apply it.
    ///
    /// Returns the update that was applied, or `None` when nothing changed.
    pub fn apply(
        &mut self,
        id: &ElementId,
        update: &ElementUpdate,
    ) -> DrapeResult<Option<ElementUpdate>> {
        let el = self.element(id)?;
        let region = self.region_for(el);
        let clamped = el.constrain(update, region.as_ref(), self.measure);
        let Some(el) = self.doc.element_mut(id) else {
            return Err(DrapeError::validation(format!("unknown element '{id}'")));
        };
        let before = el.clone();
        clamped.apply(el);
        Ok((*el != before).then_some(clamped))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/scope.rs"]
mod tests;
