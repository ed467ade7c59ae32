//! The open design: per-view state, global elements, and undo history.
//!
//! Each view's element list is *computed* as global elements followed by the view's own, then
//! stable-sorted by z-index. Nothing stores that merged list.

pub mod history;
pub mod persisted;

use std::collections::{BTreeMap, BTreeSet};

use crate::displacement::DisplacementSettings;
use crate::foundation::core::{ElementId, PlaceholderId, Rgb8, ViewId};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::model::element::CanvasElement;
use crate::model::view::{DesignUrlMap, ViewSpec};

pub use history::History;
pub use persisted::PersistedDesign;

/// Catalog data for one view plus what the user put on it.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub spec: ViewSpec,
    pub elements: Vec<CanvasElement>,
    pub designs: DesignUrlMap,
}

/// Element lists captured for undo.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementsSnapshot {
    globals: Vec<CanvasElement>,
    per_view: BTreeMap<ViewId, Vec<CanvasElement>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DesignDocument {
    order: Vec<ViewId>,
    views: BTreeMap<ViewId, ViewState>,
    globals: Vec<CanvasElement>,
    pub settings: DisplacementSettings,
    pub garment_color: Option<Rgb8>,
}

impl DesignDocument {
    /// Build an empty design over the catalog's views, keeping their order.
    pub fn new(specs: Vec<ViewSpec>) -> DrapeResult<Self> {
        if specs.is_empty() {
            return Err(DrapeError::validation("a design needs at least one view"));
        }
        let mut order = Vec::with_capacity(specs.len());
        let mut views = BTreeMap::new();
        for spec in specs {
            spec.validate()?;
            let id = spec.id.clone();
            let state = ViewState {
                spec,
                elements: Vec::new(),
                designs: DesignUrlMap::new(),
            };
            if views.insert(id.clone(), state).is_some() {
                return Err(DrapeError::validation(format!("duplicate view id '{id}'")));
            }
            order.push(id);
        }
        Ok(Self {
            order,
            views,
            globals: Vec::new(),
            settings: DisplacementSettings::default(),
            garment_color: None,
        })
    }

    pub fn view_ids(&self) -> &[ViewId] {
        &self.order
    }

    pub fn view(&self, id: &ViewId) -> Option<&ViewState> {
        self.views.get(id)
    }

    pub fn require_view(&self, id: &ViewId) -> DrapeResult<&ViewState> {
        self.views
            .get(id)
            .ok_or_else(|| DrapeError::validation(format!("unknown view '{id}'")))
    }

    pub fn view_mut(&mut self, id: &ViewId) -> DrapeResult<&mut ViewState> {
        self.views
            .get_mut(id)
            .ok_or_else(|| DrapeError::validation(format!("unknown view '{id}'")))
    }

    pub fn globals(&self) -> &[CanvasElement] {
        &self.globals
    }

    /// Global elements followed by the view's own, stable-sorted by z-index.
    pub fn effective_elements(&self, view: &ViewId) -> Vec<CanvasElement> {
        let own = self.views.get(view).map(|v| v.elements.as_slice()).unwrap_or_default();
        let mut out: Vec<CanvasElement> = self.globals.iter().chain(own).cloned().collect();
        out.sort_by_key(|e| e.z_index);
        out
    }

    pub fn element(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.globals
            .iter()
            .chain(self.views.values().flat_map(|v| v.elements.iter()))
            .find(|e| &e.id == id)
    }

    pub fn element_mut(&mut self, id: &ElementId) -> Option<&mut CanvasElement> {
        self.globals
            .iter_mut()
            .chain(self.views.values_mut().flat_map(|v| v.elements.iter_mut()))
            .find(|e| &e.id == id)
    }

    /// Add an element to the global list or to its view.
    pub fn insert_element(&mut self, el: CanvasElement) -> DrapeResult<()> {
        if self.element(&el.id).is_some() {
            return Err(DrapeError::validation(format!(
                "duplicate element id '{}'",
                el.id
            )));
        }
        if let Some(pid) = &el.placeholder_id {
            let views: Vec<&ViewState> = match &el.view {
                Some(v) => vec![self.require_view(v)?],
                None => self.views.values().collect(),
            };
            if !views.iter().any(|v| v.spec.placeholder(pid).is_some()) {
                return Err(DrapeError::validation(format!(
                    "element '{}' references unknown placeholder '{pid}'",
                    el.id
                )));
            }
        }
        match el.view.clone() {
            Some(v) => self.view_mut(&v)?.elements.push(el),
            None => self.globals.push(el),
        }
        Ok(())
    }

    pub fn remove_element(&mut self, id: &ElementId) -> Option<CanvasElement> {
        if let Some(i) = self.globals.iter().position(|e| &e.id == id) {
            return Some(self.globals.remove(i));
        }
        self.views.values_mut().find_map(|v| {
            let i = v.elements.iter().position(|e| &e.id == id)?;
            Some(v.elements.remove(i))
        })
    }

    /// Views whose render an element takes part in.
    pub fn views_showing(&self, el: &CanvasElement) -> Vec<ViewId> {
        match &el.view {
            Some(v) => vec![v.clone()],
            None => self.order.clone(),
        }
    }

    pub fn max_z(&self, view: &ViewId) -> Option<i64> {
        self.effective_elements(view).iter().map(|e| e.z_index).max()
    }

    pub fn min_z(&self, view: &ViewId) -> Option<i64> {
        self.effective_elements(view).iter().map(|e| e.z_index).min()
    }

    /// Fresh id of the form `<prefix>-<n>`.
    pub fn next_element_id(&self, prefix: &str) -> ElementId {
        let taken: BTreeSet<&str> = self
            .globals
            .iter()
            .chain(self.views.values().flat_map(|v| v.elements.iter()))
            .map(|e| e.id.as_str())
            .collect();
        let mut n = taken.len() + 1;
        loop {
            let candidate = format!("{prefix}-{n}");
            if !taken.contains(candidate.as_str()) {
                return ElementId::from(candidate);
            }
            n += 1;
        }
    }

    pub fn set_design(
        &mut self,
        view: &ViewId,
        placeholder: &PlaceholderId,
        url: &str,
    ) -> DrapeResult<()> {
        let state = self.view_mut(view)?;
        if state.spec.placeholder(placeholder).is_none() {
            return Err(DrapeError::validation(format!(
                "view '{view}' has no placeholder '{placeholder}'"
            )));
        }
        state.designs.insert(placeholder.clone(), url.to_string());
        Ok(())
    }

    pub fn clear_design(&mut self, view: &ViewId, placeholder: &PlaceholderId) -> DrapeResult<bool> {
        Ok(self.view_mut(view)?.designs.remove(placeholder).is_some())
    }

    pub fn elements_snapshot(&self) -> ElementsSnapshot {
        ElementsSnapshot {
            globals: self.globals.clone(),
            per_view: self
                .views
                .iter()
                .map(|(id, v)| (id.clone(), v.elements.clone()))
                .collect(),
        }
    }

    /// Restore element lists; views missing from the snapshot are emptied.
    pub fn restore_elements(&mut self, snap: ElementsSnapshot) {
        self.globals = snap.globals;
        let mut per_view = snap.per_view;
        for (id, state) in &mut self.views {
            state.elements = per_view.remove(id).unwrap_or_default();
        }
    }

    pub fn to_persisted(&self) -> PersistedDesign {
        let elements = self
            .globals
            .iter()
            .chain(
                self.order
                    .iter()
                    .filter_map(|id| self.views.get(id))
                    .flat_map(|v| v.elements.iter()),
            )
            .cloned()
            .collect();
        PersistedDesign {
            version: persisted::PERSISTED_VERSION,
            elements,
            designs: self
                .views
                .iter()
                .filter(|(_, v)| !v.designs.is_empty())
                .map(|(id, v)| (id.clone(), v.designs.clone()))
                .collect(),
            settings: self.settings,
            garment_color: self.garment_color,
        }
    }

    /// Rebuild a design over the catalog's views from its persisted form.
    pub fn from_persisted(specs: Vec<ViewSpec>, persisted: PersistedDesign) -> DrapeResult<Self> {
        let mut doc = Self::new(specs)?;
        doc.settings = persisted.settings.clamped();
        doc.garment_color = persisted.garment_color;
        for el in persisted.elements {
            doc.insert_element(el)?;
        }
        for (view, designs) in persisted.designs {
            for (pid, url) in designs {
                doc.set_design(&view, &pid, &url)?;
            }
        }
        Ok(doc)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/mod.rs"]
mod tests;
