//! Pointer state machine for drag, resize, and rotate gestures.
//!
//! One gesture at a time owns an element's geometry. While it is active, panel edits to that
//! element are refused and programmatic updates are queued until pointer-up.

use std::collections::BTreeMap;

use crate::foundation::core::{ElementId, PlaceholderId, Point, Vec2};
use crate::foundation::error::DrapeResult;
use crate::interaction::handles::{BoxFrame, ResizeAnchor, rotation_from_pointer};
use crate::interaction::scope::EditScope;
use crate::model::element::{CanvasElement, ElementKind};
use crate::model::update::ElementUpdate;
use crate::render::overlay::{HandleKind, OverlayHit, OverlayScene};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        element: ElementId,
        grab: Point,
        start: Point,
    },
    Resizing {
        anchor: ResizeAnchor,
        grab: Point,
        start: BoxFrame,
        base: Box<CanvasElement>,
    },
    Rotating {
        element: ElementId,
    },
}

impl GestureState {
    pub fn element(&self) -> Option<&ElementId> {
        match self {
            GestureState::Idle => None,
            GestureState::Dragging { element, .. } | GestureState::Rotating { element } => {
                Some(element)
            }
            GestureState::Resizing { base, .. } => Some(&base.id),
        }
    }

    fn kind(&self) -> Option<GestureKind> {
        match self {
            GestureState::Idle => None,
            GestureState::Dragging { .. } => Some(GestureKind::Move),
            GestureState::Resizing { .. } => Some(GestureKind::Resize),
            GestureState::Rotating { .. } => Some(GestureKind::Rotate),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize,
    Rotate,
}

impl GestureKind {
    pub fn label(self) -> &'static str {
        match self {
            GestureKind::Move => "move",
            GestureKind::Resize => "resize",
            GestureKind::Rotate => "rotate",
        }
    }
}

/// What pointer-down landed on.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerTarget {
    /// A gesture started on this element.
    Gesture(ElementId),
    /// The element was selected but is locked, so nothing will move.
    Locked(ElementId),
    Region(PlaceholderId),
    Empty,
}

/// Summary of a finished gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureEnd {
    pub element: ElementId,
    pub kind: GestureKind,
    /// Whether the gesture or a flushed update changed the element.
    pub changed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditOutcome {
    Applied(ElementUpdate),
    Unchanged,
    /// The element is mid-gesture; the edit was refused.
    Busy,
    /// The element is mid-gesture; the edit runs at pointer-up.
    Queued,
}

#[derive(Debug, Default)]
pub struct InteractionController {
    state: GestureState,
    selected: Option<ElementId>,
    deferred: BTreeMap<ElementId, ElementUpdate>,
    changed: bool,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn selected(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, id: Option<ElementId>) {
        self.selected = id;
    }

    pub fn is_busy(&self, id: &ElementId) -> bool {
        self.state.element() == Some(id)
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    #[tracing::instrument(level = "debug", skip(self, scope, overlay))]
    pub fn pointer_down(
        &mut self,
        scope: &EditScope<'_>,
        overlay: &OverlayScene,
        p: Point,
    ) -> DrapeResult<PointerTarget> {
        self.state = GestureState::Idle;
        self.changed = false;
        let Some(hit) = overlay.hit_test(p) else {
            self.selected = None;
            return Ok(PointerTarget::Empty);
        };
        let (id, handle) = match hit {
            OverlayHit::Region(pid) => {
                self.selected = None;
                return Ok(PointerTarget::Region(pid));
            }
            OverlayHit::Element(id) => (id, None),
            OverlayHit::Handle { element, kind } => (element, Some(kind)),
        };
        let el = scope.element(&id)?;
        self.selected = Some(id.clone());
        if el.locked {
            return Ok(PointerTarget::Locked(id));
        }
        self.state = match handle {
            None => GestureState::Dragging {
                element: id.clone(),
                grab: p,
                start: el.origin(),
            },
            Some(HandleKind::Resize(anchor)) => GestureState::Resizing {
                anchor,
                grab: p,
                start: BoxFrame::of_element(el, scope.measure),
                base: Box::new(el.clone()),
            },
            Some(HandleKind::Rotate) => GestureState::Rotating { element: id.clone() },
        };
        tracing::debug!(element = %id, state = ?self.state.kind(), "gesture started");
        Ok(PointerTarget::Gesture(id))
    }

    /// Advance the active gesture to `p`. Returns the clamped update that was applied.
    pub fn pointer_move(
        &mut self,
        scope: &mut EditScope<'_>,
        p: Point,
    ) -> DrapeResult<Option<ElementUpdate>> {
        let (id, update) = match &self.state {
            GestureState::Idle => return Ok(None),
            GestureState::Dragging {
                element,
                grab,
                start,
            } => {
                let to = *start + (p - *grab);
                (element.clone(), ElementUpdate::position(to.x, to.y))
            }
            GestureState::Resizing {
                anchor,
                grab,
                start,
                base,
            } => (base.id.clone(), resize_update(base, start, *anchor, p - *grab)),
            GestureState::Rotating { element } => {
                let el = scope.element(element)?;
                let center = BoxFrame::of_element(el, scope.measure).center();
                let update = ElementUpdate {
                    rotation: Some(rotation_from_pointer(center, p)),
                    ..ElementUpdate::default()
                };
                (element.clone(), update)
            }
        };
        let applied = scope.apply(&id, &update)?;
        self.changed |= applied.is_some();
        Ok(applied)
    }

    /// End the gesture and apply anything queued for its element.
    pub fn pointer_up(&mut self, scope: &mut EditScope<'_>) -> DrapeResult<Option<GestureEnd>> {
        let state = std::mem::take(&mut self.state);
        let (Some(kind), Some(id)) = (state.kind(), state.element().cloned()) else {
            return Ok(None);
        };
        let mut changed = std::mem::take(&mut self.changed);
        if let Some(update) = self.deferred.remove(&id) {
            // The element may have been deleted by an undo mid-gesture.
            if scope.doc.element(&id).is_some() {
                changed |= scope.apply(&id, &update)?.is_some();
            }
        }
        tracing::debug!(element = %id, kind = kind.label(), changed, "gesture ended");
        Ok(Some(GestureEnd {
            element: id,
            kind,
            changed,
        }))
    }

    /// An edit from the property panel.
    pub fn property_edit(
        &mut self,
        scope: &mut EditScope<'_>,
        id: &ElementId,
        update: &ElementUpdate,
    ) -> DrapeResult<EditOutcome> {
        if self.is_busy(id) {
            tracing::debug!(element = %id, "panel edit refused during gesture");
            return Ok(EditOutcome::Busy);
        }
        apply_outcome(scope, id, update)
    }

    /// An edit from code rather than the user, such as a recolour.
    pub fn programmatic_update(
        &mut self,
        scope: &mut EditScope<'_>,
        id: &ElementId,
        update: ElementUpdate,
    ) -> DrapeResult<EditOutcome> {
        if self.is_busy(id) {
            self.deferred.entry(id.clone()).or_default().merge(update);
            return Ok(EditOutcome::Queued);
        }
        apply_outcome(scope, id, &update)
    }

    /// Drop the active gesture and selection without flushing.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.selected = None;
        self.deferred.clear();
        self.changed = false;
    }
}

fn apply_outcome(
    scope: &mut EditScope<'_>,
    id: &ElementId,
    update: &ElementUpdate,
) -> DrapeResult<EditOutcome> {
    Ok(match scope.apply(id, update)? {
        Some(applied) => EditOutcome::Applied(applied),
        None => EditOutcome::Unchanged,
    })
}

/// Map a handle drag onto the element's own size fields.
fn resize_update(
    base: &CanvasElement,
    start: &BoxFrame,
    anchor: ResizeAnchor,
    delta: Vec2,
) -> ElementUpdate {
    let keep_aspect = match &base.kind {
        ElementKind::Text(_) => true,
        ElementKind::Image(i) => i.lock_aspect_ratio,
        ElementKind::Shape(_) => false,
    };
    let next = start.resized(anchor, delta, keep_aspect);
    let mut update = ElementUpdate::position(next.origin.x, next.origin.y);
    match &base.kind {
        ElementKind::Text(t) => {
            // Edge handles on text still scale uniformly, driven by whichever side moved.
            let ratio = if anchor.is_corner() || matches!(anchor, ResizeAnchor::N | ResizeAnchor::S)
            {
                next.size.y / start.size.y.max(1e-9)
            } else {
                next.size.x / start.size.x.max(1e-9)
            };
            update.font_size = Some(t.font_size * ratio);
            if t.letter_spacing != 0.0 {
                update.letter_spacing = Some(t.letter_spacing * ratio);
            }
        }
        ElementKind::Image(i) => {
            update.width = Some(next.size.x / i.scale_x.abs().max(1e-9));
            update.height = Some(next.size.y / i.scale_y.abs().max(1e-9));
        }
        ElementKind::Shape(_) => {
            update.width = Some(next.size.x);
            update.height = Some(next.size.y);
        }
    }
    update
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/controller.rs"]
mod tests;
