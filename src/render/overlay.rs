//! Edit-mode overlay: region outlines, element boxes, and transform handles.

use kurbo::BezPath;

use crate::foundation::core::{ElementId, PlaceholderId, Point};
use crate::geometry::units::ViewGeometry;
use crate::interaction::handles::{BoxFrame, HANDLE_RADIUS, ResizeAnchor};
use crate::model::element::CanvasElement;
use crate::model::placeholder::ClipShape;
use crate::model::view::ViewSpec;
use crate::text::measure::TextMeasure;

/// Outline of a print region. `path` is the same path the raster mask is filled from.
#[derive(Clone, Debug)]
pub struct RegionOutline {
    pub placeholder: PlaceholderId,
    pub clip: ClipShape,
    pub path: BezPath,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElementBox {
    pub element: ElementId,
    pub frame: BoxFrame,
    pub locked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleKind {
    Resize(ResizeAnchor),
    Rotate,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub center: Point,
}

/// Handles of the selected element.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub element: ElementId,
    pub frame: BoxFrame,
    pub handles: Vec<Handle>,
}

impl Selection {
    /// Locked elements are outlined but expose no handles.
    pub fn new(element: ElementId, frame: BoxFrame, locked: bool) -> Self {
        let handles = if locked {
            Vec::new()
        } else {
            ResizeAnchor::ALL
                .iter()
                .map(|&a| Handle {
                    kind: HandleKind::Resize(a),
                    center: frame.handle(a),
                })
                .chain(std::iter::once(Handle {
                    kind: HandleKind::Rotate,
                    center: frame.rotate_handle(),
                }))
                .collect()
        };
        Self {
            element,
            frame,
            handles,
        }
    }
}

/// What the pointer landed on.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayHit {
    Handle {
        element: ElementId,
        kind: HandleKind,
    },
    Element(ElementId),
    Region(PlaceholderId),
}

/// Vector overlay for one view. Element boxes are stored bottom-to-top.
#[derive(Clone, Debug, Default)]
pub struct OverlayScene {
    pub regions: Vec<RegionOutline>,
    pub elements: Vec<ElementBox>,
    pub selection: Option<Selection>,
}

impl OverlayScene {
    /// Overlay for `view` with `elements` in z order. Clip outlines come from the same
    /// [`ClipShape`] the compositor masks with.
    pub fn build(
        view: &ViewSpec,
        geometry: &ViewGeometry,
        elements: &[CanvasElement],
        measure: &dyn TextMeasure,
        selected: Option<&ElementId>,
    ) -> Self {
        let mut overlay = Self::default();
        for p in &view.placeholders {
            overlay.push_region(p.id.clone(), p.clip_shape(geometry));
        }
        for el in elements {
            if !el.visible || !el.shows_on(&view.id) {
                continue;
            }
            let frame = BoxFrame::of_element(el, measure);
            if selected == Some(&el.id) {
                overlay.selection = Some(Selection::new(el.id.clone(), frame, el.locked));
            }
            overlay.elements.push(ElementBox {
                element: el.id.clone(),
                frame,
                locked: el.locked,
            });
        }
        overlay
    }

    pub fn push_region(&mut self, placeholder: PlaceholderId, clip: ClipShape) {
        let path = clip.to_bez_path();
        self.regions.push(RegionOutline {
            placeholder,
            clip,
            path,
        });
    }

    /// Handles first, then elements from the top of the stack down, then regions.
    pub fn hit_test(&self, p: Point) -> Option<OverlayHit> {
        if let Some(sel) = &self.selection {
            // Rotation handle is last in the list but wins over overlapping resize handles.
            for h in sel.handles.iter().rev() {
                if (h.center - p).hypot() <= HANDLE_RADIUS {
                    return Some(OverlayHit::Handle {
                        element: sel.element.clone(),
                        kind: h.kind,
                    });
                }
            }
        }
        if let Some(el) = self.elements.iter().rev().find(|e| e.frame.contains(p)) {
            return Some(OverlayHit::Element(el.element.clone()));
        }
        self.regions
            .iter()
            .find(|r| r.clip.contains(p))
            .map(|r| OverlayHit::Region(r.placeholder.clone()))
    }

    pub fn element_box(&self, id: &ElementId) -> Option<&ElementBox> {
        self.elements.iter().find(|e| &e.element == id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
