//! Editor commands: add, duplicate, delete, nudge, and z-order changes.
//!
//! Every command that places or moves an element clamps through
//! [`CanvasElement::constrain`](crate::model::element::CanvasElement) before the document changes.

use crate::foundation::core::{ElementId, PlaceholderId, Rgb8};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::geometry::units::fit_contain;
use crate::interaction::scope::{EditScope, TargetArea};
use crate::model::element::{
    CanvasElement, ElementKind, ImageProps, ShapeKind, ShapeProps, TextAlign, TextCurve, TextProps,
};
use crate::model::update::ElementUpdate;
use crate::text::measure::measure_text_box;

pub const NEW_TEXT_FONT_SIZE: f64 = 48.0;
pub const NEW_SHAPE_MAX: f64 = 100.0;
pub const NEW_SHAPE_STROKE: f64 = 2.0;

pub fn add_text(
    scope: &mut EditScope<'_>,
    placeholder: Option<&PlaceholderId>,
    text: &str,
    font_family: Option<&str>,
) -> DrapeResult<ElementId> {
    if text.trim().is_empty() {
        return Err(DrapeError::validation("text must not be empty"));
    }
    let area = scope.target_area(placeholder)?;
    let props = TextProps {
        text: text.to_string(),
        font_family: font_family.unwrap_or("Arial").to_string(),
        font_size: NEW_TEXT_FONT_SIZE,
        font_style: Default::default(),
        fill: Rgb8::BLACK,
        align: TextAlign::Center,
        letter_spacing: 0.0,
        curve: TextCurve::default(),
    };
    let size = measure_text_box(scope.measure, &props);
    let c = area.bounds.center();
    let id = scope.doc.next_element_id("text");
    let el = CanvasElement::new(
        id,
        c.x - size.x * 0.5,
        c.y - size.y * 0.5,
        ElementKind::Text(props),
    );
    insert_new(scope, el, &area)
}

/// Add an image of natural size `natural_w`×`natural_h`, fitted into the target area and
/// rotated with its region.
pub fn add_image(
    scope: &mut EditScope<'_>,
    placeholder: Option<&PlaceholderId>,
    src: &str,
    natural_w: u32,
    natural_h: u32,
) -> DrapeResult<ElementId> {
    if natural_w == 0 || natural_h == 0 {
        return Err(DrapeError::validation(format!("image '{src}' has no pixels")));
    }
    let area = scope.target_area(placeholder)?;
    let rect = fit_contain(f64::from(natural_w), f64::from(natural_h), area.bounds);
    let id = scope.doc.next_element_id("image");
    let mut el = CanvasElement::new(
        id,
        rect.x0,
        rect.y0,
        ElementKind::Image(ImageProps {
            src: src.to_string(),
            width: rect.width(),
            height: rect.height(),
            flip_x: false,
            flip_y: false,
            scale_x: 1.0,
            scale_y: 1.0,
            lock_aspect_ratio: true,
            filters: Default::default(),
        }),
    );
    el.rotation = area.rotation_deg;
    insert_new(scope, el, &area)
}

pub fn add_shape(
    scope: &mut EditScope<'_>,
    placeholder: Option<&PlaceholderId>,
    kind: ShapeKind,
) -> DrapeResult<ElementId> {
    let area = scope.target_area(placeholder)?;
    let b = area.bounds;
    let size = NEW_SHAPE_MAX.min(b.width().min(b.height()) * 0.8);
    let c = b.center();
    let id = scope.doc.next_element_id("shape");
    let el = CanvasElement::new(
        id,
        c.x - size * 0.5,
        c.y - size * 0.5,
        ElementKind::Shape(ShapeProps {
            kind,
            width: size,
            height: size,
            fill: Some(Rgb8::BLACK),
            stroke: Some(Rgb8::BLACK),
            stroke_width: NEW_SHAPE_STROKE,
            corner_radius: 0.0,
        }),
    );
    insert_new(scope, el, &area)
}

/// Copy an element, offset it, and put it on top.
pub fn duplicate(scope: &mut EditScope<'_>, id: &ElementId) -> DrapeResult<ElementId> {
    let mut el = scope.element(id)?.clone();
    let offset = scope.config.duplicate_offset_px;
    el.id = scope.doc.next_element_id(el.kind_tag());
    el.x += offset;
    el.y += offset;
    el.locked = false;
    let region = scope.region_for(&el);
    el.z_index = next_front(scope);
    let clamped = el.constrain(
        &ElementUpdate::position(el.x, el.y),
        region.as_ref(),
        scope.measure,
    );
    clamped.apply(&mut el);
    let new_id = el.id.clone();
    scope.doc.insert_element(el)?;
    Ok(new_id)
}

pub fn delete(scope: &mut EditScope<'_>, id: &ElementId) -> DrapeResult<CanvasElement> {
    scope
        .doc
        .remove_element(id)
        .ok_or_else(|| DrapeError::validation(format!("unknown element '{id}'")))
}

/// Arrow-key move by `steps` nudge increments. Locked elements do not move.
pub fn nudge(
    scope: &mut EditScope<'_>,
    id: &ElementId,
    steps_x: i32,
    steps_y: i32,
) -> DrapeResult<Option<ElementUpdate>> {
    let el = scope.element(id)?;
    if el.locked {
        return Ok(None);
    }
    let step = scope.config.nudge_px;
    let update = ElementUpdate::position(
        el.x + f64::from(steps_x) * step,
        el.y + f64::from(steps_y) * step,
    );
    scope.apply(id, &update)
}

pub fn bring_to_front(
    scope: &mut EditScope<'_>,
    id: &ElementId,
) -> DrapeResult<Option<ElementUpdate>> {
    let z = next_front(scope);
    set_z(scope, id, z)
}

pub fn send_to_back(
    scope: &mut EditScope<'_>,
    id: &ElementId,
) -> DrapeResult<Option<ElementUpdate>> {
    let z = scope.doc.min_z(&scope.view).map_or(0, |z| z - 1);
    set_z(scope, id, z)
}

fn set_z(
    scope: &mut EditScope<'_>,
    id: &ElementId,
    z: i64,
) -> DrapeResult<Option<ElementUpdate>> {
    let el = scope.element(id)?;
    if el.z_index == z {
        return Ok(None);
    }
    let update = ElementUpdate {
        z_index: Some(z),
        ..ElementUpdate::default()
    };
    let Some(el) = scope.doc.element_mut(id) else {
        return Err(DrapeError::validation(format!("unknown element '{id}'")));
    };
    update.apply(el);
    Ok(Some(update))
}

fn next_front(scope: &EditScope<'_>) -> i64 {
    scope.doc.max_z(&scope.view).map_or(0, |z| z + 1)
}

fn insert_new(
    scope: &mut EditScope<'_>,
    mut el: CanvasElement,
    area: &TargetArea,
) -> DrapeResult<ElementId> {
    el.view = Some(scope.view.clone());
    el.placeholder_id = area.placeholder.clone();
    el.z_index = next_front(scope);
    let region = scope.region_for(&el);
    let clamped = el.constrain(
        &ElementUpdate::position(el.x, el.y),
        region.as_ref(),
        scope.measure,
    );
    clamped.apply(&mut el);
    let id = el.id.clone();
    scope.doc.insert_element(el)?;
    Ok(id)
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/commands.rs"]
mod tests;
