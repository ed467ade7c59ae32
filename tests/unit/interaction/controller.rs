use super::*;
use crate::config::EngineConfig;
use crate::document::DesignDocument;
use crate::foundation::core::{Rect, Rgb8, ViewId};
use crate::geometry::units::ViewGeometry;
use crate::interaction::commands::{add_shape, add_text};
use crate::model::element::ShapeKind;
use crate::model::placeholder::{ClipShape, Placeholder};
use crate::model::view::ViewSpec;
use crate::render::overlay::{ElementBox, Selection};
use crate::text::measure::ApproxTextMeasure;

fn doc() -> DesignDocument {
    let mut front = ViewSpec::new("front");
    front
        .placeholders
        .push(Placeholder::rect("chest", 10.0, 10.0, 10.0, 10.0));
    DesignDocument::new(vec![front]).unwrap()
}

fn scope<'a>(
    doc: &'a mut DesignDocument,
    config: &'a EngineConfig,
    measure: &'a ApproxTextMeasure,
) -> EditScope<'a> {
    EditScope {
        doc,
        view: ViewId::from("front"),
        geometry: ViewGeometry::with_scale(10.0, 40.0),
        config,
        measure,
    }
}

/// Overlay with `id` selected, matching what the edit renderer would produce.
fn overlay_for(scope: &EditScope<'_>, id: &ElementId) -> OverlayScene {
    let el = scope.element(id).unwrap();
    let frame = BoxFrame::of_element(el, scope.measure);
    let mut o = OverlayScene::default();
    o.push_region(
        PlaceholderId::from("chest"),
        ClipShape::Rect(Rect::new(140.0, 140.0, 240.0, 240.0)),
    );
    o.elements.push(ElementBox {
        element: id.clone(),
        frame,
        locked: el.locked,
    });
    o.selection = Some(Selection::new(id.clone(), frame, el.locked));
    o
}

#[test]
fn drag_moves_and_clamps() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, &cfg, &m);
    let id = add_shape(&mut s, None, ShapeKind::Rect).unwrap();
    let overlay = overlay_for(&s, &id);
    let mut c = InteractionController::new();

    let target = c.pointer_down(&s, &overlay, Point::new(190.0, 190.0)).unwrap();
    assert_eq!(target, PointerTarget::Gesture(id.clone()));
    assert_eq!(c.selected(), Some(&id));

    c.pointer_move(&mut s, Point::new(200.0, 195.0)).unwrap();
    assert_eq!(s.element(&id).unwrap().origin(), Point::new(160.0, 155.0));
    c.pointer_move(&mut s, Point::new(400.0, 400.0)).unwrap();
    assert_eq!(s.element(&id).unwrap().origin(), Point::new(160.0, 160.0));

    let end = c.pointer_up(&mut s).unwrap().unwrap();
    assert_eq!(end.kind, GestureKind::Move);
    assert!(end.changed);
    assert_eq!(c.state(), &GestureState::Idle);
    assert_eq!(c.pointer_up(&mut s).unwrap(), None);
}

#[test]
fn locked_elements_select_but_do_not_move() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, &cfg, &m);
    let id = add_shape(&mut s, None, ShapeKind::Rect).unwrap();
    s.doc.element_mut(&id).unwrap().locked = true;
    let overlay = overlay_for(&s, &id);
    let mut c = InteractionController::new();

    let target = c.pointer_down(&s, &overlay, Point::new(190.0, 190.0)).unwrap();
    assert_eq!(target, PointerTarget::Locked(id.clone()));
    assert_eq!(c.pointer_move(&mut s, Point::new(200.0, 200.0)).unwrap(), None);
    assert_eq!(s.element(&id).unwrap().origin(), Point::new(150.0, 150.0));
}

#[test]
fn resize_handle_changes_shape_size() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, &cfg, &m);
    let id = add_shape(&mut s, None, ShapeKind::Rect).unwrap();
    let overlay = overlay_for(&s, &id);
    let mut c = InteractionController::new();

    c.pointer_down(&s, &overlay, Point::new(230.0, 230.0)).unwrap();
    assert!(matches!(
        c.state(),
        GestureState::Resizing {
            anchor: ResizeAnchor::Se,
            ..
        }
    ));
    c.pointer_move(&mut s, Point::new(220.0, 225.0)).unwrap();
    let el = s.element(&id).unwrap();
    assert_eq!(el.origin(), Point::new(150.0, 150.0));
    let ElementKind::Shape(sh) = &el.kind else {
        panic!("expected shape");
    };
    assert_eq!((sh.width, sh.height), (70.0, 75.0));

    // Growing past the region is clamped back inside it.
    c.pointer_move(&mut s, Point::new(330.0, 330.0)).unwrap();
    let el = s.element(&id).unwrap();
    assert!(el.rotated_bounds(&m).x1 <= 240.0 + 1e-6);
}

#[test]
fn corner_resize_scales_text_font() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, &cfg, &m);
    let id = add_text(&mut s, None, "Hi", None).unwrap();
    let overlay = overlay_for(&s, &id);
    let se = BoxFrame::of_element(s.element(&id).unwrap(), &m).handle(ResizeAnchor::Se);
    let mut c = InteractionController::new();

    c.pointer_down(&s, &overlay, se).unwrap();
    c.pointer_move(&mut s, se - Vec2::new(10.0, 10.0)).unwrap();
    let ElementKind::Text(t) = &s.element(&id).unwrap().kind else {
        panic!("expected text");
    };
    assert!(t.font_size < NEW_FONT && t.font_size > 35.0, "{}", t.font_size);
}

const NEW_FONT: f64 = crate::interaction::commands::NEW_TEXT_FONT_SIZE;

#[test]
fn rotate_handle_points_at_pointer() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, &cfg, &m);
    let id = add_shape(&mut s, None, ShapeKind::Rect).unwrap();
    let overlay = overlay_for(&s, &id);
    let mut c = InteractionController::new();

    let handle = BoxFrame::of_element(s.element(&id).unwrap(), &m).rotate_handle();
    c.pointer_down(&s, &overlay, handle).unwrap();
    assert!(matches!(c.state(), GestureState::Rotating { .. }));
    c.pointer_move(&mut s, Point::new(260.0, 190.0)).unwrap();
    assert!((s.element(&id).unwrap().rotation - 90.0).abs() < 1e-9);
    assert_eq!(c.pointer_up(&mut s).unwrap().unwrap().kind, GestureKind::Rotate);
}

#[test]
fn edits_during_a_gesture_are_refused_or_deferred() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, &cfg, &m);
    let a = add_shape(&mut s, None, ShapeKind::Rect).unwrap();
    let b = add_shape(&mut s, None, ShapeKind::Circle).unwrap();
    let overlay = overlay_for(&s, &a);
    let mut c = InteractionController::new();
    c.pointer_down(&s, &overlay, Point::new(190.0, 190.0)).unwrap();

    let red = ElementUpdate {
        fill: Some(Rgb8::new(255, 0, 0)),
        ..ElementUpdate::default()
    };
    assert_eq!(c.property_edit(&mut s, &a, &red).unwrap(), EditOutcome::Busy);
    assert_eq!(
        c.programmatic_update(&mut s, &a, red.clone()).unwrap(),
        EditOutcome::Queued
    );
    assert_eq!(c.deferred_count(), 1);
    assert!(matches!(
        c.property_edit(&mut s, &b, &red).unwrap(),
        EditOutcome::Applied(_)
    ));

    let fill = |s: &EditScope<'_>| match &s.element(&a).unwrap().kind {
        ElementKind::Shape(sh) => sh.fill,
        _ => None,
    };
    assert_eq!(fill(&s), Some(Rgb8::BLACK));
    let end = c.pointer_up(&mut s).unwrap().unwrap();
    assert!(end.changed);
    assert_eq!(fill(&s), Some(Rgb8::new(255, 0, 0)));
    assert_eq!(c.deferred_count(), 0);
    assert_eq!(c.property_edit(&mut s, &a, &red).unwrap(), EditOutcome::Unchanged);
}

#[test]
fn region_and_empty_hits_clear_selection() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, &cfg, &m);
    let id = add_shape(&mut s, None, ShapeKind::Rect).unwrap();
    let overlay = overlay_for(&s, &id);
    let mut c = InteractionController::new();
    c.select(Some(id));

    assert_eq!(
        c.pointer_down(&s, &overlay, Point::new(142.0, 142.0)).unwrap(),
        PointerTarget::Region(PlaceholderId::from("chest"))
    );
    assert_eq!(c.selected(), None);
    assert_eq!(
        c.pointer_down(&s, &overlay, Point::new(10.0, 10.0)).unwrap(),
        PointerTarget::Empty
    );
}
