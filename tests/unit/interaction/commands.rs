use super::*;
use crate::config::EngineConfig;
use crate::document::DesignDocument;
use crate::foundation::core::ViewId;
use crate::geometry::units::ViewGeometry;
use crate::model::placeholder::Placeholder;
use crate::model::view::ViewSpec;
use crate::text::measure::ApproxTextMeasure;

// 10 px per inch, 40 px padding: the chest region spans 140..240 on both axes.
fn doc() -> DesignDocument {
    let mut front = ViewSpec::new("front");
    front
        .placeholders
        .push(Placeholder::rect("chest", 10.0, 10.0, 10.0, 10.0));
    DesignDocument::new(vec![front, ViewSpec::new("back")]).unwrap()
}

fn scope<'a>(
    doc: &'a mut DesignDocument,
    view: &str,
    config: &'a EngineConfig,
    measure: &'a ApproxTextMeasure,
) -> EditScope<'a> {
    EditScope {
        doc,
        view: ViewId::from(view),
        geometry: ViewGeometry::with_scale(10.0, 40.0),
        config,
        measure,
    }
}

#[test]
fn sale_text_fits_a_narrow_region() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, "front", &cfg, &m);
    let id = add_text(&mut s, None, "SALE", None).unwrap();
    let el = s.element(&id).unwrap();
    let ElementKind::Text(t) = &el.kind else {
        panic!("expected text");
    };
    let size = measure_text_box(&m, t);
    assert!(el.x >= 140.0 - 1e-6);
    assert!(el.x + size.x <= 240.0 + 1e-6);
    assert!(el.y >= 140.0 - 1e-6 && el.y + size.y <= 240.0 + 1e-6);
    assert!(t.font_size < NEW_TEXT_FONT_SIZE);
    assert_eq!(el.placeholder_id, Some(PlaceholderId::from("chest")));
    assert_eq!(el.view, Some(ViewId::from("front")));
    assert_eq!(t.fill, Rgb8::BLACK);

    assert!(add_text(&mut s, None, "   ", None).is_err());
}

#[test]
fn shapes_are_sized_and_centred() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, "front", &cfg, &m);
    let id = add_shape(&mut s, Some(&PlaceholderId::from("chest")), ShapeKind::Star).unwrap();
    let el = s.element(&id).unwrap();
    assert_eq!((el.x, el.y), (150.0, 150.0));
    let ElementKind::Shape(sh) = &el.kind else {
        panic!("expected shape");
    };
    assert_eq!((sh.width, sh.height, sh.stroke_width), (80.0, 80.0, 2.0));
}

#[test]
fn images_fit_the_region_aspect() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, "front", &cfg, &m);
    let id = add_image(&mut s, None, "logo.png", 200, 100).unwrap();
    let el = s.element(&id).unwrap();
    assert_eq!((el.x, el.y), (140.0, 165.0));
    let ElementKind::Image(img) = &el.kind else {
        panic!("expected image");
    };
    assert_eq!((img.width, img.height), (100.0, 50.0));
    assert!(add_image(&mut s, None, "empty.png", 0, 10).is_err());
}

#[test]
fn view_without_regions_uses_the_padded_canvas() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, "back", &cfg, &m);
    let id = add_shape(&mut s, None, ShapeKind::Rect).unwrap();
    let el = s.element(&id).unwrap();
    assert_eq!(el.placeholder_id, None);
    assert_eq!((el.x, el.y), (350.0, 250.0));
}

#[test]
fn duplicate_offsets_reclamps_and_goes_on_top() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, "front", &cfg, &m);
    let a = add_shape(&mut s, None, ShapeKind::Circle).unwrap();
    let b = duplicate(&mut s, &a).unwrap();
    assert_ne!(a, b);
    let (ea, eb) = (s.element(&a).unwrap(), s.element(&b).unwrap());
    // 150 + 20 would overflow the 240 edge with an 80 px box.
    assert_eq!((eb.x, eb.y), (160.0, 160.0));
    assert!(eb.z_index > ea.z_index);
}

#[test]
fn nudge_moves_one_step_and_respects_locks() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, "front", &cfg, &m);
    let id = add_shape(&mut s, None, ShapeKind::Rect).unwrap();
    nudge(&mut s, &id, 1, -2).unwrap();
    assert_eq!(s.element(&id).unwrap().origin(), (151.0, 148.0).into());

    s.doc.element_mut(&id).unwrap().locked = true;
    assert_eq!(nudge(&mut s, &id, 1, 0).unwrap(), None);
}

#[test]
fn z_order_commands() {
    let (mut d, cfg, m) = (doc(), EngineConfig::default(), ApproxTextMeasure::default());
    let mut s = scope(&mut d, "front", &cfg, &m);
    let a = add_shape(&mut s, None, ShapeKind::Rect).unwrap();
    let b = add_shape(&mut s, None, ShapeKind::Rect).unwrap();
    assert!(bring_to_front(&mut s, &a).unwrap().is_some());
    assert!(s.element(&a).unwrap().z_index > s.element(&b).unwrap().z_index);
    send_to_back(&mut s, &a).unwrap();
    assert!(s.element(&a).unwrap().z_index < s.element(&b).unwrap().z_index);

    delete(&mut s, &a).unwrap();
    assert!(s.element(&a).is_err());
    assert!(delete(&mut s, &a).is_err());
}
