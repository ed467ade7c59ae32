use super::*;
use crate::geometry::units::{CanvasLayout, PhysicalSize};
use crate::model::element::{ElementKind, ShapeKind, ShapeProps};
use crate::model::placeholder::Placeholder;
use crate::text::measure::ApproxTextMeasure;

// 64x48 canvas, 8 px padding, 4x4 in garment: 8 px per inch.
fn config() -> EngineConfig {
    EngineConfig {
        canvas: CanvasLayout {
            width: 64.0,
            height: 48.0,
            padding: 8.0,
        },
        ..EngineConfig::default()
    }
}

fn view(id: &str, chest: Option<Placeholder>) -> ViewSpec {
    let mut v = ViewSpec::new(id);
    v.physical = Some(PhysicalSize {
        width_in: 4.0,
        height_in: 4.0,
    });
    v.placeholders.extend(chest);
    v
}

fn global_square(id: &str, side: f64) -> CanvasElement {
    let mut el = CanvasElement::new(
        id,
        20.0,
        20.0,
        ElementKind::Shape(ShapeProps {
            kind: ShapeKind::Rect,
            width: side,
            height: side,
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 0.0,
        }),
    );
    el.placeholder_id = Some(PlaceholderId::from("chest"));
    el
}

fn scope_on<'a>(
    doc: &'a mut DesignDocument,
    view: &str,
    config: &'a EngineConfig,
    measure: &'a ApproxTextMeasure,
) -> EditScope<'a> {
    let view = ViewId::from(view);
    let spec = &doc.require_view(&view).unwrap().spec;
    let geometry = spec.geometry(
        &config.canvas,
        config.default_physical_size,
        config.fallback_px_per_inch,
    );
    EditScope {
        doc,
        view,
        geometry,
        config,
        measure,
    }
}

#[test]
fn global_element_stays_in_its_region_when_edited_from_another_view() {
    let chest = Placeholder::rect("chest", 1.0, 1.0, 2.0, 2.0);
    let mut doc =
        DesignDocument::new(vec![view("front", Some(chest)), view("back", None)]).unwrap();
    doc.insert_element(global_square("g1", 8.0)).unwrap();
    let (cfg, m) = (config(), ApproxTextMeasure::default());

    let mut s = scope_on(&mut doc, "back", &cfg, &m);
    let region = s.region_for(s.element(&ElementId::from("g1")).unwrap()).unwrap();
    assert_eq!(region.bounds, Rect::new(16.0, 16.0, 32.0, 32.0));

    s.apply(&ElementId::from("g1"), &ElementUpdate::position(700.0, 500.0))
        .unwrap();
    let el = s.element(&ElementId::from("g1")).unwrap();
    assert_eq!((el.x, el.y), (24.0, 24.0));
}

#[test]
fn global_element_is_held_to_every_views_region() {
    let front = view("front", Some(Placeholder::rect("chest", 1.0, 1.0, 2.0, 2.0)));
    let back = view("back", Some(Placeholder::rect("chest", 2.0, 2.0, 1.0, 1.0)));
    let mut doc = DesignDocument::new(vec![front, back]).unwrap();
    doc.insert_element(global_square("g1", 4.0)).unwrap();
    let (cfg, m) = (config(), ApproxTextMeasure::default());

    let mut s = scope_on(&mut doc, "front", &cfg, &m);
    s.apply(&ElementId::from("g1"), &ElementUpdate::position(0.0, 0.0))
        .unwrap();
    let el = s.element(&ElementId::from("g1")).unwrap();
    assert_eq!((el.x, el.y), (24.0, 24.0));
}

#[test]
fn view_element_uses_its_own_views_geometry() {
    let front = view("front", Some(Placeholder::rect("chest", 1.0, 1.0, 2.0, 2.0)));
    let mut back = view("back", Some(Placeholder::rect("chest", 1.0, 1.0, 2.0, 2.0)));
    back.physical = Some(PhysicalSize {
        width_in: 8.0,
        height_in: 8.0,
    });
    let mut doc = DesignDocument::new(vec![front, back]).unwrap();
    let mut el = global_square("b1", 4.0);
    el.view = Some(ViewId::from("back"));
    doc.insert_element(el).unwrap();
    let (cfg, m) = (config(), ApproxTextMeasure::default());

    // Back is 4 px per inch, so its chest spans 12..20.
    let s = scope_on(&mut doc, "front", &cfg, &m);
    let region = s.region_for(s.element(&ElementId::from("b1")).unwrap()).unwrap();
    assert_eq!(region.bounds, Rect::new(12.0, 12.0, 20.0, 20.0));
}
