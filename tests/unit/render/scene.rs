use super::*;

fn garment(level: u8) -> Arc<PreparedImage> {
    let px: Vec<u8> = (0..16 * 16).flat_map(|_| [level, level, level, 255]).collect();
    Arc::new(PreparedImage::from_premul(16, 16, px).unwrap())
}

fn layout() -> CanvasLayout {
    CanvasLayout {
        width: 64.0,
        height: 48.0,
        padding: 8.0,
    }
}

#[test]
fn garment_is_fitted_into_padded_canvas() {
    let mut scene = ViewScene::new(ViewId::from("front"));
    scene.set_garment("g.png", garment(90), &layout());
    let g = scene.garment().unwrap();
    assert_eq!(g.placement, Rect::new(16.0, 8.0, 48.0, 40.0));
}

#[test]
fn filter_is_reused_until_boost_changes() {
    let mut scene = ViewScene::new(ViewId::from("front"));
    assert_eq!(scene.ensure_filter(1.5), None);

    scene.set_garment("g.png", garment(90), &layout());
    let a = scene.ensure_filter(1.5).unwrap();
    assert_eq!(scene.ensure_filter(1.5), Some(a));
    let b = scene.ensure_filter(2.0).unwrap();
    assert!(b > a);
}

#[test]
fn layers_are_repointed_without_being_recreated() {
    let mut scene = ViewScene::new(ViewId::from("front"));
    scene.set_garment("g.png", garment(90), &layout());
    let layer = LayerKey::Element(ElementId::from("e1"));

    let a = scene.ensure_filter(1.5);
    assert_eq!(scene.bind(layer.clone()), None);
    assert_eq!(scene.binding(&layer), a);

    let b = scene.ensure_filter(3.0);
    assert_eq!(scene.bind(layer.clone()), a);
    assert_eq!(scene.binding(&layer), b);
    assert_eq!(scene.rebind_count(), 2);

    // Same token again: no rebind.
    scene.bind(layer.clone());
    assert_eq!(scene.rebind_count(), 2);
}

#[test]
fn new_garment_tears_down_old_resources() {
    let mut scene = ViewScene::new(ViewId::from("front"));
    scene.set_garment("a.png", garment(90), &layout());
    scene.ensure_filter(1.5);
    scene.bind(LayerKey::Design(PlaceholderId::from("chest")));

    scene.set_garment("b.png", garment(120), &layout());
    assert!(scene.filter().is_none());
    assert_eq!(
        scene.binding(&LayerKey::Design(PlaceholderId::from("chest"))),
        None
    );
    assert_eq!(scene.garment_url(), Some("b.png"));
    let t = scene.ensure_filter(1.5).unwrap();
    assert_eq!(scene.filter().unwrap().source_url, "b.png");
    assert_eq!(scene.filter_token(), Some(t));
}

#[test]
fn retain_layers_drops_stale_bindings() {
    let mut scene = ViewScene::new(ViewId::from("front"));
    scene.set_garment("a.png", garment(90), &layout());
    scene.ensure_filter(1.5);
    let keep = LayerKey::Element(ElementId::from("keep"));
    let gone = LayerKey::Element(ElementId::from("gone"));
    scene.bind(keep.clone());
    scene.bind(gone.clone());
    scene.retain_layers(std::slice::from_ref(&keep));
    assert!(scene.binding(&keep).is_some());
    assert!(scene.binding(&gone).is_none());
}
