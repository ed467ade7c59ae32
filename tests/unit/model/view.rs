use super::*;

#[test]
fn duplicate_placeholder_ids_are_rejected() {
    let mut v = ViewSpec::new("front");
    v.placeholders.push(Placeholder::rect("chest", 1.0, 1.0, 2.0, 2.0));
    assert!(v.validate().is_ok());
    v.placeholders.push(Placeholder::rect("chest", 5.0, 5.0, 2.0, 2.0));
    assert!(v.validate().is_err());
}

#[test]
fn region_bounds_carry_lock_flag() {
    let mut v = ViewSpec::new("front");
    let mut p = Placeholder::rect("chest", 1.0, 1.0, 2.0, 2.0);
    p.lock_size = true;
    v.placeholders.push(p);
    let g = ViewGeometry::with_scale(10.0, 40.0);
    let r = v.region_bounds(&PlaceholderId::from("chest"), &g).unwrap();
    assert!(r.lock_size);
    assert_eq!(r.bounds.x0, 50.0);
    assert_eq!(r.bounds.width(), 20.0);
    assert!(v.region_bounds(&PlaceholderId::from("sleeve"), &g).is_none());
}

#[test]
fn catalog_view_json() {
    let v: ViewSpec = serde_json::from_str(
        r#"{"id":"back","garmentUrl":"https://cdn/tee-back.png",
            "physical":{"widthIn":20,"heightIn":24},
            "placeholders":[{"id":"p1","shapeType":"rect","xIn":5,"yIn":3,"widthIn":10,"heightIn":12}]}"#,
    )
    .unwrap();
    assert_eq!(v.placeholders.len(), 1);
    assert_eq!(v.physical.map(|p| p.width_in), Some(20.0));
}
