use super::*;

fn split_garment() -> PreparedImage {
    // Left half black, right half white, 4x2.
    let mut px = Vec::new();
    for _y in 0..2 {
        for x in 0..4 {
            let v = if x < 2 { 0 } else { 255 };
            px.extend_from_slice(&[v, v, v, 255]);
        }
    }
    PreparedImage::from_premul(4, 2, px).unwrap()
}

#[test]
fn boost_formula_centres_on_the_mean() {
    assert_eq!(boosted(0.5, 0.5, 3.0), 0.5);
    assert!((boosted(0.6, 0.5, 1.5) - 0.65).abs() < 1e-6);
    assert_eq!(boosted(1.0, 0.0, 5.0), 1.0);
    assert_eq!(boosted(0.0, 1.0, 5.0), 0.0);
}

#[test]
fn map_is_aligned_with_the_placement() {
    let map = DisplacementMap::generate(&split_garment(), Rect::new(10.0, 20.0, 14.0, 22.0), 1.0)
        .unwrap();
    assert_eq!(map.size(), (4, 2));
    assert!((map.mean_luminance() - 0.5).abs() < 1e-2);
    assert!(map.sample(9, 20).is_none());
    assert!(map.sample(14, 20).is_none());

    let (dark, _) = map.sample(10, 20).unwrap();
    let (light, light_y) = map.sample(13, 21).unwrap();
    assert!(dark < 0.5);
    assert!(light > 0.5);
    assert_eq!(light, light_y);
}

#[test]
fn higher_boost_spreads_values() {
    let g = split_garment();
    let place = Rect::new(0.0, 0.0, 4.0, 2.0);
    let soft = DisplacementMap::generate(&g, place, 1.0).unwrap();
    let hard = DisplacementMap::generate(&g, place, 3.0).unwrap();
    let spread = |m: &DisplacementMap| m.sample(3, 0).unwrap().0 - m.sample(0, 0).unwrap().0;
    assert!(spread(&hard) >= spread(&soft));
    assert_eq!(hard.contrast_boost(), 3.0);
}

#[test]
fn transparent_pixels_are_neutral() {
    let g = PreparedImage::from_premul(1, 1, vec![0, 0, 0, 0]).unwrap();
    let map = DisplacementMap::generate(&g, Rect::new(0.0, 0.0, 1.0, 1.0), 2.0).unwrap();
    assert_eq!(map.texels()[0], 128);
}

#[test]
fn degenerate_inputs_are_errors() {
    let g = split_garment();
    assert!(DisplacementMap::generate(&g, Rect::new(0.0, 0.0, 0.0, 5.0), 1.0).is_err());
    let empty = PreparedImage::from_premul(0, 0, Vec::new()).unwrap();
    assert!(DisplacementMap::generate(&empty, Rect::new(0.0, 0.0, 5.0, 5.0), 1.0).is_err());
}

#[test]
fn neutral_and_extreme_values_survive_quantisation() {
    assert_eq!(decode(encode(0.5)), 0.5);
    assert_eq!(decode(encode(0.0)), 0.0);
    assert_eq!(decode(encode(1.0)), 1.0);
}
