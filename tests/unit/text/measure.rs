use super::*;

fn text(s: &str, size: f64) -> TextProps {
    TextProps {
        text: s.to_string(),
        font_family: "Arial".to_string(),
        font_size: size,
        font_style: FontStyle::Normal,
        fill: crate::foundation::core::Rgb8::BLACK,
        align: Default::default(),
        letter_spacing: 0.0,
        curve: Default::default(),
    }
}

#[test]
fn approx_box_uses_advance_and_line_height() {
    let m = ApproxTextMeasure::default();
    let b = measure_text_box(&m, &text("SALE", 48.0));
    assert!((b.x - 4.0 * 0.6 * 48.0).abs() < 1e-9);
    assert!((b.y - 48.0 * 1.2).abs() < 1e-9);
}

#[test]
fn letter_spacing_counts_gaps_not_chars() {
    let m = ApproxTextMeasure::default();
    let mut t = text("ABCD", 10.0);
    let base = straight_text_width(&m, &t);
    t.letter_spacing = 3.0;
    assert!((straight_text_width(&m, &t) - (base + 9.0)).abs() < 1e-9);
}

#[test]
fn empty_text_keeps_a_draggable_box() {
    let m = ApproxTextMeasure::default();
    let b = measure_text_box(&m, &text("", 40.0));
    assert_eq!(b, Vec2::new(20.0, 40.0));
}

#[test]
fn multiline_uses_widest_line() {
    let m = ApproxTextMeasure::default();
    let b = measure_text_box(&m, &text("AB\nABCD", 10.0));
    assert!((b.x - 24.0).abs() < 1e-9);
    assert!((b.y - 24.0).abs() < 1e-9);
}

#[test]
fn radius_bounds_follow_curve_shape() {
    let region = Rect::new(0.0, 0.0, 300.0, 100.0);
    assert_eq!(
        curve_radius_bounds(100.0, region, CurveShape::ArchUp),
        (50.0, 150.0)
    );
    assert_eq!(
        curve_radius_bounds(60.0, region, CurveShape::Circle),
        (30.0, 50.0)
    );
    // Text wider than the region allows: upper bound wins.
    assert_eq!(
        curve_radius_bounds(400.0, region, CurveShape::ArchDown),
        (150.0, 150.0)
    );
    assert_eq!(
        clamp_curve_radius(10.0, 100.0, region, CurveShape::ArchUp),
        50.0
    );
    assert_eq!(
        clamp_curve_radius(1000.0, 100.0, region, CurveShape::ArchUp),
        150.0
    );
}

#[test]
fn arch_box_is_no_wider_than_its_diameter() {
    let s = curved_text_size(10_000.0, 12.0, 50.0, CurveShape::ArchUp);
    assert!((s.x - 100.0).abs() < 1e-9);
    let flat = curved_text_size(1.0, 12.0, 1000.0, CurveShape::ArchUp);
    assert!((flat.x - 1.0).abs() < 1e-6);
    assert!(flat.y >= 12.0);
}

#[test]
fn parley_measure_falls_back_without_fonts() {
    let m = ParleyTextMeasure::new(FontBook::new(), ApproxTextMeasure::default());
    let approx = ApproxTextMeasure::default();
    assert_eq!(
        m.line_advance("SALE", "Arial", 48.0, FontStyle::Normal),
        approx.line_advance("SALE", "Arial", 48.0, FontStyle::Normal)
    );
}
