use std::io::Cursor;
use std::rc::Rc;

use super::*;
use crate::assets::loader::ManualClock;
use crate::assets::source::MemoryAssetSource;
use crate::foundation::core::Vec2;
use crate::foundation::notice::NoticeKind;
use crate::geometry::units::{CanvasLayout, PhysicalSize};
use crate::model::placeholder::Placeholder;
use crate::persist::MemorySink;

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

// 64x48 canvas, 8 px padding, 4x4 in garments: 8 px per inch. The chest region is 16..32 px.
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

fn views() -> Vec<ViewSpec> {
    ["front", "back"]
        .into_iter()
        .map(|id| {
            let mut v = ViewSpec::new(id);
            v.garment_url = Some(format!("{id}.png"));
            v.physical = Some(PhysicalSize {
                width_in: 4.0,
                height_in: 4.0,
            });
            if id == "front" {
                v.placeholders.push(Placeholder::rect("chest", 1.0, 1.0, 2.0, 2.0));
            }
            v
        })
        .collect()
}

fn source() -> MemoryAssetSource {
    MemoryAssetSource::new()
        .with("front.png", png(16, 16, [200, 200, 200, 255]))
        .with("back.png", png(16, 16, [90, 90, 90, 255]))
        .with("logo.png", png(4, 2, [0, 0, 255, 255]))
}

fn session() -> MockupSession {
    MockupSession::new(config(), views()).unwrap()
}

fn chest() -> PlaceholderId {
    PlaceholderId::from("chest")
}

fn view(id: &str) -> ViewId {
    ViewId::from(id)
}

fn live(frame: &FrameResult) -> &FrameRGBA {
    match &frame.image {
        FrameImage::Live(f) => f,
        FrameImage::Cached(s) => panic!("expected a live frame, got {s:?}"),
    }
}

#[test]
fn assets_load_through_tickets() {
    let mut s = session();
    let mut sink = MemorySink::new();
    let src = source();

    let first = s.render_frame(RenderMode::Preview, &mut sink).unwrap();
    assert_eq!(live(&first).pixel(32, 24), Some([0, 0, 0, 0]));
    assert_eq!(s.pending_loads(), 1);

    assert_eq!(s.pump_loads(&src), 1);
    let second = s.render_frame(RenderMode::Preview, &mut sink).unwrap();
    assert_eq!(live(&second).pixel(32, 24), Some([200, 200, 200, 255]));
    assert!(second.overlay.is_none());
    assert!(s.drain_notices().is_empty());
}

#[test]
fn colour_change_dirties_every_view_without_persisting() {
    let mut s = session();
    let mut sink = MemorySink::new();
    s.pump_loads(&source());

    s.set_garment_color(Some("#ff0000"));
    assert!(s.cache().is_color_dirty(&view("front")));
    assert!(s.cache().is_color_dirty(&view("back")));
    s.request_loads(&view("front")).unwrap();
    s.pump_loads(&source());
    let frame = s.render_frame(RenderMode::Preview, &mut sink).unwrap();
    assert!(frame.persisted.is_none());
    assert_eq!(sink.snapshot_count(), 0);
    assert_eq!(live(&frame).pixel(32, 24), Some([200, 0, 0, 255]));

    s.set_garment_color(Some("not a colour"));
    assert_eq!(s.document().garment_color, None);
}

#[test]
fn design_edit_persists_once_assets_settle() {
    let mut s = session();
    let mut sink = MemorySink::new();
    let src = source();

    s.add_shape(Some(&chest()), ShapeKind::Rect).unwrap();
    assert!(s.cache().should_auto_persist(&view("front")));
    assert!(!s.cache().is_design_dirty(&view("back")));

    let pending = s.render_frame(RenderMode::Edit, &mut sink).unwrap();
    assert!(pending.persisted.is_none());
    assert!(pending.overlay.is_some());

    s.pump_loads(&src);
    let captured = s.render_frame(RenderMode::Edit, &mut sink).unwrap();
    assert!(captured.persisted.is_some());
    assert_eq!(sink.snapshot_count(), 1);
    assert!(!s.cache().should_auto_persist(&view("front")));

    let again = s.render_frame(RenderMode::Edit, &mut sink).unwrap();
    assert!(matches!(again.image, FrameImage::Cached(_)));
    assert!(again.overlay.is_some());
}

#[test]
fn failed_persist_keeps_the_view_dirty() {
    let mut s = session();
    let mut sink = MemorySink::new();
    s.request_loads(&view("front")).unwrap();
    s.pump_loads(&source());
    s.add_shape(Some(&chest()), ShapeKind::Circle).unwrap();

    sink.set_failing(true);
    let frame = s.render_frame(RenderMode::Preview, &mut sink).unwrap();
    assert!(frame.persisted.is_none());
    assert!(s.cache().is_design_dirty(&view("front")));
    let notices = s.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Persist);
    assert!(notices[0].retryable);

    sink.set_failing(false);
    let retry = s.render_frame(RenderMode::Preview, &mut sink).unwrap();
    assert!(retry.persisted.is_some());
}

#[test]
fn commands_are_undoable() {
    let mut s = session();
    let id = s.add_shape(Some(&chest()), ShapeKind::Heart).unwrap();
    let x0 = s.document().element(&id).unwrap().x;
    assert!(s.nudge(&id, 1, 0).unwrap());
    assert_eq!(s.undo_label(), Some("nudge"));

    assert!(s.undo());
    assert_eq!(s.document().element(&id).unwrap().x, x0);
    assert!(s.undo());
    assert!(s.document().element(&id).is_none());
    assert_eq!(s.selected(), None);
    assert!(!s.undo());

    assert!(s.redo());
    assert!(s.document().element(&id).is_some());
    assert!(s.can_redo());
}

#[test]
fn pointer_gesture_records_one_history_step() {
    let mut s = session();
    let id = s.add_shape(Some(&chest()), ShapeKind::Rect).unwrap();
    let before = s.document().element(&id).unwrap().origin();

    let target = s.pointer_down(Point::new(24.0, 24.0)).unwrap();
    assert_eq!(target, PointerTarget::Gesture(id.clone()));
    s.pointer_move(Point::new(24.5, 24.0)).unwrap();
    s.pointer_move(Point::new(25.0, 25.0)).unwrap();
    let end = s.pointer_up().unwrap().unwrap();
    assert!(end.changed);
    assert_eq!(s.undo_label(), Some("move"));
    assert_eq!(
        s.document().element(&id).unwrap().origin(),
        before + Vec2::new(1.0, 1.0)
    );

    assert!(s.undo());
    assert_eq!(s.document().element(&id).unwrap().origin(), before);
}

#[test]
fn panel_edits_wait_for_the_gesture() {
    let mut s = session();
    let id = s.add_shape(Some(&chest()), ShapeKind::Rect).unwrap();
    s.pointer_down(Point::new(24.0, 24.0)).unwrap();

    let red = ElementUpdate {
        fill: Some(Rgb8::new(255, 0, 0)),
        ..ElementUpdate::default()
    };
    assert_eq!(s.update_element(&id, &red).unwrap(), EditOutcome::Busy);
    assert_eq!(
        s.programmatic_update(&id, red.clone()).unwrap(),
        EditOutcome::Queued
    );
    assert!(!s.undo());

    s.pointer_up().unwrap();
    match &s.document().element(&id).unwrap().kind {
        ElementKind::Shape(sh) => assert_eq!(sh.fill, Some(Rgb8::new(255, 0, 0))),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn view_switch_drops_late_results() {
    let mut s = session();
    let tickets = s.request_loads(&view("front")).unwrap();
    assert_eq!(tickets.len(), 1);

    s.switch_view(&view("back")).unwrap();
    assert_eq!(s.pending_loads(), 0);
    let img = decode_image(&png(2, 2, [1, 2, 3, 255])).unwrap();
    assert!(!s.complete_load(&tickets[0], Ok(img)));
    assert!(s.assets().state(AssetKind::Garment, "front.png").is_none());

    let mut sink = MemorySink::new();
    s.render_frame(RenderMode::Preview, &mut sink).unwrap();
    assert_eq!(s.pump_loads(&source()), 1);
    assert!(s.assets().image(AssetKind::Garment, "back.png").is_some());
    assert!(s.switch_view(&view("side")).is_err());
}

#[test]
fn slow_loads_time_out_with_one_notice() {
    let clock = Rc::new(ManualClock::new(0));
    let mut s = session().with_clock(Box::new(clock.clone()));
    let mut sink = MemorySink::new();

    let tickets = s.request_loads(&view("front")).unwrap();
    clock.advance(10_001);
    s.render_frame(RenderMode::Preview, &mut sink).unwrap();
    s.render_frame(RenderMode::Preview, &mut sink).unwrap();

    let notices = s.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::AssetLoad);
    assert_eq!(notices[0].url.as_deref(), Some("front.png"));
    assert!(s.assets().failure(AssetKind::Garment, "front.png").is_some());

    let img = decode_image(&png(2, 2, [1, 2, 3, 255])).unwrap();
    assert!(!s.complete_load(&tickets[0], Ok(img)));

    s.retry_failed_loads();
    s.render_frame(RenderMode::Preview, &mut sink).unwrap();
    assert_eq!(s.pump_loads(&source()), 1);
}

#[test]
fn images_are_fetched_when_added() {
    let mut s = session();
    let src = source();
    let id = s.add_image(Some(&chest()), "logo.png", &src).unwrap();
    match &s.document().element(&id).unwrap().kind {
        ElementKind::Image(img) => assert_eq!((img.width, img.height), (16.0, 8.0)),
        other => panic!("unexpected {other:?}"),
    }

    assert!(s.add_image(None, "missing.png", &src).is_err());
    let notices = s.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].url.as_deref(), Some("missing.png"));
}

#[test]
fn save_captures_every_dirty_view() {
    let mut s = session();
    let mut sink = MemorySink::new();
    s.add_shape(Some(&chest()), ShapeKind::Star).unwrap();
    s.set_garment_color(Some("#222222"));

    let report = s.save(&mut sink, &source()).unwrap();
    assert_eq!(report.snapshots.len(), 2);
    assert!(report.failed.is_empty());
    assert!(s.cache().dirty_views().is_empty());

    let saved = sink.design().unwrap();
    let restored = MockupSession::from_saved(config(), views(), saved).unwrap();
    assert_eq!(
        restored.document().to_persisted(),
        s.document().to_persisted()
    );
}
