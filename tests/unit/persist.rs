use super::*;

#[test]
fn memory_sink_counts_revisions_per_view() {
    let mut sink = MemorySink::new();
    let front = ViewId::from("front");
    let a = sink.store_snapshot(&front, b"one").unwrap();
    let b = sink.store_snapshot(&front, b"two").unwrap();
    assert_eq!((a.revision, b.revision), (1, 2));
    assert_eq!(sink.snapshot(&front), Some(&b"two"[..]));
    assert_eq!(sink.snapshot_count(), 1);
}

#[test]
fn failing_memory_sink_keeps_previous_state() {
    let mut sink = MemorySink::new();
    let front = ViewId::from("front");
    sink.store_snapshot(&front, b"one").unwrap();
    sink.set_failing(true);
    let err = sink.store_snapshot(&front, b"two").unwrap_err();
    assert!(matches!(err, DrapeError::Persist(_)));
    assert!(err.is_retryable());
    assert!(sink.store_design("{}").is_err());
    assert_eq!(sink.snapshot(&front), Some(&b"one"[..]));
    assert_eq!(sink.snapshot_revision(&front), 1);
}

#[test]
fn dir_sink_writes_one_file_per_view() {
    let dir = std::env::temp_dir().join(format!("drape-sink-{}", std::process::id()));
    let mut sink = DirSink::new(&dir);
    let r = sink.store_snapshot(&ViewId::from("back"), b"png").unwrap();
    sink.store_design("{\"elements\":[]}").unwrap();

    assert_eq!(std::fs::read(dir.join("back.png")).unwrap(), b"png");
    assert_eq!(
        std::fs::read_to_string(dir.join(DESIGN_FILE)).unwrap(),
        "{\"elements\":[]}"
    );
    assert_eq!(r.revision, 1);
    assert!(matches!(
        sink.store_snapshot(&ViewId::from("../up"), b"x"),
        Err(DrapeError::Persist(_))
    ));

    let _ = std::fs::remove_dir_all(&dir);
}
