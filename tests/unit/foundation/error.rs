use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DrapeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(DrapeError::persist("x").to_string().contains("persist error:"));
    assert!(DrapeError::render("x").to_string().contains("render error:"));
    assert!(
        DrapeError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    let load = DrapeError::asset_load("https://cdn/x.png", "timeout");
    assert_eq!(
        load.to_string(),
        "asset load failed for 'https://cdn/x.png': timeout"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DrapeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_io_boundary_failures_are_retryable() {
    assert!(DrapeError::persist("503").is_retryable());
    assert!(DrapeError::asset_load("u", "404").is_retryable());
    assert!(!DrapeError::validation("bad hex").is_retryable());
    assert!(!DrapeError::render("len").is_retryable());
}

#[test]
fn serde_json_errors_convert() {
    let err: DrapeError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, DrapeError::Serde(_)));
}
