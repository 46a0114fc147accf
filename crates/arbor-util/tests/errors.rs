use arbor_util::errors::ArborError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = ArborError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_validation_error_display() {
    let err = ArborError::Validation {
        message: "empty group".to_string(),
    };
    assert_eq!(err.to_string(), "Invalid input: empty group");
}

#[test]
fn test_metadata_unavailable_display() {
    let err = ArborError::MetadataUnavailable {
        coordinate: "org.example:lib:jar:1.0".to_string(),
        message: "not found".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Metadata unavailable for org.example:lib:jar:1.0: not found"
    );
}

#[test]
fn test_range_unsatisfiable_display() {
    let err = ArborError::VersionRangeUnsatisfiable {
        key: "org.example:lib:jar".to_string(),
        range: "[2.0,)".to_string(),
    };
    assert_eq!(err.to_string(), "No version of org.example:lib:jar satisfies [2.0,)");
}

#[test]
fn test_config_error_display() {
    let err = ArborError::Config {
        message: "bad key".to_string(),
    };
    assert_eq!(err.to_string(), "Configuration error: bad key");
}

#[test]
fn test_recoverable_variants() {
    let unavailable = ArborError::MetadataUnavailable {
        coordinate: "g:a:jar:1".to_string(),
        message: "gone".to_string(),
    };
    let range = ArborError::VersionRangeUnsatisfiable {
        key: "g:a:jar".to_string(),
        range: "[1,2)".to_string(),
    };
    let invariant = ArborError::ConflictInvariant {
        message: "no winner".to_string(),
    };
    let validation = ArborError::Validation {
        message: "bad".to_string(),
    };
    assert!(unavailable.is_recoverable());
    assert!(range.is_recoverable());
    assert!(!invariant.is_recoverable());
    assert!(!validation.is_recoverable());
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let arbor_err: ArborError = io_err.into();
    assert!(matches!(arbor_err, ArborError::Io(_)));
}
