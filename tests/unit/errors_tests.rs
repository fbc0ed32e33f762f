/*!
 * Tests for error types
 */

use anyhow::anyhow;
use scenegen::errors::{AppError, DocumentError, ProviderError};

/// Test that document errors name the offending location
#[test]
fn test_documentError_display_shouldIncludePath() {
    let error = DocumentError::MissingIdentifier {
        path: "scenes[1].shots[3]".to_string(),
        field: "shot_id",
    };

    let message = error.to_string();

    assert!(message.contains("scenes[1].shots[3]"));
    assert!(message.contains("shot_id"));
}

/// Test that only tree-building failures count as malformed
#[test]
fn test_documentError_isMalformed_shouldSeparateDecodeErrors() {
    assert!(DocumentError::NotAnObject { found: "an array" }.is_malformed());
    assert!(DocumentError::InvalidEntry { path: "scenes[0]".to_string() }.is_malformed());
    assert!(!DocumentError::InvalidJson("eof".to_string()).is_malformed());
    assert!(!DocumentError::UnsupportedFormat("a.yaml".to_string()).is_malformed());
    assert!(!DocumentError::TooLarge { size: 2, limit: 1 }.is_malformed());
}

/// Test that provider errors convert into app errors
#[test]
fn test_appError_fromProviderError_shouldWrap() {
    let error: AppError = ProviderError::ApiError {
        status_code: 429,
        message: "quota exceeded".to_string(),
    }
    .into();

    assert!(matches!(error, AppError::Provider(ProviderError::ApiError { status_code: 429, .. })));
    assert_eq!(
        error.to_string(),
        "Provider error: API responded with error: 429 - quota exceeded"
    );
}

/// Test that document errors convert into app errors
#[test]
fn test_appError_fromDocumentError_shouldWrap() {
    let error: AppError = DocumentError::InvalidJson("trailing comma".to_string()).into();

    assert!(matches!(error, AppError::Document(DocumentError::InvalidJson(_))));
    assert_eq!(error.to_string(), "Document error: Invalid JSON: trailing comma");
}

/// Test that anyhow errors keep their context chain
#[test]
fn test_appError_fromAnyhow_shouldKeepContext() {
    let error: AppError = anyhow!("disk full").context("Failed to save file").into();

    match error {
        AppError::Unknown(message) => assert_eq!(message, "Failed to save file: disk full"),
        other => panic!("Expected Unknown, got {:?}", other),
    }
}

/// Test that io errors become file errors
#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");

    let error: AppError = io.into();

    assert!(matches!(error, AppError::File(ref message) if message.contains("missing.json")));
}
