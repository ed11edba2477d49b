//! Unit tests for the Error module
//!
//! Verifies Display formatting and that every variant round-trips
//! through the std::error::Error trait object.

use crate::error::Error;

#[test]
fn test_display_invalid_operation() {
    let err = Error::InvalidOperation("visited empty device object".to_string());
    assert_eq!(
        err.to_string(),
        "Invalid operation: visited empty device object"
    );
}

#[test]
fn test_display_backend_error() {
    let err = Error::BackendError("vkCreateBuffer failed".to_string());
    assert_eq!(err.to_string(), "Backend error: vkCreateBuffer failed");
}

#[test]
fn test_display_simple_variants() {
    assert_eq!(Error::OutOfMemory.to_string(), "Out of GPU memory");
    assert_eq!(Error::DeviceLost.to_string(), "GPU device lost");
    assert_eq!(
        Error::SwapchainOutOfDate.to_string(),
        "Swap chain out of date"
    );
}

#[test]
fn test_display_unsupported_and_init() {
    assert_eq!(
        Error::Unsupported("surface has no present queue".to_string()).to_string(),
        "Unsupported: surface has no present queue"
    );
    assert_eq!(
        Error::InitializationFailed("no GPU".to_string()).to_string(),
        "Initialization failed: no GPU"
    );
}

#[test]
fn test_error_trait_object() {
    // Errors must be usable behind dyn Error for callers that box them
    let err: Box<dyn std::error::Error> = Box::new(Error::OutOfMemory);
    assert_eq!(err.to_string(), "Out of GPU memory");
}

#[test]
fn test_equality() {
    assert_eq!(Error::SwapchainOutOfDate, Error::SwapchainOutOfDate);
    assert_ne!(
        Error::InvalidOperation("a".to_string()),
        Error::InvalidOperation("b".to_string())
    );
}
