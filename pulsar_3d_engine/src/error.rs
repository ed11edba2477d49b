//! Error types for the Pulsar3D engine
//!
//! This module defines the error types used throughout the engine,
//! covering precondition violations in the device-object machinery,
//! backend failures, and recoverable presentation conditions.

use std::fmt;

/// Result type for Pulsar3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pulsar3D engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A core invariant was violated by the caller (empty device object
    /// visited, render pass without attachments, wrong payload kind, ...).
    /// These are programmer errors and are fatal to the current operation.
    InvalidOperation(String),

    /// Backend-specific error (Vulkan, DirectX, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// The GPU device was lost
    DeviceLost,

    /// The requested operation or format is not supported by the device
    Unsupported(String),

    /// Initialization failed (engine, renderer, subsystems)
    InitializationFailed(String),

    /// The swap chain no longer matches the surface and must be rebuilt.
    /// Recoverable: the caller recreates the swap chain and retries.
    SwapchainOutOfDate,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::DeviceLost => write!(f, "GPU device lost"),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::SwapchainOutOfDate => write!(f, "Swap chain out of date"),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
