//! Unit tests for the logging module
//!
//! Uses a capturing logger to verify macro routing, severity ordering,
//! and file:line propagation on ERROR logs. Tests that install a global
//! logger are serialized with serial_test.

use std::sync::{Arc, Mutex};
use serial_test::serial;

use crate::engine::Engine;
use crate::log::{Logger, LogEntry, LogSeverity};

/// Logger that stores entries in a shared vector
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger {
        entries: Arc::clone(&entries),
    });
    entries
}

#[test]
#[serial]
fn test_info_macro_routes_through_logger() {
    let entries = install_capture();

    crate::engine_info!("pulsar3d::test", "hello {}", 42);

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].source, "pulsar3d::test");
    assert_eq!(captured[0].message, "hello 42");
    assert!(captured[0].file.is_none());
    assert!(captured[0].line.is_none());

    drop(captured);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_error_macro_includes_file_and_line() {
    let entries = install_capture();

    crate::engine_error!("pulsar3d::test", "boom");

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].file.is_some());
    assert!(captured[0].line.is_some());

    drop(captured);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_err_logs_and_builds_error() {
    let entries = install_capture();

    let err = crate::engine_err!("pulsar3d::test", "create failed: {}", "code 7");
    assert_eq!(
        err,
        crate::error::Error::BackendError("create failed: code 7".to_string())
    );

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);

    drop(captured);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_bail_returns_early() {
    fn failing() -> crate::error::Result<u32> {
        crate::engine_bail!("pulsar3d::test", "bailed with {}", 3);
    }

    let entries = install_capture();
    let result = failing();
    assert_eq!(
        result,
        Err(crate::error::Error::BackendError("bailed with 3".to_string()))
    );
    assert_eq!(entries.lock().unwrap().len(), 1);

    Engine::reset_logger();
}

#[test]
fn test_severity_ordering() {
    // Severity must be ordered for level filtering in custom loggers
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}
