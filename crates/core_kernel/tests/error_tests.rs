//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::PortError;

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("max_iterations must be positive");

    assert!(matches!(error, CoreError::Configuration(_)));
    assert!(error.to_string().contains("Configuration error"));
    assert!(error.to_string().contains("max_iterations"));
}

#[test]
fn test_port_error_conflict_display() {
    let error = PortError::conflict("transaction TXN-1 already exists");

    assert!(error.to_string().starts_with("Conflict"));
    assert!(!error.is_transient());
}

#[test]
fn test_port_error_connection_has_no_source_by_default() {
    let error = PortError::connection("feed unavailable");

    match error {
        PortError::Connection { source, .. } => assert!(source.is_none()),
        _ => panic!("Expected Connection error"),
    }
}
