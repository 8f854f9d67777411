//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! portfolio test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built dates, ids and transaction histories
//! - `builders`: Builder patterns for assets and transactions
//! - `assertions`: Custom assertion helpers for rates and metrics
//! - `generators`: Property-based test data generators
//! - `logging`: Subscriber setup for test runs

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;
pub mod logging;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
pub use logging::init_test_tracing;
