//! Core Kernel - Foundational types shared by the portfolio crates
//!
//! This crate provides the building blocks used across the domain modules:
//! - Strongly-typed identifiers for users, assets and transactions
//! - The kernel error type
//! - Port infrastructure for swappable storage adapters

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{UserId, AssetId, TransactionId};
pub use error::CoreError;
pub use ports::{PortError, DomainPort};
