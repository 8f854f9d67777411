//! Ports and Adapters Infrastructure
//!
//! Domain crates describe what they need from storage as a port trait
//! (for example `PortfolioPort` in `domain_portfolio`). Adapters implement
//! that trait against a database, a remote API or memory, and report failures
//! through the single [`PortError`] type defined here.
//!
//! ```text
//!   PortfolioService ──▶ PortfolioPort (trait) ◀── adapter (SQL, mock, ...)
//! ```
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait PortfolioPort: DomainPort {
//!     async fn get_asset(&self, id: AssetId) -> Result<Asset, PortError>;
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// All port implementations report failures through this type so that
/// services can tell "missing" apart from "storage is down".
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. })
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared across tokio tasks, so every port must be thread-safe.
pub trait DomainPort: Send + Sync + 'static {}
