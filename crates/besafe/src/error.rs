//! Error types for besafe.
//!
//! Library-level failures (configuration, media directory, permissions,
//! report rendering) live in [`Error`]. Failures of individual platform
//! capability calls are reported through [`crate::platform::CapabilityError`]
//! and are normally converted into a degraded workflow path instead of being
//! propagated.

use std::path::PathBuf;
use thiserror::Error;

use crate::platform::CapabilityError;

/// The main error type for besafe operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Platform Errors ===
    /// Required platform permission is missing.
    #[error("missing permission: {permission}. {instructions}")]
    PermissionMissing {
        /// Name of the required permission.
        permission: String,
        /// Instructions for granting the permission.
        instructions: String,
    },

    /// A platform capability could not be set up.
    #[error("capability '{name}' unavailable: {source}")]
    Capability {
        /// Name of the capability.
        name: &'static str,
        /// The underlying capability error.
        #[source]
        source: CapabilityError,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// A report could not be rendered as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for besafe operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a permission missing error with instructions.
    #[must_use]
    pub fn permission_missing(
        permission: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self::PermissionMissing {
            permission: permission.into(),
            instructions: instructions.into(),
        }
    }

    /// Wrap a capability error with the capability's name.
    #[must_use]
    pub fn capability(name: &'static str, source: CapabilityError) -> Self {
        Self::Capability { name, source }
    }

    /// Check if this error is a permission issue.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionMissing { .. })
            || matches!(
                self,
                Self::Capability {
                    source: CapabilityError::PermissionDenied(_),
                    ..
                }
            )
    }
}
