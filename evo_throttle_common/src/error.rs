//! Error type for the zone throttle.
//!
//! The throttling engine itself is infallible by design (see the crate-level
//! docs on `evo_zone_throttle::engine`): every entry point silently tolerates
//! a vanished tenant or an aborted enumeration rather than surfacing an
//! error. The only fallible surface in the whole system is configuration
//! loading, covered here.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::config::ThrottleConfig`].
#[derive(Debug, Error)]
pub enum ThrottleError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read throttle config at {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing failed.
    #[error("failed to parse throttle config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parameter validation failed after parsing.
    #[error("invalid throttle config: {0}")]
    Validation(String),
}
