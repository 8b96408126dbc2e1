//! Shared constants, error types, and configuration loading for the zone
//! throttle.
//!
//! This crate provides the parts of `evo_zone_throttle` that are pure data:
//! the tunable timing constants, the `thiserror`-derived error taxonomy, and
//! the TOML-loadable configuration struct. It carries no control-loop logic
//! of its own.
//!
//! # Module Structure
//!
//! - [`consts`] — timing constants and tunable defaults
//! - [`error`] — `ThrottleError`, the crate's only fallible surface
//! - [`config`] — `ThrottleConfig` loading and validation
//! - [`prelude`] — common re-exports for convenience

pub mod config;
pub mod consts;
pub mod error;
pub mod prelude;
