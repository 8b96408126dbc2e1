//! Convenient re-exports.
//!
//! ```
//! use evo_throttle_common::prelude::*;
//! ```

pub use crate::config::ThrottleConfig;
pub use crate::consts::*;
pub use crate::error::ThrottleError;
