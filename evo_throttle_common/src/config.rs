//! TOML configuration loader for the zone throttle's tunables.
//!
//! Loads a [`ThrottleConfig`] from a TOML file or string and validates it.
//! All three tunables are process-wide and may be overridden without a
//! recompile; the four timing constants remain compile-time constants (see
//! [`crate::consts`]) since changing them would alter the algorithm's
//! documented decay semantics rather than just its aggressiveness.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_DELAY_CEILING, DEFAULT_DELAY_ENABLE, DEFAULT_DELAY_STEP};
use crate::error::ThrottleError;

/// Process-wide tunables for the delay controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThrottleConfig {
    /// Whether the throttle injects a delay at all. When `false`, entry
    /// points still update counters and latency but never sleep.
    #[serde(default = "default_delay_enable")]
    pub delay_enable: bool,

    /// Amount, in microseconds, the per-tenant delay moves by on each
    /// re-evaluation.
    #[serde(default = "default_delay_step")]
    pub delay_step: u16,

    /// Maximum per-operation delay, in microseconds.
    #[serde(default = "default_delay_ceiling")]
    pub delay_ceiling: u16,
}

const fn default_delay_enable() -> bool {
    DEFAULT_DELAY_ENABLE
}

const fn default_delay_step() -> u16 {
    DEFAULT_DELAY_STEP
}

const fn default_delay_ceiling() -> u16 {
    DEFAULT_DELAY_CEILING
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            delay_enable: DEFAULT_DELAY_ENABLE,
            delay_step: DEFAULT_DELAY_STEP,
            delay_ceiling: DEFAULT_DELAY_CEILING,
        }
    }
}

impl ThrottleConfig {
    /// Validate parameter bounds.
    ///
    /// `delay_step` of zero would make the controller inert (delay never
    /// moves); `delay_ceiling` of zero would make throttling a no-op, which
    /// is legal but almost certainly not what was intended, so both are
    /// rejected rather than silently accepted.
    pub fn validate(&self) -> Result<(), ThrottleError> {
        if self.delay_ceiling == 0 {
            return Err(ThrottleError::Validation(
                "delay_ceiling must be greater than zero".into(),
            ));
        }
        if self.delay_step == 0 {
            return Err(ThrottleError::Validation(
                "delay_step must be greater than zero".into(),
            ));
        }
        if self.delay_step > self.delay_ceiling {
            return Err(ThrottleError::Validation(format!(
                "delay_step ({}) must not exceed delay_ceiling ({})",
                self.delay_step, self.delay_ceiling
            )));
        }
        Ok(())
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ThrottleError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self, ThrottleError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ThrottleError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }
}
