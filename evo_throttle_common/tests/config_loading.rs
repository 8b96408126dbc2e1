//! Integration tests for loading `ThrottleConfig` from a file on disk.

use std::io::Write;

use tempfile::NamedTempFile;

use evo_throttle_common::config::ThrottleConfig;
use evo_throttle_common::error::ThrottleError;

#[test]
fn loads_full_config_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "delay_enable = true").unwrap();
    writeln!(file, "delay_step = 7").unwrap();
    writeln!(file, "delay_ceiling = 140").unwrap();
    file.flush().unwrap();

    let config = ThrottleConfig::load(file.path()).unwrap();
    assert_eq!(config.delay_step, 7);
    assert_eq!(config.delay_ceiling, 140);
}

#[test]
fn rejects_invalid_config_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "delay_step = 999").unwrap();
    writeln!(file, "delay_ceiling = 100").unwrap();
    file.flush().unwrap();

    let err = ThrottleConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ThrottleError::Validation(_)));
}
