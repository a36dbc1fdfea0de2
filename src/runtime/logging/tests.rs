use std::fs;

use tempfile::tempdir;
use tracing::warn;

use super::*;

#[test]
fn disabled_logging_installs_nothing() {
    let settings = LoggingSettings {
        enabled: false,
        ..LoggingSettings::default()
    };
    assert!(init(&settings).unwrap().is_none());
}

#[test]
fn log_lines_land_in_the_configured_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state").join("atelier.log");
    let settings = LoggingSettings {
        file: Some(path.clone()),
        level: "warn".to_string(),
        enabled: true,
    };

    let guard = init(&settings).unwrap();
    assert!(guard.is_some());
    warn!("reel missing its soundtrack");
    // Dropping the guard flushes the background writer.
    drop(guard);

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("reel missing its soundtrack"), "log was: {written}");
}
