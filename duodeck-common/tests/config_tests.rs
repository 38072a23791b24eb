//! Configuration loading and validation
//!
//! Note: Uses serial_test for tests that point XDG_CONFIG_HOME at a
//! temporary directory, so they never run in parallel with each other.

use duodeck_common::config::{Config, ConfigSource, SkipTransport};
use duodeck_common::FadeCurve;
use serial_test::serial;
use std::env;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_empty_document_yields_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.decks.ports, [6601, 6602]);
    assert_eq!(config.crossfade.fade_steps, 50);
    assert_eq!(config.button.pin, 17);
    assert_eq!(config.control.skip_transport, SkipTransport::Http);
}

#[test]
fn test_partial_sections_keep_other_defaults() {
    let config = Config::from_toml_str(
        r#"
        [crossfade]
        overlap_seconds = 20
        fade_seconds = 8

        [button]
        fade_curve = "cosine"
        "#,
    )
    .unwrap();

    assert_eq!(config.crossfade.overlap(), Duration::from_secs(20));
    assert_eq!(config.crossfade.fade(), Duration::from_secs(8));
    assert_eq!(config.crossfade.immediate_fade(), Duration::from_secs(3));
    assert_eq!(config.button.fade_curve, FadeCurve::SCurve);
    assert_eq!(config.button.hold(), Duration::from_secs(2));
}

#[test]
fn test_full_document() {
    let config = Config::from_toml_str(
        r#"
        [logging]
        level = "debug"

        [decks]
        host = "jukebox.local"
        ports = [7001, 7002]

        [playlist]
        file = "/srv/music/playlist.txt"
        music_root = "/srv/music"

        [control]
        listen = "0.0.0.0:6000"
        skip_transport = "signal"
        service_name = "xc.service"
        use_sudo = false
        "#,
    )
    .unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.decks.host.as_deref(), Some("jukebox.local"));
    assert_eq!(config.decks.ports, [7001, 7002]);
    assert_eq!(config.control.listen.port(), 6000);
    assert_eq!(config.control.skip_transport, SkipTransport::Signal);
    assert!(!config.control.use_sudo);
    config.validate().unwrap();
}

#[test]
fn test_malformed_toml_is_config_error() {
    let err = Config::from_toml_str("[crossfade\noverlap_seconds = 1").unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}

#[test]
fn test_validation_rejects_same_ports() {
    let mut config = Config::default();
    config.decks.ports = [6601, 6601];
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("6601"));
}

#[test]
fn test_validation_rejects_fade_longer_than_overlap() {
    let mut config = Config::default();
    config.crossfade.fade_seconds = 20.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_rejects_oversized_durations() {
    let config = Config::from_toml_str("[crossfade]\noverlap_seconds = 1e20\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("crossfade.overlap_seconds"));

    let mut config = Config::default();
    config.button.hold_seconds = 1e300;
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_rejects_zero_double_press_window() {
    let mut config = Config::default();
    config.button.double_press_window_seconds = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = Config::load(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_explicit_file_is_loaded_and_validated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("duodeck.toml");
    fs::write(&path, "[decks]\nports = [6601, 6601]\n").unwrap();
    assert!(Config::load(Some(&path)).is_err());

    fs::write(&path, "[crossfade]\nbase_volume = 80\n").unwrap();
    let (config, source) = Config::load(Some(&path)).unwrap();
    assert_eq!(config.crossfade.base_volume, 80);
    assert_eq!(source, ConfigSource::File(path));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_user_config_dir_is_searched() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("duodeck");
    fs::create_dir_all(&config_dir).unwrap();
    let path = config_dir.join("config.toml");
    fs::write(&path, "[button]\npin = 27\n").unwrap();

    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());
    let loaded = Config::load(None);
    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    let (config, source) = loaded.unwrap();
    assert_eq!(config.button.pin, 27);
    assert_eq!(source, ConfigSource::File(path));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_no_config_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());
    let loaded = Config::load(None);
    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    let (config, source) = loaded.unwrap();
    // A system-wide /etc/duodeck/config.toml would legitimately win here
    if source == ConfigSource::Defaults {
        assert_eq!(config, Config::default());
    }
}
