//! Integration tests for configuration management
//!
//! These tests verify that settings written to disk reach the controller.

use focus_playback::config::Settings;
use std::error::Error;
use tempfile::tempdir;

#[cfg(test)]
mod config_integration_tests {
    use super::*;

    /// Test complete configuration workflow
    #[test]
    fn test_config_lifecycle() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("nested").join("config.json");

        let mut settings = Settings::default();
        settings.duck_volume = 0.35;
        settings.update_capacity = 8;
        settings.log_level = "focus_playback=debug".to_string();

        settings.validate()?;
        settings.save(&config_path)?;

        let loaded = Settings::load(&config_path)?;
        assert_eq!(loaded, settings);
        assert_eq!(loaded.volumes().duck, 0.35);
        assert_eq!(loaded.volumes().normal, 1.0);

        // Partial files fall back to defaults for missing keys
        std::fs::write(&config_path, r#"{ "normal_volume": 0.8 }"#)?;
        let partial = Settings::load(&config_path)?;
        assert_eq!(partial.normal_volume, 0.8);
        assert_eq!(partial.duck_volume, Settings::default().duck_volume);
        assert_eq!(partial.command_buffer_size, 32);

        Ok(())
    }

    /// Test invalid configuration handling
    #[test]
    fn test_invalid_config_validation() {
        let louder_duck = Settings {
            duck_volume: 0.9,
            normal_volume: 0.5,
            ..Settings::default()
        };
        assert!(louder_duck.validate().is_err());

        let no_buffer = Settings {
            command_buffer_size: 0,
            ..Settings::default()
        };
        assert!(no_buffer.validate().is_err());

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Settings::load(&path).is_err());
    }
}
