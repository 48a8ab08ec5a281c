//! Single-track audio playback controller.
//!
//! Arbitrates the shared output device through audio focus, owns the one
//! render engine and its wake lock, and reduces asynchronous hardware
//! callbacks to a four-state model reported to an observer.

pub mod config;
pub mod playback;
pub mod probe;
pub mod service;
pub mod sim;
pub mod ui;

/// Initialize the application directories
pub fn init_app_dirs() -> std::io::Result<()> {
    let default_path = config::Settings::default_path();
    if let Some(config_dir) = default_path.parent() {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir)?;
        }
    }
    Ok(())
}
