//! Application settings and configuration management

mod settings;

pub use settings::{ConfigError, Settings};
