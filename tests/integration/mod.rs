//! Integration tests module
//!
//! Drives the public API end to end on the simulated platform.

pub mod config_test;
pub mod playback_flow_test;
pub mod service_test;
