//! CLI command implementations.

pub mod common;
pub mod config;
pub mod devices;
pub mod params;
pub mod presets;
pub mod process;
pub mod realtime;
