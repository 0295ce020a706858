//! Paths and logging helpers

pub mod app_paths;
pub mod logging;
