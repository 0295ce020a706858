//! Configuration module
//!
//! Settings file handling: display, map view, assistant service and
//! runtime behavior.

pub mod config;

pub use config::{Config, ViewMode};
