pub mod assistant;
pub mod config;
pub mod data;
pub mod debouncer;
pub mod search_filter;
pub mod selection;
pub mod ui;
pub mod utils;
pub mod views;
