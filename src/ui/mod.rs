//! Terminal interface: event loop, panel renderers and the coordinator
//! that keeps the filter, selection, table and map in step.

pub mod app;
pub mod chat_panel;
pub mod map_renderer;
pub mod popups;
pub mod state_coordinator;
pub mod table_renderer;

pub use app::run_tui;
pub use state_coordinator::StateCoordinator;
