//! Table and map projections of the filtered collection.
//!
//! Both adapters are pure functions of (filtered collection, selection) and
//! never talk to each other.

pub mod map_view;
pub mod table_view;

pub use map_view::{Camera, CameraTarget, Focus, MapAdapter, MapDefaults, Marker, Viewport};
pub use table_view::{TableAdapter, TableRow};
