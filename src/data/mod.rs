//! Organization records and the session store

pub mod organization;
pub mod seed;
pub mod store;

pub use organization::{GeoPoint, OrgStatus, Organization};
pub use store::OrganizationStore;
