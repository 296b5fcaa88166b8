//! # Portal Core
//!
//! Domain data for the healthcare portal:
//! - a swappable [`Store`] persisting each collection as one JSON document
//! - sequential identifiers ([`ids`])
//! - one repository per entity, with field validation and uniqueness rules
//! - the [`AppData`] facade for permission checks and cross-collection rules
//! - role-scoped views, keyword search and the dashboard summary
//!
//! **No API concerns**: sessions, credentials and HTTP belong in `portal-auth` and `api-rest`.

pub mod app_data;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod ids;
pub mod repositories;
pub mod scope;
pub mod search;
pub mod seed;
pub mod store;

pub use app_data::{AppData, HospitalRemoval};
pub use config::CoreConfig;
pub use directory::DirectoryEntry;
pub use error::{DataError, DataResult};
pub use scope::Viewer;
pub use store::{FileStore, MemoryStore, Store, StoreError, StoreResult};
