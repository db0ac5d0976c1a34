//! Aesyros Services Layer
//!
//! Runs license evaluation against a [`LicenseRepository`](aesyros_core::LicenseRepository):
//! a cached fetch → evaluate service, a per-watcher tracker that drops stale
//! responses, and an in-memory repository for tests and offline use.

pub mod events;
pub mod license_service;
pub mod memory;
pub mod tracker;

pub use events::{license_events, LICENSE_EVENT_TARGET};
pub use license_service::{access_denial, creation_denial, LicenseService};
pub use memory::InMemoryLicenseRepository;
pub use tracker::LicenseTracker;
