//! Aesyros Core Library
//!
//! Licensing and entitlement model for the Aesyros suite: plan and license
//! records, the pure evaluation rules that decide validity, app access and seat
//! capacity, plus the error, configuration and repository types shared by the
//! other crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod licensing;
pub mod models;
pub mod repository;

// Re-export commonly used types
pub use config::LicensingConfig;
pub use error::{AppError, LogLevel};
pub use licensing::{LicenseSnapshot, LicenseStatusLabel, SeatCap};
pub use repository::LicenseRepository;
