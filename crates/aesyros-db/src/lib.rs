//! Aesyros Database Layer
//!
//! Postgres implementation of the licensing repository plus pool setup and
//! migrations.

// Module declarations
pub mod db;
pub mod setup;

// Re-exports: Repositories
pub use db::PgLicenseRepository;

// Re-exports: Setup
pub use setup::setup_database;
