//! Database repositories for the licensing tables
//!
//! Reads only. License, plan and app access rows are maintained by billing and
//! admin tooling elsewhere.

pub mod license;

pub use license::PgLicenseRepository;
