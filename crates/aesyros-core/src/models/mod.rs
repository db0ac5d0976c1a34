//! Data models for licensing
//!
//! Persisted rows (plans, organization licenses, app access overrides, seat
//! assignments) and the derived summaries computed from them.

mod app;
mod event;
mod features;
mod license;
mod plan;
mod validation;

// Re-export all models for convenient imports
pub use app::*;
pub use event::*;
pub use features::*;
pub use license::*;
pub use plan::*;
pub use validation::*;
