//! Licensing and entitlement rules
//!
//! Pure, synchronous functions over an [`OrganizationLicenseWithPlan`](crate::models::OrganizationLicenseWithPlan).
//! Nothing here performs I/O or holds state, so results can be recomputed on
//! every check from any thread. Functions suffixed `_at` take the evaluation
//! instant explicitly; the unsuffixed variants read the wall clock.

pub mod access;
pub mod comparison;
pub mod evaluator;
pub mod guard;
pub mod seats;
pub mod snapshot;
pub mod status;
pub mod usage;

#[cfg(test)]
pub(crate) mod fixtures;

pub use access::{guard_app, has_app_access, resolve_app_access};
pub use comparison::compare_plans;
pub use evaluator::{evaluate, evaluate_at};
pub use guard::can_create_user;
pub use seats::{current_users, effective_cap, SeatCap};
pub use snapshot::LicenseSnapshot;
pub use status::{license_status, upgrade_recommendations, LicenseStatusLabel};
pub use usage::{aggregate, aggregate_at, days_until};
