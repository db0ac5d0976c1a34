//! Seat cap resolution
//!
//! Every seat computation (validation, usage, creation guard, recommendations)
//! goes through [`effective_cap`] so the override-or-plan rule is applied in one
//! place. A stored cap of `0` is a real cap of zero seats, not "unlimited".

use crate::constants::SOFT_LIMIT_REMAINING_PERCENT;
use crate::models::OrganizationLicenseWithPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatCap {
    Limited(u32),
    Unlimited,
}

impl SeatCap {
    pub fn from_columns(license_override: Option<i32>, plan_cap: Option<i32>) -> Self {
        match license_override.or(plan_cap) {
            Some(cap) => SeatCap::Limited(clamp_count(cap)),
            None => SeatCap::Unlimited,
        }
    }

    pub fn limit(&self) -> Option<u32> {
        match self {
            SeatCap::Limited(cap) => Some(*cap),
            SeatCap::Unlimited => None,
        }
    }

    /// True while at least one more seat fits under the cap.
    pub fn has_room(&self, current: u32) -> bool {
        match self {
            SeatCap::Limited(cap) => current < *cap,
            SeatCap::Unlimited => true,
        }
    }

    pub fn is_exceeded_by(&self, current: u32) -> bool {
        match self {
            SeatCap::Limited(cap) => current > *cap,
            SeatCap::Unlimited => false,
        }
    }

    pub fn remaining(&self, current: u32) -> Option<u32> {
        self.limit().map(|cap| cap.saturating_sub(current))
    }

    /// `round(current / cap * 100)`, half rounded up. A zero cap is full as soon
    /// as anyone holds a seat.
    pub fn usage_percentage(&self, current: u32) -> u32 {
        match self {
            SeatCap::Unlimited => 0,
            SeatCap::Limited(0) => {
                if current > 0 {
                    100
                } else {
                    0
                }
            }
            SeatCap::Limited(cap) => {
                let cap = u64::from(*cap);
                let pct = (200 * u64::from(current) + cap) / (2 * cap);
                u32::try_from(pct).unwrap_or(u32::MAX)
            }
        }
    }

    /// `ceil(cap * 20%)`: remaining seats at or below this are "approaching the limit".
    pub fn soft_warning_threshold(&self) -> Option<u32> {
        self.limit().map(|cap| {
            let threshold =
                (u64::from(cap) * u64::from(SOFT_LIMIT_REMAINING_PERCENT)).div_ceil(100);
            u32::try_from(threshold).unwrap_or(cap)
        })
    }
}

impl std::fmt::Display for SeatCap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeatCap::Limited(cap) => write!(f, "{}", cap),
            SeatCap::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// `license.max_users ?? license_plan.max_users`
pub fn effective_cap(record: &OrganizationLicenseWithPlan) -> SeatCap {
    SeatCap::from_columns(record.license.max_users, record.license_plan.max_users)
}

/// `current_user_count ?? 0`, with negative counts treated as zero
pub fn current_users(record: &OrganizationLicenseWithPlan) -> u32 {
    record
        .license
        .current_user_count
        .map(clamp_count)
        .unwrap_or(0)
}

fn clamp_count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}
