//! Licensing thresholds

/// Remaining seats at or below this share of the cap trigger the soft warning.
pub const SOFT_LIMIT_REMAINING_PERCENT: u32 = 20;

/// Seat usage above this percentage triggers an upgrade recommendation.
pub const UPGRADE_RECOMMENDATION_USAGE_PERCENT: u32 = 80;

/// Subscriptions ending within this many days trigger a renewal recommendation.
pub const RENEWAL_WARNING_DAYS: i64 = 7;

pub const MILLIS_PER_DAY: i64 = 86_400_000;

// Error and reason strings surfaced to end users
pub const ERR_NO_LICENSE: &str = "No license found for organization";
pub const ERR_LICENSE_EXPIRED: &str = "License has expired";
pub const ERR_LICENSE_SUSPENDED: &str = "License is suspended";
pub const ERR_TRIAL_ENDED: &str = "Trial period has ended";
pub const ERR_SUBSCRIPTION_EXPIRED: &str = "Subscription has expired";
