use chrono::{DateTime, Utc};

use super::seats::{current_users, effective_cap};
use crate::constants::MILLIS_PER_DAY;
use crate::models::{LicenseStatus, LicenseUsageStats, OrganizationLicenseWithPlan};

/// Aggregate seat usage against the current wall clock.
pub fn aggregate(license: Option<&OrganizationLicenseWithPlan>) -> LicenseUsageStats {
    aggregate_at(license, Utc::now())
}

pub fn aggregate_at(
    license: Option<&OrganizationLicenseWithPlan>,
    now: DateTime<Utc>,
) -> LicenseUsageStats {
    let Some(record) = license else {
        return LicenseUsageStats {
            current_users: 0,
            max_users: None,
            usage_percentage: 0,
            apps_enabled: Vec::new(),
            subscription_status: LicenseStatus::Expired,
            days_until_expiry: None,
            is_over_limit: false,
        };
    };

    let cap = effective_cap(record);
    let current = current_users(record);

    LicenseUsageStats {
        current_users: current,
        max_users: cap.limit(),
        usage_percentage: cap.usage_percentage(current),
        apps_enabled: record.license_plan.included_apps.clone(),
        subscription_status: record.status(),
        days_until_expiry: record
            .license
            .subscription_ends_at
            .map(|ends_at| days_until(ends_at, now)),
        is_over_limit: cap.is_exceeded_by(current),
    }
}

/// Whole days remaining, rounded up and never negative.
pub fn days_until(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (ends_at - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }
}
