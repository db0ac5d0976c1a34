//! Entitlement evaluation
//!
//! Derives a [`LicenseValidation`] from an organization's license record. Never
//! fails: a missing record is the most restrictive answer (invalid, no apps, no
//! seats).

use chrono::{DateTime, Utc};

use super::seats::{current_users, effective_cap};
use crate::constants::{
    ERR_LICENSE_EXPIRED, ERR_LICENSE_SUSPENDED, ERR_NO_LICENSE, ERR_SUBSCRIPTION_EXPIRED,
    ERR_TRIAL_ENDED,
};
use crate::models::{LicenseStatus, LicenseValidation, OrganizationLicenseWithPlan, PricingModel};

/// Evaluate against the current wall clock.
pub fn evaluate(license: Option<&OrganizationLicenseWithPlan>) -> LicenseValidation {
    evaluate_at(license, Utc::now())
}

pub fn evaluate_at(
    license: Option<&OrganizationLicenseWithPlan>,
    now: DateTime<Utc>,
) -> LicenseValidation {
    let Some(record) = license else {
        return LicenseValidation {
            is_valid: false,
            can_add_users: false,
            remaining_users: Some(0),
            is_trial_expired: false,
            is_subscription_expired: false,
            errors: vec![ERR_NO_LICENSE.to_string()],
            accessible_apps: Vec::new(),
        };
    };

    let status = record.status();
    let cap = effective_cap(record);
    let current = current_users(record);
    let seat_less = record.license_plan.pricing_model == PricingModel::Organization;

    let can_add_users = status.is_usable() && (seat_less || cap.has_room(current));
    let remaining_users = if seat_less {
        None
    } else {
        cap.remaining(current)
    };

    let is_trial_expired = has_passed(record.license.trial_ends_at, now);
    let is_subscription_expired = has_passed(record.license.subscription_ends_at, now);

    let mut errors = Vec::new();
    match status {
        LicenseStatus::Expired => errors.push(ERR_LICENSE_EXPIRED.to_string()),
        LicenseStatus::Suspended => errors.push(ERR_LICENSE_SUSPENDED.to_string()),
        LicenseStatus::Active | LicenseStatus::Trial => {}
    }
    if is_trial_expired {
        errors.push(ERR_TRIAL_ENDED.to_string());
    }
    if is_subscription_expired {
        errors.push(ERR_SUBSCRIPTION_EXPIRED.to_string());
    }
    if cap.is_exceeded_by(current) {
        errors.push(format!("User limit exceeded ({}/{})", current, cap));
    }

    LicenseValidation {
        is_valid: status.is_usable(),
        can_add_users,
        remaining_users,
        is_trial_expired,
        is_subscription_expired,
        errors,
        accessible_apps: record.license_plan.included_apps.clone(),
    }
}

/// Strictly in the past; an absent timestamp never expires.
pub(crate) fn has_passed(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    at.is_some_and(|at| at < now)
}
