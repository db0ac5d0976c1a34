//! Per-application gating

use crate::models::{
    AccessDecision, AppName, LicenseValidation, OrganizationAppAccess,
    OrganizationLicenseWithPlan,
};

/// Whether the license plan includes `app`. No license, no access.
pub fn has_app_access(license: Option<&OrganizationLicenseWithPlan>, app: AppName) -> bool {
    license.is_some_and(|record| record.license_plan.includes(app))
}

/// An explicit app access row decides when present; otherwise the plan does.
pub fn resolve_app_access(
    license: Option<&OrganizationLicenseWithPlan>,
    app_override: Option<&OrganizationAppAccess>,
    app: AppName,
) -> bool {
    match app_override {
        Some(row) if row.app_name == app => row.is_enabled,
        _ => has_app_access(license, app),
    }
}

/// Route/feature guard decision: app inclusion first, then license validity.
pub fn guard_app(
    license: Option<&OrganizationLicenseWithPlan>,
    validation: &LicenseValidation,
    app: AppName,
) -> AccessDecision {
    if license.is_none() {
        return AccessDecision::Invalid {
            errors: validation.errors.clone(),
        };
    }

    if !validation.has_app_access(app) {
        return AccessDecision::AppNotIncluded { app };
    }

    if !validation.is_valid {
        let errors = validation.errors.clone();
        return if validation.is_expired() {
            AccessDecision::Expired { errors }
        } else {
            AccessDecision::Invalid { errors }
        };
    }

    AccessDecision::Granted
}
