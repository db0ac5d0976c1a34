//! Seat provisioning policy
//!
//! Checks run in priority order and the first match wins, so hard blockers
//! (`upgrade_required = true`) are always reported before the soft warning.

use super::seats::effective_cap;
use crate::constants::ERR_NO_LICENSE;
use crate::models::{
    LicenseUsageStats, LicenseValidation, OrganizationLicenseWithPlan, UserCreationValidation,
};

pub fn can_create_user(
    license: Option<&OrganizationLicenseWithPlan>,
    validation: &LicenseValidation,
    usage: &LicenseUsageStats,
) -> UserCreationValidation {
    let Some(record) = license else {
        return UserCreationValidation::blocked(
            ERR_NO_LICENSE,
            "Contact administrator to set up licensing",
        );
    };

    if !validation.is_valid {
        return UserCreationValidation::blocked(
            validation.errors.join(", "),
            "Renew or upgrade license to continue adding users",
        );
    }

    let cap = effective_cap(record);

    if !validation.can_add_users {
        return UserCreationValidation::blocked(
            format!("User limit reached ({}/{})", usage.current_users, cap),
            "Upgrade to a higher tier or remove inactive users",
        );
    }

    if let (Some(remaining), Some(threshold)) =
        (validation.remaining_users, cap.soft_warning_threshold())
    {
        if remaining <= threshold {
            return UserCreationValidation::warning(
                format!("Approaching user limit ({}/{})", usage.current_users, cap),
                "Consider upgrading before reaching the limit",
            );
        }
    }

    UserCreationValidation::allowed()
}
