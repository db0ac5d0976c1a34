//! Status labels and upgrade advice shown next to license badges

use serde::Serialize;

use crate::constants::{RENEWAL_WARNING_DAYS, UPGRADE_RECOMMENDATION_USAGE_PERCENT};
use crate::models::{
    LicenseStatus, LicenseUsageStats, LicenseValidation, OrganizationLicenseWithPlan,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LicenseStatusLabel {
    #[serde(rename = "No License")]
    NoLicense,
    #[serde(rename = "Trial Expired")]
    TrialExpired,
    #[serde(rename = "Subscription Expired")]
    SubscriptionExpired,
    Suspended,
    Trial,
    Active,
    Unknown,
}

impl LicenseStatusLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatusLabel::NoLicense => "No License",
            LicenseStatusLabel::TrialExpired => "Trial Expired",
            LicenseStatusLabel::SubscriptionExpired => "Subscription Expired",
            LicenseStatusLabel::Suspended => "Suspended",
            LicenseStatusLabel::Trial => "Trial",
            LicenseStatusLabel::Active => "Active",
            LicenseStatusLabel::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for LicenseStatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date-based expiry outranks the stored status.
pub fn license_status(
    license: Option<&OrganizationLicenseWithPlan>,
    validation: &LicenseValidation,
) -> LicenseStatusLabel {
    let Some(record) = license else {
        return LicenseStatusLabel::NoLicense;
    };

    if validation.is_trial_expired {
        return LicenseStatusLabel::TrialExpired;
    }
    if validation.is_subscription_expired {
        return LicenseStatusLabel::SubscriptionExpired;
    }

    match record.status() {
        LicenseStatus::Suspended => LicenseStatusLabel::Suspended,
        LicenseStatus::Trial => LicenseStatusLabel::Trial,
        LicenseStatus::Active => LicenseStatusLabel::Active,
        LicenseStatus::Expired => LicenseStatusLabel::Unknown,
    }
}

pub fn upgrade_recommendations(
    license: Option<&OrganizationLicenseWithPlan>,
    validation: &LicenseValidation,
    usage: &LicenseUsageStats,
) -> Vec<String> {
    let Some(record) = license else {
        return Vec::new();
    };

    let mut recommendations = Vec::new();

    if usage.usage_percentage > UPGRADE_RECOMMENDATION_USAGE_PERCENT {
        recommendations.push("Consider upgrading to increase user limit".to_string());
    }

    if record.status() == LicenseStatus::Trial && validation.is_trial_expired {
        recommendations.push("Trial has expired - upgrade to continue service".to_string());
    }

    if usage
        .days_until_expiry
        .is_some_and(|days| days <= RENEWAL_WARNING_DAYS)
    {
        recommendations.push(
            "Subscription expires soon - renew to avoid service interruption".to_string(),
        );
    }

    recommendations
}
