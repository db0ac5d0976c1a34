//! Derived, non-persisted license summaries
//!
//! These are computed per call from an [`OrganizationLicenseWithPlan`](super::OrganizationLicenseWithPlan)
//! and serialized in camelCase for UI callers.

use serde::{Deserialize, Serialize};

use super::app::AppName;
use super::license::LicenseStatus;
use super::plan::LicensePlan;

/// Validity, access and capacity of a license at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseValidation {
    pub is_valid: bool,
    pub can_add_users: bool,
    /// `None` when seats are not counted (organization pricing or unlimited cap)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_users: Option<u32>,
    pub is_trial_expired: bool,
    pub is_subscription_expired: bool,
    pub errors: Vec<String>,
    /// Apps included in the license plan
    pub accessible_apps: Vec<AppName>,
}

impl LicenseValidation {
    pub fn has_app_access(&self, app: AppName) -> bool {
        self.accessible_apps.contains(&app)
    }

    pub fn is_expired(&self) -> bool {
        self.is_trial_expired || self.is_subscription_expired
    }
}

/// Seat usage and expiry summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseUsageStats {
    pub current_users: u32,
    /// `None` means unlimited
    pub max_users: Option<u32>,
    pub usage_percentage: u32,
    pub apps_enabled: Vec<AppName>,
    pub subscription_status: LicenseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
    pub is_over_limit: bool,
}

/// Verdict on provisioning one more seat
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreationValidation {
    pub can_create: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_required: Option<bool>,
}

impl UserCreationValidation {
    pub fn allowed() -> Self {
        Self {
            can_create: true,
            ..Default::default()
        }
    }

    pub fn blocked(reason: impl Into<String>, suggested_action: impl Into<String>) -> Self {
        Self {
            can_create: false,
            reason: Some(reason.into()),
            suggested_action: Some(suggested_action.into()),
            upgrade_required: Some(true),
        }
    }

    pub fn warning(reason: impl Into<String>, suggested_action: impl Into<String>) -> Self {
        Self {
            can_create: true,
            reason: Some(reason.into()),
            suggested_action: Some(suggested_action.into()),
            upgrade_required: None,
        }
    }

    /// Whether the caller must act (upgrade/renew) before provisioning.
    pub fn requires_upgrade(&self) -> bool {
        self.upgrade_required.unwrap_or(false)
    }
}

/// Outcome of gating an app behind the organization's license
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    Granted,
    /// The plan does not include the app
    AppNotIncluded { app: AppName },
    /// Trial or subscription end date has passed
    Expired { errors: Vec<String> },
    /// License missing, suspended or otherwise unusable
    Invalid { errors: Vec<String> },
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }
}

/// Plans that would relieve the organization's current constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicensePlanComparison {
    pub current_plan: LicensePlan,
    pub suggested_plans: Vec<LicensePlan>,
    pub reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_serializes_camel_case() {
        let validation = LicenseValidation {
            is_valid: true,
            can_add_users: true,
            remaining_users: None,
            is_trial_expired: false,
            is_subscription_expired: false,
            errors: vec![],
            accessible_apps: vec![AppName::Flow],
        };
        let value = serde_json::to_value(&validation).unwrap();
        assert_eq!(value["isValid"], true);
        assert_eq!(value["accessibleApps"][0], "flow");
        assert!(value.get("remainingUsers").is_none());
        assert!(validation.has_app_access(AppName::Flow));
        assert!(!validation.has_app_access(AppName::Drive));
    }

    #[test]
    fn test_user_creation_constructors() {
        assert!(UserCreationValidation::allowed().can_create);
        assert!(!UserCreationValidation::allowed().requires_upgrade());

        let blocked = UserCreationValidation::blocked("full", "upgrade");
        assert!(!blocked.can_create);
        assert!(blocked.requires_upgrade());

        let warning = UserCreationValidation::warning("close", "consider");
        assert!(warning.can_create);
        assert_eq!(warning.upgrade_required, None);
    }

    #[test]
    fn test_access_decision_tagging() {
        let value = serde_json::to_value(AccessDecision::AppNotIncluded {
            app: AppName::Pulse,
        })
        .unwrap();
        assert_eq!(value["decision"], "app_not_included");
        assert_eq!(value["app"], "pulse");
    }
}
