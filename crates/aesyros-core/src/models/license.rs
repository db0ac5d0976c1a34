use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::app::AppName;
use super::plan::LicensePlan;

/// Subscription status of an organization license
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "license_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    Active,
    Trial,
    Expired,
    Suspended,
}

impl LicenseStatus {
    /// Active and trial licenses grant access; expired and suspended do not.
    pub fn is_usable(&self) -> bool {
        matches!(self, LicenseStatus::Active | LicenseStatus::Trial)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Active => "active",
            LicenseStatus::Trial => "trial",
            LicenseStatus::Expired => "expired",
            LicenseStatus::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One subscription per organization.
/// `current_user_count` is maintained by seat assignment and only read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationLicense {
    #[serde(default)]
    pub id: Uuid,
    pub organization_id: Uuid,
    #[serde(default)]
    pub license_plan_id: Uuid,
    pub status: LicenseStatus,
    /// Per-organization override of the plan's seat cap
    #[serde(default)]
    pub max_users: Option<i32>,
    #[serde(default)]
    pub current_user_count: Option<i32>,
    #[serde(default)]
    pub trial_ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subscription_ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub billing_contact_email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Organization license joined with its plan. This is the record every
/// evaluation function consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationLicenseWithPlan {
    #[serde(flatten)]
    pub license: OrganizationLicense,
    pub license_plan: LicensePlan,
}

impl OrganizationLicenseWithPlan {
    pub fn organization_id(&self) -> Uuid {
        self.license.organization_id
    }

    pub fn status(&self) -> LicenseStatus {
        self.license.status
    }
}

/// Explicit per-app enablement for an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrganizationAppAccess {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub app_name: AppName,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seat held by a user under an organization license
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserLicenseAssignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub organization_license_id: Uuid,
    pub assigned_apps: Vec<AppName>,
    pub is_active: bool,
    pub assigned_at: DateTime<Utc>,
}
