use chrono::{DateTime, Utc};
use serde::Serialize;

use super::access::guard_app;
use super::evaluator::evaluate_at;
use super::guard::can_create_user;
use super::status::{license_status, upgrade_recommendations, LicenseStatusLabel};
use super::usage::aggregate_at;
use crate::models::{
    AccessDecision, AppName, LicenseUsageStats, LicenseValidation, OrganizationLicenseWithPlan,
    UserCreationValidation,
};

/// Everything derived from one license record at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSnapshot {
    pub license: Option<OrganizationLicenseWithPlan>,
    pub validation: LicenseValidation,
    pub usage: LicenseUsageStats,
    pub status: LicenseStatusLabel,
    pub recommendations: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
}

impl LicenseSnapshot {
    pub fn compute(license: Option<OrganizationLicenseWithPlan>, now: DateTime<Utc>) -> Self {
        let validation = evaluate_at(license.as_ref(), now);
        let usage = aggregate_at(license.as_ref(), now);
        let status = license_status(license.as_ref(), &validation);
        let recommendations = upgrade_recommendations(license.as_ref(), &validation, &usage);

        Self {
            license,
            validation,
            usage,
            status,
            recommendations,
            evaluated_at: now,
        }
    }

    pub fn user_creation(&self) -> UserCreationValidation {
        can_create_user(self.license.as_ref(), &self.validation, &self.usage)
    }

    pub fn has_app_access(&self, app: AppName) -> bool {
        self.validation.has_app_access(app)
    }

    pub fn app_decision(&self, app: AppName) -> AccessDecision {
        guard_app(self.license.as_ref(), &self.validation, app)
    }
}
