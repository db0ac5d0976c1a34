//! Plan feature flags and limits
//!
//! Plans carry an open `features` JSON document. Known keys are typed fields;
//! anything else is kept in `extra` so newer keys written by billing survive a
//! read/write cycle through older binaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Keys with a known meaning in the `features` document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKey {
    Unlimited,
    Sso,
    AdvancedAnalytics,
    PrioritySupport,
    TrialDays,
    MaxUsers,
    GoalsPerUser,
    ObjectivesPerOrg,
    ProjectsPerUser,
    StorageGb,
    AdvancedReporting,
    Integrations,
    ApiCallsPerMonth,
    DataRetentionMonths,
}

impl FeatureKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKey::Unlimited => "unlimited",
            FeatureKey::Sso => "sso",
            FeatureKey::AdvancedAnalytics => "advanced_analytics",
            FeatureKey::PrioritySupport => "priority_support",
            FeatureKey::TrialDays => "trial_days",
            FeatureKey::MaxUsers => "max_users",
            FeatureKey::GoalsPerUser => "goals_per_user",
            FeatureKey::ObjectivesPerOrg => "objectives_per_org",
            FeatureKey::ProjectsPerUser => "projects_per_user",
            FeatureKey::StorageGb => "storage_gb",
            FeatureKey::AdvancedReporting => "advanced_reporting",
            FeatureKey::Integrations => "integrations",
            FeatureKey::ApiCallsPerMonth => "api_calls_per_month",
            FeatureKey::DataRetentionMonths => "data_retention_months",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        const KEYS: [FeatureKey; 14] = [
            FeatureKey::Unlimited,
            FeatureKey::Sso,
            FeatureKey::AdvancedAnalytics,
            FeatureKey::PrioritySupport,
            FeatureKey::TrialDays,
            FeatureKey::MaxUsers,
            FeatureKey::GoalsPerUser,
            FeatureKey::ObjectivesPerOrg,
            FeatureKey::ProjectsPerUser,
            FeatureKey::StorageGb,
            FeatureKey::AdvancedReporting,
            FeatureKey::Integrations,
            FeatureKey::ApiCallsPerMonth,
            FeatureKey::DataRetentionMonths,
        ];
        KEYS.into_iter().find(|k| k.as_str() == key)
    }
}

/// Typed view over a plan's `features` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlimited: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_analytics: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_support: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_users: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals_per_user: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives_per_org: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects_per_user: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_gb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_reporting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrations: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_calls_per_month: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_retention_months: Option<i64>,

    /// Keys this version does not know about
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl LicenseFeatures {
    /// Boolean flag lookup; numeric and list keys count as enabled when present and non-zero.
    pub fn is_enabled(&self, key: FeatureKey) -> bool {
        match key {
            FeatureKey::Unlimited => self.unlimited.unwrap_or(false),
            FeatureKey::Sso => self.sso.unwrap_or(false),
            FeatureKey::AdvancedAnalytics => self.advanced_analytics.unwrap_or(false),
            FeatureKey::PrioritySupport => self.priority_support.unwrap_or(false),
            FeatureKey::AdvancedReporting => self.advanced_reporting.unwrap_or(false),
            FeatureKey::Integrations => self
                .integrations
                .as_ref()
                .map(|list| !list.is_empty())
                .unwrap_or(false),
            other => self.limit(other).map(|v| v != 0).unwrap_or(false),
        }
    }

    /// Numeric limit lookup; `None` for boolean keys or when unset.
    pub fn limit(&self, key: FeatureKey) -> Option<i64> {
        match key {
            FeatureKey::TrialDays => self.trial_days,
            FeatureKey::MaxUsers => self.max_users,
            FeatureKey::GoalsPerUser => self.goals_per_user,
            FeatureKey::ObjectivesPerOrg => self.objectives_per_org,
            FeatureKey::ProjectsPerUser => self.projects_per_user,
            FeatureKey::StorageGb => self.storage_gb,
            FeatureKey::ApiCallsPerMonth => self.api_calls_per_month,
            FeatureKey::DataRetentionMonths => self.data_retention_months,
            _ => None,
        }
    }

    pub fn integrations(&self) -> &[String] {
        self.integrations.as_deref().unwrap_or(&[])
    }

    /// Raw JSON value for any key, known or not.
    pub fn get_raw(&self, key: &str) -> Option<JsonValue> {
        match FeatureKey::parse(key) {
            Some(known) => self.known_value(known),
            None => self.extra.get(key).cloned(),
        }
    }

    fn known_value(&self, key: FeatureKey) -> Option<JsonValue> {
        match key {
            FeatureKey::Integrations => self
                .integrations
                .as_ref()
                .map(|list| JsonValue::from(list.clone())),
            FeatureKey::Unlimited => self.unlimited.map(JsonValue::from),
            FeatureKey::Sso => self.sso.map(JsonValue::from),
            FeatureKey::AdvancedAnalytics => self.advanced_analytics.map(JsonValue::from),
            FeatureKey::PrioritySupport => self.priority_support.map(JsonValue::from),
            FeatureKey::AdvancedReporting => self.advanced_reporting.map(JsonValue::from),
            numeric => self.limit(numeric).map(JsonValue::from),
        }
    }
}
