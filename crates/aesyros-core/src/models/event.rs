use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// License lifecycle events reported to analytics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LicenseEvent {
    LicenseUpgraded,
    LicenseDowngraded,
    UserLimitReached,
    UserLimitExceeded,
    TrialStarted,
    TrialExpired,
    SubscriptionRenewed,
    SubscriptionCancelled,
    AppAccessGranted,
    AppAccessRevoked,
}

impl LicenseEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseEvent::LicenseUpgraded => "license_upgraded",
            LicenseEvent::LicenseDowngraded => "license_downgraded",
            LicenseEvent::UserLimitReached => "user_limit_reached",
            LicenseEvent::UserLimitExceeded => "user_limit_exceeded",
            LicenseEvent::TrialStarted => "trial_started",
            LicenseEvent::TrialExpired => "trial_expired",
            LicenseEvent::SubscriptionRenewed => "subscription_renewed",
            LicenseEvent::SubscriptionCancelled => "subscription_cancelled",
            LicenseEvent::AppAccessGranted => "app_access_granted",
            LicenseEvent::AppAccessRevoked => "app_access_revoked",
        }
    }
}

impl std::fmt::Display for LicenseEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a [`LicenseEvent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseEventData {
    pub event: LicenseEvent,
    pub organization_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_slug: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl LicenseEventData {
    pub fn new(event: LicenseEvent, organization_id: Uuid, timestamp: DateTime<Utc>) -> Self {
        Self {
            event,
            organization_id,
            user_id: None,
            plan_slug: None,
            metadata: serde_json::Value::Null,
            timestamp,
        }
    }

    pub fn with_plan(mut self, plan_slug: impl Into<String>) -> Self {
        self.plan_slug = Some(plan_slug.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
