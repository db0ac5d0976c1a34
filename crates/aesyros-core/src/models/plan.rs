use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::app::AppName;
use super::features::LicenseFeatures;
use crate::error::AppError;

/// How a plan is priced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "pricing_model", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    PerUser,
    /// Flat organization-wide price; seats are not counted
    Organization,
    UsageBased,
}

/// Billing cycle of a plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "billing_cycle", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Yearly,
    OneTime,
}

/// A purchasable license tier, with its feature document typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LicensePlan {
    #[serde(default)]
    pub id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub slug: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub pricing_model: PricingModel,
    #[serde(default)]
    pub billing_cycle: Option<BillingCycle>,
    #[serde(default)]
    pub price_per_unit: Option<Decimal>,
    /// `None` means unlimited seats
    #[serde(default)]
    #[validate(range(min = 0))]
    pub max_users: Option<i32>,
    #[serde(default)]
    pub included_apps: Vec<AppName>,
    #[serde(default)]
    pub features: LicenseFeatures,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl LicensePlan {
    pub fn is_trial_plan(&self) -> bool {
        self.slug.split(['-', '_']).any(|part| part == "trial")
    }

    pub fn includes(&self, app: AppName) -> bool {
        self.included_apps.contains(&app)
    }

    pub fn is_unlimited_seats(&self) -> bool {
        self.max_users.is_none()
    }

    /// Field validation plus the cross-field rules billing relies on.
    pub fn check_invariants(&self) -> Result<(), AppError> {
        self.validate()?;

        if self.included_apps.is_empty() && !self.is_trial_plan() {
            return Err(AppError::InvalidInput(format!(
                "Plan '{}' must include at least one app",
                self.slug
            )));
        }

        if let (Some(cap), Some(feature_cap)) = (self.max_users, self.features.max_users) {
            if i64::from(cap) != feature_cap {
                return Err(AppError::InvalidInput(format!(
                    "Plan '{}' declares max_users {} but features.max_users {}",
                    self.slug, cap, feature_cap
                )));
            }
        }

        Ok(())
    }
}
