//! Record builders shared by the licensing unit tests

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{
    AppName, BillingCycle, LicenseFeatures, LicensePlan, LicenseStatus, OrganizationLicense,
    OrganizationLicenseWithPlan, PricingModel,
};

/// Fixed evaluation instant for deterministic tests
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
}

pub fn plan(pricing_model: PricingModel, max_users: Option<i32>) -> LicensePlan {
    LicensePlan {
        id: Uuid::new_v4(),
        slug: "team".to_string(),
        name: "Team".to_string(),
        description: None,
        pricing_model,
        billing_cycle: Some(BillingCycle::Monthly),
        price_per_unit: None,
        max_users,
        included_apps: vec![AppName::Align, AppName::Flow],
        features: LicenseFeatures::default(),
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

pub fn license(
    status: LicenseStatus,
    plan_cap: Option<i32>,
    current_user_count: i32,
) -> OrganizationLicenseWithPlan {
    let license_plan = plan(PricingModel::PerUser, plan_cap);
    OrganizationLicenseWithPlan {
        license: OrganizationLicense {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            license_plan_id: license_plan.id,
            status,
            max_users: None,
            current_user_count: Some(current_user_count),
            trial_ends_at: None,
            subscription_ends_at: None,
            billing_contact_email: None,
            created_at: None,
            updated_at: None,
        },
        license_plan,
    }
}
