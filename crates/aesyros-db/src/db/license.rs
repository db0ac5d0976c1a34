use aesyros_core::models::{
    AppName, BillingCycle, LicenseFeatures, LicensePlan, LicenseStatus, OrganizationAppAccess,
    OrganizationLicense, OrganizationLicenseWithPlan, PricingModel, UserLicenseAssignment,
};
use aesyros_core::{AppError, LicenseRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const PLAN_COLUMNS: &str = "id, slug, name, description, pricing_model, billing_cycle, \
     price_per_unit, max_users, included_apps, features, is_active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    slug: String,
    name: String,
    description: Option<String>,
    pricing_model: PricingModel,
    billing_cycle: Option<BillingCycle>,
    price_per_unit: Option<Decimal>,
    max_users: Option<i32>,
    included_apps: Vec<AppName>,
    features: Option<Json<JsonValue>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PlanRow> for LicensePlan {
    fn from(row: PlanRow) -> Self {
        let features = parse_features(&row.slug, row.features.map(|Json(value)| value));
        LicensePlan {
            id: row.id,
            slug: row.slug,
            name: row.name,
            description: row.description,
            pricing_model: row.pricing_model,
            billing_cycle: row.billing_cycle,
            price_per_unit: row.price_per_unit,
            max_users: row.max_users,
            included_apps: row.included_apps,
            features,
            is_active: row.is_active,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// organization_licenses joined with license_plans; plan columns are prefixed
#[derive(sqlx::FromRow)]
struct LicenseWithPlanRow {
    id: Uuid,
    organization_id: Uuid,
    license_plan_id: Uuid,
    status: LicenseStatus,
    max_users: Option<i32>,
    current_user_count: Option<i32>,
    trial_ends_at: Option<DateTime<Utc>>,
    subscription_ends_at: Option<DateTime<Utc>>,
    billing_contact_email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    plan_slug: String,
    plan_name: String,
    plan_description: Option<String>,
    plan_pricing_model: PricingModel,
    plan_billing_cycle: Option<BillingCycle>,
    plan_price_per_unit: Option<Decimal>,
    plan_max_users: Option<i32>,
    plan_included_apps: Vec<AppName>,
    plan_features: Option<Json<JsonValue>>,
    plan_is_active: bool,
    plan_created_at: DateTime<Utc>,
    plan_updated_at: DateTime<Utc>,
}

impl From<LicenseWithPlanRow> for OrganizationLicenseWithPlan {
    fn from(row: LicenseWithPlanRow) -> Self {
        let plan = PlanRow {
            id: row.license_plan_id,
            slug: row.plan_slug,
            name: row.plan_name,
            description: row.plan_description,
            pricing_model: row.plan_pricing_model,
            billing_cycle: row.plan_billing_cycle,
            price_per_unit: row.plan_price_per_unit,
            max_users: row.plan_max_users,
            included_apps: row.plan_included_apps,
            features: row.plan_features,
            is_active: row.plan_is_active,
            created_at: row.plan_created_at,
            updated_at: row.plan_updated_at,
        };

        OrganizationLicenseWithPlan {
            license: OrganizationLicense {
                id: row.id,
                organization_id: row.organization_id,
                license_plan_id: row.license_plan_id,
                status: row.status,
                max_users: row.max_users,
                current_user_count: row.current_user_count,
                trial_ends_at: row.trial_ends_at,
                subscription_ends_at: row.subscription_ends_at,
                billing_contact_email: row.billing_contact_email,
                created_at: Some(row.created_at),
                updated_at: Some(row.updated_at),
            },
            license_plan: plan.into(),
        }
    }
}

/// A features document that does not match the typed keys is kept whole in
/// `extra` rather than failing the license read.
fn parse_features(slug: &str, value: Option<JsonValue>) -> LicenseFeatures {
    let Some(value) = value else {
        return LicenseFeatures::default();
    };

    match serde_json::from_value::<LicenseFeatures>(value.clone()) {
        Ok(features) => features,
        Err(e) => {
            tracing::warn!(plan = %slug, error = %e, "Plan features do not match known keys");
            let extra = match value {
                JsonValue::Object(map) => map.into_iter().collect(),
                _ => Default::default(),
            };
            LicenseFeatures {
                extra,
                ..Default::default()
            }
        }
    }
}

/// Postgres-backed license repository (read-only)
#[derive(Clone)]
pub struct PgLicenseRepository {
    pool: PgPool,
}

impl PgLicenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LicenseRepository for PgLicenseRepository {
    #[tracing::instrument(skip(self), fields(db.table = "organization_licenses", db.operation = "select"))]
    async fn get_license_with_plan(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<OrganizationLicenseWithPlan>, AppError> {
        let row = sqlx::query_as::<Postgres, LicenseWithPlanRow>(
            r#"
            SELECT ol.id, ol.organization_id, ol.license_plan_id, ol.status,
                   ol.max_users, ol.current_user_count, ol.trial_ends_at,
                   ol.subscription_ends_at, ol.billing_contact_email,
                   ol.created_at, ol.updated_at,
                   lp.slug AS plan_slug, lp.name AS plan_name,
                   lp.description AS plan_description,
                   lp.pricing_model AS plan_pricing_model,
                   lp.billing_cycle AS plan_billing_cycle,
                   lp.price_per_unit AS plan_price_per_unit,
                   lp.max_users AS plan_max_users,
                   lp.included_apps AS plan_included_apps,
                   lp.features AS plan_features,
                   lp.is_active AS plan_is_active,
                   lp.created_at AS plan_created_at,
                   lp.updated_at AS plan_updated_at
            FROM organization_licenses ol
            JOIN license_plans lp ON lp.id = ol.license_plan_id
            WHERE ol.organization_id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_none() {
            tracing::debug!(%organization_id, "No license row for organization");
        }

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_app_access", db.operation = "select"))]
    async fn get_app_access(
        &self,
        organization_id: Uuid,
        app: AppName,
    ) -> Result<Option<OrganizationAppAccess>, AppError> {
        let access = sqlx::query_as::<Postgres, OrganizationAppAccess>(
            r#"
            SELECT id, organization_id, app_name, is_enabled, created_at, updated_at
            FROM organization_app_access
            WHERE organization_id = $1 AND app_name = $2
            "#,
        )
        .bind(organization_id)
        .bind(app)
        .fetch_optional(&self.pool)
        .await?;

        Ok(access)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_app_access", db.operation = "select"))]
    async fn list_app_access(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationAppAccess>, AppError> {
        let rows = sqlx::query_as::<Postgres, OrganizationAppAccess>(
            r#"
            SELECT id, organization_id, app_name, is_enabled, created_at, updated_at
            FROM organization_app_access
            WHERE organization_id = $1
            ORDER BY app_name ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "license_plans", db.operation = "select"))]
    async fn list_active_plans(&self) -> Result<Vec<LicensePlan>, AppError> {
        let rows = sqlx::query_as::<Postgres, PlanRow>(&format!(
            "SELECT {} FROM license_plans WHERE is_active = TRUE ORDER BY price_per_unit ASC NULLS LAST, name ASC",
            PLAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "license_plans", db.operation = "select"))]
    async fn get_plan_by_slug(&self, slug: &str) -> Result<Option<LicensePlan>, AppError> {
        let row = sqlx::query_as::<Postgres, PlanRow>(&format!(
            "SELECT {} FROM license_plans WHERE slug = $1",
            PLAN_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(skip(self), fields(db.table = "user_license_assignments", db.operation = "select"))]
    async fn list_user_assignments(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<UserLicenseAssignment>, AppError> {
        let rows = sqlx::query_as::<Postgres, UserLicenseAssignment>(
            r#"
            SELECT id, user_id, organization_id, organization_license_id,
                   assigned_apps, is_active, assigned_at
            FROM user_license_assignments
            WHERE organization_id = $1
            ORDER BY assigned_at ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
