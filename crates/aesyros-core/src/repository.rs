//! Data-access interface for licensing
//!
//! The core never talks to a database client directly. Whatever orchestrates
//! fetch → evaluate is handed an implementation of [`LicenseRepository`]; the
//! Postgres one lives in `aesyros-db`, an in-memory one in `aesyros-services`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    AppName, LicensePlan, OrganizationAppAccess, OrganizationLicenseWithPlan,
    UserLicenseAssignment,
};

#[async_trait]
pub trait LicenseRepository: Send + Sync {
    /// License joined with its plan. An organization without a license row is `Ok(None)`.
    async fn get_license_with_plan(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<OrganizationLicenseWithPlan>, AppError>;

    /// Explicit app access override, if one exists.
    async fn get_app_access(
        &self,
        organization_id: Uuid,
        app: AppName,
    ) -> Result<Option<OrganizationAppAccess>, AppError>;

    async fn list_app_access(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationAppAccess>, AppError>;

    /// Active plans, cheapest first.
    async fn list_active_plans(&self) -> Result<Vec<LicensePlan>, AppError>;

    async fn get_plan_by_slug(&self, slug: &str) -> Result<Option<LicensePlan>, AppError>;

    async fn list_user_assignments(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<UserLicenseAssignment>, AppError>;
}
