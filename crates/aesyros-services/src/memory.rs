//! In-memory license repository
//!
//! Backs the service in tests and in the CLI's offline mode. Records are keyed
//! by organization; plans are listed cheapest first like the Postgres store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aesyros_core::models::{
    AppName, LicensePlan, OrganizationAppAccess, OrganizationLicenseWithPlan,
    UserLicenseAssignment,
};
use aesyros_core::{AppError, LicenseRepository};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
#[allow(clippy::type_complexity)]
pub struct InMemoryLicenseRepository {
    licenses: Arc<RwLock<HashMap<Uuid, OrganizationLicenseWithPlan>>>,
    app_access: Arc<RwLock<HashMap<(Uuid, AppName), OrganizationAppAccess>>>,
    plans: Arc<RwLock<Vec<LicensePlan>>>,
    assignments: Arc<RwLock<Vec<UserLicenseAssignment>>>,
    license_fetches: Arc<AtomicUsize>,
}

impl InMemoryLicenseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the license of `record`'s organization.
    pub async fn put_license(&self, record: OrganizationLicenseWithPlan) {
        self.licenses
            .write()
            .await
            .insert(record.organization_id(), record);
    }

    pub async fn remove_license(&self, organization_id: Uuid) -> Option<OrganizationLicenseWithPlan> {
        self.licenses.write().await.remove(&organization_id)
    }

    /// Record an explicit app access override.
    pub async fn set_app_access(&self, organization_id: Uuid, app: AppName, is_enabled: bool) {
        let now = Utc::now();
        let mut rows = self.app_access.write().await;
        rows.entry((organization_id, app))
            .and_modify(|row| {
                row.is_enabled = is_enabled;
                row.updated_at = now;
            })
            .or_insert_with(|| OrganizationAppAccess {
                id: Uuid::new_v4(),
                organization_id,
                app_name: app,
                is_enabled,
                created_at: now,
                updated_at: now,
            });
    }

    pub async fn put_plan(&self, plan: LicensePlan) {
        let mut plans = self.plans.write().await;
        plans.retain(|existing| existing.id != plan.id && existing.slug != plan.slug);
        plans.push(plan);
    }

    pub async fn add_assignment(&self, assignment: UserLicenseAssignment) {
        self.assignments.write().await.push(assignment);
    }

    /// Number of license reads served so far.
    pub fn license_fetches(&self) -> usize {
        self.license_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LicenseRepository for InMemoryLicenseRepository {
    async fn get_license_with_plan(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<OrganizationLicenseWithPlan>, AppError> {
        self.license_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.licenses.read().await.get(&organization_id).cloned())
    }

    async fn get_app_access(
        &self,
        organization_id: Uuid,
        app: AppName,
    ) -> Result<Option<OrganizationAppAccess>, AppError> {
        Ok(self
            .app_access
            .read()
            .await
            .get(&(organization_id, app))
            .cloned())
    }

    async fn list_app_access(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationAppAccess>, AppError> {
        let mut rows: Vec<OrganizationAppAccess> = self
            .app_access
            .read()
            .await
            .values()
            .filter(|row| row.organization_id == organization_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.app_name);
        Ok(rows)
    }

    async fn list_active_plans(&self) -> Result<Vec<LicensePlan>, AppError> {
        let mut plans: Vec<LicensePlan> = self
            .plans
            .read()
            .await
            .iter()
            .filter(|plan| plan.is_active)
            .cloned()
            .collect();
        // None prices sort last, matching NULLS LAST
        plans.sort_by(|a, b| match (a.price_per_unit, b.price_per_unit) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.name.cmp(&b.name)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.name.cmp(&b.name),
        });
        Ok(plans)
    }

    async fn get_plan_by_slug(&self, slug: &str) -> Result<Option<LicensePlan>, AppError> {
        Ok(self
            .plans
            .read()
            .await
            .iter()
            .find(|plan| plan.slug == slug)
            .cloned())
    }

    async fn list_user_assignments(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<UserLicenseAssignment>, AppError> {
        Ok(self
            .assignments
            .read()
            .await
            .iter()
            .filter(|assignment| assignment.organization_id == organization_id)
            .cloned()
            .collect())
    }
}
