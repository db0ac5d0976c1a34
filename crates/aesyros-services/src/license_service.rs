//! License service
//!
//! Orchestrates fetch → evaluate for an organization. License rows are cached
//! per organization for a short TTL; everything derived from a row (validity,
//! usage, recommendations) is recomputed on every call so date-based flags
//! never go stale while the row sits in the cache.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use aesyros_core::constants::ERR_NO_LICENSE;
use aesyros_core::licensing::{compare_plans, guard_app, resolve_app_access};
use aesyros_core::models::{
    AccessDecision, AppName, LicensePlan, LicensePlanComparison, OrganizationAppAccess,
    OrganizationLicenseWithPlan, UserCreationValidation,
};
use aesyros_core::{AppError, LicenseRepository, LicenseSnapshot, LicensingConfig};
use chrono::{DateTime, Utc};
use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::events::{emit, license_events};

#[derive(Debug, Clone)]
struct CachedLicense {
    license: Option<OrganizationLicenseWithPlan>,
    fetched_at: Instant,
}

/// Cached rows plus a per-organization invalidation epoch. A fetch only
/// stores its row if the epoch it started under is still current.
struct LicenseCache {
    entries: LruCache<Uuid, CachedLicense>,
    epochs: HashMap<Uuid, u64>,
}

impl LicenseCache {
    fn epoch(&self, organization_id: &Uuid) -> u64 {
        self.epochs.get(organization_id).copied().unwrap_or(0)
    }
}

pub struct LicenseService<R> {
    repository: Arc<R>,
    cache: Arc<Mutex<LicenseCache>>,
    ttl: Duration,
}

impl<R> Clone for LicenseService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
        }
    }
}

impl<R: LicenseRepository> LicenseService<R> {
    pub fn new(repository: Arc<R>, config: &LicensingConfig) -> Self {
        Self::with_cache(
            repository,
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_capacity,
        )
    }

    /// A zero `ttl` disables caching.
    pub fn with_cache(repository: Arc<R>, ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            repository,
            cache: Arc::new(Mutex::new(LicenseCache {
                entries: LruCache::new(capacity),
                epochs: HashMap::new(),
            })),
            ttl,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// License row for the organization, served from cache while fresh.
    pub async fn license(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<OrganizationLicenseWithPlan>, AppError> {
        let (license, _) = self.load(organization_id).await?;
        Ok(license)
    }

    /// Returns the row and whether it came from the repository.
    async fn load(
        &self,
        organization_id: Uuid,
    ) -> Result<(Option<OrganizationLicenseWithPlan>, bool), AppError> {
        if !self.ttl.is_zero() {
            let mut cache = self.cache.lock().await;
            if let Some(entry) = cache.entries.get(&organization_id) {
                if entry.fetched_at.elapsed() < self.ttl {
                    tracing::trace!(%organization_id, "License cache hit");
                    return Ok((entry.license.clone(), false));
                }
                cache.entries.pop(&organization_id);
            }
        }

        let license = self.fetch(organization_id).await?;
        Ok((license, true))
    }

    #[tracing::instrument(skip(self))]
    async fn fetch(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<OrganizationLicenseWithPlan>, AppError> {
        let epoch = self.cache.lock().await.epoch(&organization_id);

        let license = self
            .repository
            .get_license_with_plan(organization_id)
            .await
            .map_err(|e| {
                tracing::error!(%organization_id, error = %e, "Failed to fetch license");
                e
            })?;

        if !self.ttl.is_zero() {
            let mut cache = self.cache.lock().await;
            if cache.epoch(&organization_id) == epoch {
                cache.entries.put(
                    organization_id,
                    CachedLicense {
                        license: license.clone(),
                        fetched_at: Instant::now(),
                    },
                );
            } else {
                tracing::debug!(%organization_id, "License invalidated during fetch, not caching");
            }
        }

        Ok(license)
    }

    /// Drop the cached row so the next read goes to the repository. Fetches
    /// already in flight for the organization will not repopulate the cache.
    pub async fn invalidate(&self, organization_id: Uuid) {
        let mut cache = self.cache.lock().await;
        *cache.epochs.entry(organization_id).or_insert(0) += 1;
        if cache.entries.pop(&organization_id).is_some() {
            tracing::debug!(%organization_id, "License cache entry invalidated");
        }
    }

    pub async fn snapshot(&self, organization_id: Uuid) -> Result<LicenseSnapshot, AppError> {
        self.snapshot_at(organization_id, Utc::now()).await
    }

    pub async fn snapshot_at(
        &self,
        organization_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<LicenseSnapshot, AppError> {
        let (license, fresh) = self.load(organization_id).await?;
        let snapshot = LicenseSnapshot::compute(license, now);

        if fresh {
            for event in license_events(&snapshot) {
                emit(&event);
            }
        }

        Ok(snapshot)
    }

    /// Bypass the cache and evaluate a freshly fetched row.
    pub async fn refetch(&self, organization_id: Uuid) -> Result<LicenseSnapshot, AppError> {
        self.invalidate(organization_id).await;
        self.snapshot(organization_id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn validate_user_creation(
        &self,
        organization_id: Uuid,
    ) -> Result<UserCreationValidation, AppError> {
        let verdict = self.snapshot(organization_id).await?.user_creation();
        if !verdict.can_create {
            tracing::info!(
                %organization_id,
                reason = verdict.reason.as_deref().unwrap_or_default(),
                upgrade_required = verdict.upgrade_required,
                "User creation blocked"
            );
        }
        Ok(verdict)
    }

    /// Like `validate_user_creation`, but a blocked verdict is an error: a full
    /// seat cap is `UsageLimitExceeded`, anything else `SubscriptionRequired`.
    /// A soft warning still passes.
    pub async fn require_user_creation(
        &self,
        organization_id: Uuid,
    ) -> Result<UserCreationValidation, AppError> {
        let snapshot = self.snapshot(organization_id).await?;
        let verdict = snapshot.user_creation();
        match creation_denial(&snapshot, &verdict) {
            Some(err) => Err(err),
            None => Ok(verdict),
        }
    }

    /// An explicit override row decides when present; otherwise the plan does.
    #[tracing::instrument(skip(self))]
    pub async fn check_app_access(
        &self,
        organization_id: Uuid,
        app: AppName,
    ) -> Result<bool, AppError> {
        let app_override = self.repository.get_app_access(organization_id, app).await?;
        let license = match app_override {
            Some(_) => None,
            None => self.license(organization_id).await?,
        };

        Ok(resolve_app_access(license.as_ref(), app_override.as_ref(), app))
    }

    /// Guard decision for `app`, honouring override rows.
    #[tracing::instrument(skip(self))]
    pub async fn app_decision(
        &self,
        organization_id: Uuid,
        app: AppName,
    ) -> Result<AccessDecision, AppError> {
        let app_override = self.repository.get_app_access(organization_id, app).await?;
        let snapshot = self.snapshot(organization_id).await?;
        let decision = decide(&snapshot, app_override.as_ref(), app);

        if !decision.is_granted() {
            tracing::debug!(%organization_id, %app, ?decision, "App access denied");
        }
        Ok(decision)
    }

    /// Fails with `SubscriptionRequired` unless `app_decision` grants `app`.
    pub async fn require_app_access(
        &self,
        organization_id: Uuid,
        app: AppName,
    ) -> Result<(), AppError> {
        let decision = self.app_decision(organization_id, app).await?;
        match access_denial(&decision) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Upgrade options for the organization; `None` without a license.
    pub async fn plan_comparison(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<LicensePlanComparison>, AppError> {
        let snapshot = self.snapshot(organization_id).await?;
        let Some(current) = snapshot.license.as_ref() else {
            return Ok(None);
        };

        let plans = self.repository.list_active_plans().await?;
        Ok(Some(compare_plans(current, &plans, &snapshot.usage)))
    }

    pub async fn active_plans(&self) -> Result<Vec<LicensePlan>, AppError> {
        self.repository.list_active_plans().await
    }
}

/// Error equivalent of a blocked user-creation verdict; `None` when allowed.
pub fn creation_denial(snapshot: &LicenseSnapshot, verdict: &UserCreationValidation) -> Option<AppError> {
    if verdict.can_create {
        return None;
    }

    // Seats are the only blocker left on a valid license
    if snapshot.validation.is_valid {
        return Some(AppError::UsageLimitExceeded {
            resource: "users".to_string(),
            used: i64::from(snapshot.usage.current_users),
            limit: snapshot.usage.max_users.map(i64::from).unwrap_or_default(),
        });
    }

    Some(AppError::SubscriptionRequired(
        verdict.reason.clone().unwrap_or_else(|| ERR_NO_LICENSE.to_string()),
    ))
}

/// Error equivalent of a refused app decision; `None` when granted.
pub fn access_denial(decision: &AccessDecision) -> Option<AppError> {
    match decision {
        AccessDecision::Granted => None,
        AccessDecision::AppNotIncluded { app } => Some(AppError::SubscriptionRequired(format!(
            "Current plan does not include {}",
            app
        ))),
        AccessDecision::Expired { errors } | AccessDecision::Invalid { errors } => {
            Some(AppError::SubscriptionRequired(errors.join(", ")))
        }
    }
}

fn decide(
    snapshot: &LicenseSnapshot,
    app_override: Option<&OrganizationAppAccess>,
    app: AppName,
) -> AccessDecision {
    let Some(row) = app_override.filter(|row| row.app_name == app) else {
        return snapshot.app_decision(app);
    };

    let mut validation = snapshot.validation.clone();
    validation.accessible_apps.retain(|included| *included != app);
    if row.is_enabled {
        validation.accessible_apps.push(app);
    }

    guard_app(snapshot.license.as_ref(), &validation, app)
}
