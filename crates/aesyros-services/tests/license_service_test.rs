use std::sync::Arc;
use std::time::Duration;

use aesyros_core::models::{
    AccessDecision, AppName, BillingCycle, LicenseFeatures, LicensePlan, LicenseStatus,
    OrganizationAppAccess, OrganizationLicense, OrganizationLicenseWithPlan, PricingModel,
    UserLicenseAssignment,
};
use aesyros_core::{AppError, LicenseRepository, LicenseStatusLabel};
use aesyros_services::{InMemoryLicenseRepository, LicenseService, LicenseTracker};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use tokio::sync::Notify;
use uuid::Uuid;

fn plan(slug: &str, price: Option<i64>, max_users: Option<i32>, apps: Vec<AppName>) -> LicensePlan {
    LicensePlan {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        name: slug.to_uppercase(),
        description: None,
        pricing_model: PricingModel::PerUser,
        billing_cycle: Some(BillingCycle::Monthly),
        price_per_unit: price.map(|cents| Decimal::new(cents, 2)),
        max_users,
        included_apps: apps,
        features: LicenseFeatures::default(),
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

fn license_on(
    organization_id: Uuid,
    license_plan: LicensePlan,
    status: LicenseStatus,
    users: i32,
) -> OrganizationLicenseWithPlan {
    OrganizationLicenseWithPlan {
        license: OrganizationLicense {
            id: Uuid::new_v4(),
            organization_id,
            license_plan_id: license_plan.id,
            status,
            max_users: None,
            current_user_count: Some(users),
            trial_ends_at: None,
            subscription_ends_at: None,
            billing_contact_email: None,
            created_at: None,
            updated_at: None,
        },
        license_plan,
    }
}

fn team_plan() -> LicensePlan {
    plan("team", Some(1200), Some(10), vec![AppName::Align, AppName::Flow])
}

fn service(
    repository: &Arc<InMemoryLicenseRepository>,
    ttl: Duration,
) -> LicenseService<InMemoryLicenseRepository> {
    LicenseService::with_cache(Arc::clone(repository), ttl, 16)
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_is_cached_until_ttl() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    let org = Uuid::new_v4();
    repository
        .put_license(license_on(org, team_plan(), LicenseStatus::Active, 3))
        .await;
    let service = service(&repository, Duration::from_secs(60));

    let first = service.snapshot(org).await.unwrap();
    let second = service.snapshot(org).await.unwrap();
    assert_eq!(first.usage.current_users, 3);
    assert_eq!(second.usage.current_users, 3);
    assert_eq!(repository.license_fetches(), 1);

    tokio::time::advance(Duration::from_secs(61)).await;
    service.snapshot(org).await.unwrap();
    assert_eq!(repository.license_fetches(), 2);
}

#[tokio::test]
async fn test_zero_ttl_always_fetches() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    let org = Uuid::new_v4();
    repository
        .put_license(license_on(org, team_plan(), LicenseStatus::Active, 3))
        .await;
    let service = service(&repository, Duration::ZERO);

    service.snapshot(org).await.unwrap();
    service.snapshot(org).await.unwrap();
    assert_eq!(repository.license_fetches(), 2);
}

#[tokio::test]
async fn test_refetch_sees_updated_row() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    let org = Uuid::new_v4();
    let team = team_plan();
    repository
        .put_license(license_on(org, team.clone(), LicenseStatus::Active, 3))
        .await;
    let service = service(&repository, Duration::from_secs(60));

    assert_eq!(service.snapshot(org).await.unwrap().usage.current_users, 3);

    repository
        .put_license(license_on(org, team, LicenseStatus::Active, 10))
        .await;
    assert_eq!(service.snapshot(org).await.unwrap().usage.current_users, 3);

    let fresh = service.refetch(org).await.unwrap();
    assert_eq!(fresh.usage.current_users, 10);
    assert!(!fresh.validation.can_add_users);
}

#[tokio::test]
async fn test_cached_row_is_reevaluated_at_each_instant() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    let org = Uuid::new_v4();
    let now = Utc::now();
    let mut record = license_on(org, team_plan(), LicenseStatus::Trial, 2);
    record.license.trial_ends_at = Some(now + ChronoDuration::hours(1));
    repository.put_license(record).await;
    let service = service(&repository, Duration::from_secs(60));

    let before = service.snapshot_at(org, now).await.unwrap();
    assert!(before.validation.is_valid);
    assert_eq!(before.status, LicenseStatusLabel::Trial);

    let after = service
        .snapshot_at(org, now + ChronoDuration::hours(2))
        .await
        .unwrap();
    assert!(after.validation.is_trial_expired);
    assert_eq!(after.status, LicenseStatusLabel::TrialExpired);
    assert_eq!(repository.license_fetches(), 1);
}

#[tokio::test]
async fn test_validate_user_creation_paths() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    let service = service(&repository, Duration::from_secs(60));

    let missing = service.validate_user_creation(Uuid::new_v4()).await.unwrap();
    assert!(!missing.can_create);
    assert_eq!(missing.reason.as_deref(), Some("No license found for organization"));

    let full = Uuid::new_v4();
    repository
        .put_license(license_on(full, team_plan(), LicenseStatus::Active, 10))
        .await;
    let verdict = service.validate_user_creation(full).await.unwrap();
    assert!(!verdict.can_create);
    assert_eq!(verdict.reason.as_deref(), Some("User limit reached (10/10)"));
    assert!(verdict.requires_upgrade());

    let close = Uuid::new_v4();
    repository
        .put_license(license_on(close, team_plan(), LicenseStatus::Active, 8))
        .await;
    let verdict = service.validate_user_creation(close).await.unwrap();
    assert!(verdict.can_create);
    assert_eq!(verdict.reason.as_deref(), Some("Approaching user limit (8/10)"));
    assert!(!verdict.requires_upgrade());
}

#[tokio::test]
async fn test_require_user_creation_errors() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    let service = service(&repository, Duration::from_secs(60));

    let full = Uuid::new_v4();
    repository
        .put_license(license_on(full, team_plan(), LicenseStatus::Active, 10))
        .await;
    match service.require_user_creation(full).await {
        Err(AppError::UsageLimitExceeded { resource, used, limit }) => {
            assert_eq!(resource, "users");
            assert_eq!((used, limit), (10, 10));
        }
        other => panic!("expected usage limit error, got {:?}", other),
    }

    let suspended = Uuid::new_v4();
    repository
        .put_license(license_on(suspended, team_plan(), LicenseStatus::Suspended, 1))
        .await;
    match service.require_user_creation(suspended).await {
        Err(AppError::SubscriptionRequired(reason)) => {
            assert!(reason.contains("License is suspended"));
        }
        other => panic!("expected subscription error, got {:?}", other),
    }

    let close = Uuid::new_v4();
    repository
        .put_license(license_on(close, team_plan(), LicenseStatus::Active, 8))
        .await;
    let verdict = service.require_user_creation(close).await.unwrap();
    assert_eq!(verdict.reason.as_deref(), Some("Approaching user limit (8/10)"));
}

#[tokio::test]
async fn test_require_app_access_honours_override() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    let org = Uuid::new_v4();
    repository
        .put_license(license_on(org, team_plan(), LicenseStatus::Active, 1))
        .await;
    let service = service(&repository, Duration::from_secs(60));

    assert!(service.require_app_access(org, AppName::Align).await.is_ok());
    let err = service.require_app_access(org, AppName::Pulse).await.unwrap_err();
    assert!(matches!(err, AppError::SubscriptionRequired(_)));
    assert!(err.is_entitlement_denial());

    repository.set_app_access(org, AppName::Pulse, true).await;
    assert!(service.require_app_access(org, AppName::Pulse).await.is_ok());

    let missing = service.require_app_access(Uuid::new_v4(), AppName::Align).await;
    assert!(matches!(missing, Err(AppError::SubscriptionRequired(_))));
}

#[tokio::test]
async fn test_check_app_access_prefers_override() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    let org = Uuid::new_v4();
    repository
        .put_license(license_on(org, team_plan(), LicenseStatus::Active, 1))
        .await;
    let service = service(&repository, Duration::from_secs(60));

    assert!(service.check_app_access(org, AppName::Align).await.unwrap());
    assert!(!service.check_app_access(org, AppName::Drive).await.unwrap());

    repository.set_app_access(org, AppName::Align, false).await;
    repository.set_app_access(org, AppName::Drive, true).await;
    assert!(!service.check_app_access(org, AppName::Align).await.unwrap());
    assert!(service.check_app_access(org, AppName::Drive).await.unwrap());

    // No license at all: override still decides the boolean check
    let unlicensed = Uuid::new_v4();
    repository.set_app_access(unlicensed, AppName::Pulse, true).await;
    assert!(service.check_app_access(unlicensed, AppName::Pulse).await.unwrap());
}

#[tokio::test]
async fn test_app_decision() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    let org = Uuid::new_v4();
    repository
        .put_license(license_on(org, team_plan(), LicenseStatus::Suspended, 1))
        .await;
    let service = service(&repository, Duration::from_secs(60));

    assert_eq!(
        service.app_decision(org, AppName::Drive).await.unwrap(),
        AccessDecision::AppNotIncluded {
            app: AppName::Drive
        }
    );
    assert!(matches!(
        service.app_decision(org, AppName::Align).await.unwrap(),
        AccessDecision::Invalid { .. }
    ));

    let active = Uuid::new_v4();
    repository
        .put_license(license_on(active, team_plan(), LicenseStatus::Active, 1))
        .await;
    repository.set_app_access(active, AppName::Drive, true).await;
    repository.set_app_access(active, AppName::Flow, false).await;
    assert!(service
        .app_decision(active, AppName::Drive)
        .await
        .unwrap()
        .is_granted());
    assert_eq!(
        service.app_decision(active, AppName::Flow).await.unwrap(),
        AccessDecision::AppNotIncluded {
            app: AppName::Flow
        }
    );
}

#[tokio::test]
async fn test_plan_comparison_suggests_larger_plans() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    let org = Uuid::new_v4();
    let team = team_plan();
    repository.put_plan(team.clone()).await;
    repository
        .put_plan(plan(
            "business",
            Some(2400),
            Some(50),
            vec![AppName::Align, AppName::Flow, AppName::Drive],
        ))
        .await;
    repository
        .put_plan(plan("starter", Some(500), Some(5), vec![AppName::Align]))
        .await;
    repository
        .put_license(license_on(org, team, LicenseStatus::Active, 9))
        .await;
    let service = service(&repository, Duration::from_secs(60));

    let comparison = service.plan_comparison(org).await.unwrap().unwrap();
    let slugs: Vec<&str> = comparison
        .suggested_plans
        .iter()
        .map(|plan| plan.slug.as_str())
        .collect();
    assert_eq!(slugs, vec!["business"]);
    assert!(!comparison.reasons.is_empty());

    assert!(service
        .plan_comparison(Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_active_plans_cheapest_first() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    repository
        .put_plan(plan("enterprise", None, None, vec![AppName::Align]))
        .await;
    repository
        .put_plan(plan("business", Some(2400), Some(50), vec![AppName::Align]))
        .await;
    let mut retired = plan("legacy", Some(100), Some(5), vec![AppName::Align]);
    retired.is_active = false;
    repository.put_plan(retired).await;
    repository.put_plan(team_plan()).await;
    let service = service(&repository, Duration::from_secs(60));

    let slugs: Vec<String> = service
        .active_plans()
        .await
        .unwrap()
        .into_iter()
        .map(|plan| plan.slug)
        .collect();
    assert_eq!(slugs, vec!["team", "business", "enterprise"]);
}

#[tokio::test]
async fn test_tracker_follows_selected_organization() {
    let repository = Arc::new(InMemoryLicenseRepository::new());
    let org = Uuid::new_v4();
    repository
        .put_license(license_on(org, team_plan(), LicenseStatus::Active, 4))
        .await;
    let tracker = LicenseTracker::new(service(&repository, Duration::from_secs(60)));

    let unselected = tracker.refresh().await.unwrap().unwrap();
    assert!(unselected.license.is_none());
    assert_eq!(unselected.status, LicenseStatusLabel::NoLicense);

    tracker.select(Some(org)).await;
    let snapshot = tracker.refresh().await.unwrap().unwrap();
    assert_eq!(snapshot.usage.current_users, 4);
    assert_eq!(tracker.current().await, Some(snapshot));

    repository
        .put_license(license_on(org, team_plan(), LicenseStatus::Active, 6))
        .await;
    assert_eq!(tracker.refresh().await.unwrap().unwrap().usage.current_users, 4);
    assert_eq!(tracker.refetch().await.unwrap().unwrap().usage.current_users, 6);
    assert_eq!(tracker.generation(), 1);

    tracker.select(None).await;
    assert!(tracker.current().await.is_none());
}

/// Holds license reads until released so a selection change can land mid-fetch.
/// Holds each license read until released. With `read_first` the row is read
/// before the hold, so the caller receives whatever was stored at entry.
struct GatedRepository {
    inner: InMemoryLicenseRepository,
    entered: Notify,
    release: Notify,
    read_first: bool,
}

#[async_trait]
impl LicenseRepository for GatedRepository {
    async fn get_license_with_plan(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<OrganizationLicenseWithPlan>, AppError> {
        if self.read_first {
            let license = self.inner.get_license_with_plan(organization_id).await;
            self.entered.notify_one();
            self.release.notified().await;
            return license;
        }
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.get_license_with_plan(organization_id).await
    }

    async fn get_app_access(
        &self,
        organization_id: Uuid,
        app: AppName,
    ) -> Result<Option<OrganizationAppAccess>, AppError> {
        self.inner.get_app_access(organization_id, app).await
    }

    async fn list_app_access(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationAppAccess>, AppError> {
        self.inner.list_app_access(organization_id).await
    }

    async fn list_active_plans(&self) -> Result<Vec<LicensePlan>, AppError> {
        self.inner.list_active_plans().await
    }

    async fn get_plan_by_slug(&self, slug: &str) -> Result<Option<LicensePlan>, AppError> {
        self.inner.get_plan_by_slug(slug).await
    }

    async fn list_user_assignments(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<UserLicenseAssignment>, AppError> {
        self.inner.list_user_assignments(organization_id).await
    }
}

#[tokio::test]
async fn test_tracker_discards_stale_response() {
    let inner = InMemoryLicenseRepository::new();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    inner
        .put_license(license_on(first, team_plan(), LicenseStatus::Active, 2))
        .await;
    inner
        .put_license(license_on(second, team_plan(), LicenseStatus::Active, 7))
        .await;

    let repository = Arc::new(GatedRepository {
        inner,
        entered: Notify::new(),
        release: Notify::new(),
        read_first: false,
    });
    let tracker = LicenseTracker::new(LicenseService::with_cache(
        Arc::clone(&repository),
        Duration::ZERO,
        16,
    ));
    tracker.select(Some(first)).await;

    let (stale, _) = tokio::join!(tracker.refresh(), async {
        repository.entered.notified().await;
        tracker.select(Some(second)).await;
        repository.release.notify_one();
    });
    assert!(stale.unwrap().is_none());
    assert!(tracker.current().await.is_none());

    let (fresh, _) = tokio::join!(tracker.refresh(), async {
        repository.entered.notified().await;
        repository.release.notify_one();
    });
    let fresh = fresh.unwrap().unwrap();
    assert_eq!(fresh.usage.current_users, 7);
    assert_eq!(tracker.target().await, Some(second));
}

#[tokio::test]
async fn test_invalidate_during_fetch_is_not_overwritten() {
    let inner = InMemoryLicenseRepository::new();
    let org = Uuid::new_v4();
    inner
        .put_license(license_on(org, team_plan(), LicenseStatus::Active, 2))
        .await;

    let repository = Arc::new(GatedRepository {
        inner,
        entered: Notify::new(),
        release: Notify::new(),
        read_first: true,
    });
    let service = LicenseService::with_cache(Arc::clone(&repository), Duration::from_secs(60), 16);

    let (in_flight, _) = tokio::join!(service.snapshot(org), async {
        repository.entered.notified().await;
        repository
            .inner
            .put_license(license_on(org, team_plan(), LicenseStatus::Suspended, 9))
            .await;
        service.invalidate(org).await;
        repository.release.notify_one();
    });
    assert_eq!(in_flight.unwrap().usage.current_users, 2);

    // The row read before invalidation must not have been cached
    repository.release.notify_one();
    let after = service.snapshot(org).await.unwrap();
    assert_eq!(after.usage.current_users, 9);
    let license = after.license.unwrap();
    assert_eq!(license.license.status, LicenseStatus::Suspended);
    assert!(!after.validation.is_valid);
    assert_eq!(repository.inner.license_fetches(), 2);
}
