//! License lifecycle events
//!
//! Derived from a freshly fetched snapshot and reported as structured tracing
//! events under the `aesyros::license_event` target, where an analytics
//! subscriber can pick them up.

use aesyros_core::models::{LicenseEvent, LicenseEventData, LicenseStatus};
use aesyros_core::LicenseSnapshot;
use serde_json::json;

pub const LICENSE_EVENT_TARGET: &str = "aesyros::license_event";

/// Events implied by the seat and trial state of `snapshot`.
pub fn license_events(snapshot: &LicenseSnapshot) -> Vec<LicenseEventData> {
    let Some(record) = snapshot.license.as_ref() else {
        return Vec::new();
    };

    let organization_id = record.organization_id();
    let plan_slug = record.license_plan.slug.as_str();
    let usage = &snapshot.usage;
    let mut events = Vec::new();

    if let Some(max_users) = usage.max_users {
        let kind = if usage.is_over_limit {
            Some(LicenseEvent::UserLimitExceeded)
        } else if usage.current_users >= max_users {
            Some(LicenseEvent::UserLimitReached)
        } else {
            None
        };

        if let Some(kind) = kind {
            events.push(
                LicenseEventData::new(kind, organization_id, snapshot.evaluated_at)
                    .with_plan(plan_slug)
                    .with_metadata(json!({
                        "currentUsers": usage.current_users,
                        "maxUsers": max_users,
                    })),
            );
        }
    }

    if record.status() == LicenseStatus::Trial && snapshot.validation.is_trial_expired {
        events.push(
            LicenseEventData::new(LicenseEvent::TrialExpired, organization_id, snapshot.evaluated_at)
                .with_plan(plan_slug)
                .with_metadata(json!({ "trialEndsAt": record.license.trial_ends_at })),
        );
    }

    events
}

/// Report `event` under [`LICENSE_EVENT_TARGET`]; limit overruns and expired
/// trials log at warn, everything else at info.
pub fn emit(event: &LicenseEventData) {
    let plan = event.plan_slug.as_deref().unwrap_or_default();
    match event.event {
        LicenseEvent::UserLimitExceeded | LicenseEvent::TrialExpired => tracing::warn!(
            target: LICENSE_EVENT_TARGET,
            event = %event.event,
            organization_id = %event.organization_id,
            plan = plan,
            metadata = %event.metadata,
            "License event"
        ),
        _ => tracing::info!(
            target: LICENSE_EVENT_TARGET,
            event = %event.event,
            organization_id = %event.organization_id,
            plan = plan,
            metadata = %event.metadata,
            "License event"
        ),
    }
}
