use std::cmp::Ordering;

use super::seats::{effective_cap, SeatCap};
use crate::constants::UPGRADE_RECOMMENDATION_USAGE_PERCENT;
use crate::models::{
    AppName, LicensePlan, LicensePlanComparison, LicenseUsageStats, OrganizationLicenseWithPlan,
    PricingModel,
};

/// Suggest active plans that keep every current app and either relieve seat
/// pressure or, when seats are fine, add apps. Cheapest first.
pub fn compare_plans(
    current: &OrganizationLicenseWithPlan,
    available: &[LicensePlan],
    usage: &LicenseUsageStats,
) -> LicensePlanComparison {
    let current_plan = &current.license_plan;
    let cap = effective_cap(current);
    let seat_pressure = usage.is_over_limit
        || !cap.has_room(usage.current_users)
        || usage.usage_percentage > UPGRADE_RECOMMENDATION_USAGE_PERCENT;

    let mut suggested_plans: Vec<LicensePlan> = available
        .iter()
        .filter(|plan| plan.is_active && plan.id != current_plan.id && plan.slug != current_plan.slug)
        .filter(|plan| covers_apps(plan, &current_plan.included_apps))
        .filter(|plan| {
            if seat_pressure {
                relieves_seats(plan, usage.current_users)
            } else {
                !extra_apps(plan, &current_plan.included_apps).is_empty()
            }
        })
        .cloned()
        .collect();
    suggested_plans.sort_by(|a, b| compare_price(a, b));

    let mut reasons = Vec::new();
    if seat_pressure {
        reasons.push(format!(
            "Using {} of {} seats ({}%)",
            usage.current_users, cap, usage.usage_percentage
        ));
    }
    let mut additional: Vec<AppName> = suggested_plans
        .iter()
        .flat_map(|plan| extra_apps(plan, &current_plan.included_apps))
        .collect();
    additional.sort();
    additional.dedup();
    if !additional.is_empty() {
        let names: Vec<&str> = additional.iter().map(AppName::as_str).collect();
        reasons.push(format!("Additional apps available: {}", names.join(", ")));
    }

    LicensePlanComparison {
        current_plan: current_plan.clone(),
        suggested_plans,
        reasons,
    }
}

fn covers_apps(plan: &LicensePlan, apps: &[AppName]) -> bool {
    apps.iter().all(|app| plan.includes(*app))
}

fn extra_apps(plan: &LicensePlan, apps: &[AppName]) -> Vec<AppName> {
    plan.included_apps
        .iter()
        .copied()
        .filter(|app| !apps.contains(app))
        .collect()
}

fn relieves_seats(plan: &LicensePlan, current_users: u32) -> bool {
    plan.pricing_model == PricingModel::Organization
        || SeatCap::from_columns(None, plan.max_users).has_room(current_users)
}

// Unpriced plans sort last
fn compare_price(a: &LicensePlan, b: &LicensePlan) -> Ordering {
    match (a.price_per_unit, b.price_per_unit) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
