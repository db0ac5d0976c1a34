use std::path::Path;

use aesyros_core::models::{AccessDecision, AppName, OrganizationLicenseWithPlan, UserCreationValidation};
use aesyros_core::{AppError, LicenseSnapshot, LogLevel};
use aesyros_services::{access_denial, creation_denial};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Load `.env` (or `env_file`) and then install the subscriber, so a RUST_LOG
/// set in the file takes effect.
pub fn init_cli(env_file: Option<&Path>) {
    load_env(env_file);
    init_tracing();
}

/// Variables already set in the process environment win over the file.
pub fn load_env(env_file: Option<&Path>) {
    match env_file {
        Some(path) => dotenvy::from_path(path).ok(),
        None => dotenvy::dotenv().ok().map(|_| ()),
    };
}

/// RUST_LOG when set, otherwise `info`.
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Licensing denials are expected outcomes; everything else is a failure.
pub fn failure_level(err: &anyhow::Error) -> LogLevel {
    err.downcast_ref::<AppError>()
        .map(AppError::log_level)
        .unwrap_or(LogLevel::Error)
}

pub fn log_failure(err: &anyhow::Error) {
    match failure_level(err) {
        LogLevel::Warn => tracing::warn!(error = %err, "Command refused"),
        LogLevel::Error => tracing::error!(error = ?err, "Command failed"),
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Read a license record from a JSON file. A literal `null` means no license.
pub fn read_license_file(path: &Path) -> anyhow::Result<Option<OrganizationLicenseWithPlan>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let license: Option<OrganizationLicenseWithPlan> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a license record", path.display()))?;

    if let Some(record) = &license {
        if let Err(e) = record.license_plan.check_invariants() {
            tracing::warn!(plan = %record.license_plan.slug, error = %e, "Plan record is inconsistent");
        }
    }

    Ok(license)
}

/// RFC 3339 instant, or the wall clock when absent.
pub fn parse_now(value: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match value {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --now value '{}': expected RFC 3339", raw))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppReport {
    pub app: AppName,
    pub has_access: bool,
    pub decision: AccessDecision,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub snapshot: LicenseSnapshot,
    pub user_creation: UserCreationValidation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<AppReport>,
}

impl EvaluationReport {
    /// Fail when the license would block adding a user or deny the gated app.
    pub fn enforce(&self) -> Result<(), AppError> {
        if let Some(err) = creation_denial(&self.snapshot, &self.user_creation) {
            return Err(err);
        }
        if let Some(err) = self.app.as_ref().and_then(|app| access_denial(&app.decision)) {
            return Err(err);
        }
        Ok(())
    }
}
