//! Aesyros license CLI: evaluate license records offline or against the database.
//!
//! `evaluate` needs nothing but a JSON file. `check` and `plans` read
//! DATABASE_URL (and the other licensing settings) from the environment.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use aesyros_cli::{
    init_cli, log_failure, parse_now, print_json, read_license_file, AppReport, EvaluationReport,
};
use aesyros_core::models::AppName;
use aesyros_core::{LicenseRepository, LicensingConfig};
use aesyros_db::{setup_database, PgLicenseRepository};
use aesyros_services::{InMemoryLicenseRepository, LicenseService};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "aesyros-license", about = "Aesyros license evaluation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a license record read from a JSON file
    Evaluate {
        /// Path to an organization license (with plan) as JSON, or `null`
        #[arg(long)]
        file: PathBuf,
        /// Evaluation instant (RFC 3339); defaults to now
        #[arg(long)]
        now: Option<String>,
        /// Also gate this app: align, drive, pulse, catalyst, flow, foresight
        #[arg(long)]
        app: Option<AppName>,
        /// Exit non-zero if a user cannot be added or --app is denied
        #[arg(long)]
        enforce: bool,
    },
    /// Evaluate an organization's license from the database
    Check {
        /// Organization UUID
        #[arg(long)]
        org: Uuid,
        /// Also gate this app
        #[arg(long)]
        app: Option<AppName>,
        /// Exit non-zero if a user cannot be added or --app is denied
        #[arg(long)]
        enforce: bool,
    },
    /// List active plans, cheapest first
    Plans,
}

async fn report<R: LicenseRepository>(
    service: &LicenseService<R>,
    organization_id: Uuid,
    now: DateTime<Utc>,
    app: Option<AppName>,
) -> anyhow::Result<EvaluationReport> {
    let snapshot = service.snapshot_at(organization_id, now).await?;
    let user_creation = snapshot.user_creation();

    let app = match app {
        Some(app) => Some(AppReport {
            app,
            has_access: service.check_app_access(organization_id, app).await?,
            decision: service.app_decision(organization_id, app).await?,
        }),
        None => None,
    };

    Ok(EvaluationReport {
        snapshot,
        user_creation,
        app,
    })
}

async fn database_service() -> anyhow::Result<LicenseService<PgLicenseRepository>> {
    let config = LicensingConfig::from_env().context("Failed to load licensing configuration")?;
    let pool = setup_database(&config).await?;
    Ok(LicenseService::new(
        Arc::new(PgLicenseRepository::new(pool)),
        &config,
    ))
}

fn emit(report: &EvaluationReport, enforce: bool) -> anyhow::Result<()> {
    print_json(report)?;
    if enforce {
        report.enforce()?;
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Evaluate {
            file,
            now,
            app,
            enforce,
        } => {
            let now = parse_now(now.as_deref())?;
            let license = read_license_file(&file)?;
            let organization_id = license
                .as_ref()
                .map(|record| record.organization_id())
                .unwrap_or_else(Uuid::nil);

            let repository = Arc::new(InMemoryLicenseRepository::new());
            if let Some(record) = license {
                repository.put_license(record).await;
            }
            let service = LicenseService::new(repository, &LicensingConfig::offline());

            emit(&report(&service, organization_id, now, app).await?, enforce)?;
        }
        Commands::Check { org, app, enforce } => {
            let service = database_service().await?;
            emit(&report(&service, org, Utc::now(), app).await?, enforce)?;
        }
        Commands::Plans => {
            let service = database_service().await?;
            print_json(&service.active_plans().await?)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_cli(None);

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_failure(&err);
            ExitCode::FAILURE
        }
    }
}
