// src/main.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::{fs::File, io, path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schedule_core::config::{ManageConfig, ServerConfig};
use schedule_core::export::write_day_totals;
use schedule_core::manage_client::ManageClient;
use schedule_core::normalizer::parse_timezone;
use schedule_core::schedule_service::ScheduleService;
use schedule_core::server::{router, serve, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about = "Per-day schedule aggregation for dispatch")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Fetch one member's schedule and write per-day totals as CSV
    Export {
        #[arg(long)]
        member: String,
        #[arg(long)]
        start_date: NaiveDate,
        /// IANA timezone name; defaults to SCHEDULE_DEFAULT_TIMEZONE
        #[arg(long)]
        timezone: Option<String>,
        /// Output file; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let server_config = ServerConfig::from_env()?;
    let manage_config = ManageConfig::from_env()?;
    let client = ManageClient::new(manage_config).context("Failed to create schedule API client")?;
    let schedule_service = Arc::new(ScheduleService::new(Arc::new(client)));
    info!("Schedule service initialized.");

    match cli.command {
        Command::Serve => {
            let default_timezone = parse_timezone(&server_config.default_timezone)
                .context("Invalid SCHEDULE_DEFAULT_TIMEZONE")?;
            let state = AppState {
                schedule_service,
                default_timezone,
            };
            serve(router(state), &server_config).await?;
        }
        Command::Export {
            member,
            start_date,
            timezone,
            output,
        } => {
            let timezone_name = timezone.unwrap_or(server_config.default_timezone);
            let timezone = parse_timezone(&timezone_name)?;
            let report = schedule_service
                .get_schedule(&member, start_date, timezone)
                .await?;

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_day_totals(&report.days, file)?;
                    info!("Wrote {} day(s) to {}", report.days.len(), path.display());
                }
                None => write_day_totals(&report.days, io::stdout().lock())?,
            }
        }
    }

    Ok(())
}
