// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

mod api;
mod config;
mod currencies;
mod db;
mod error;
mod export;
mod history_report;
mod logger;
mod models;
mod query;
mod report;
mod scheduler;
mod seeding;
mod validator;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::info;

use crate::api::{FrankfurterClient, OpenErClient};
use crate::config::Config;
use crate::currencies::{CurrencyStore, SqliteCurrencyStore};
use crate::history_report::{HistoryReportPipeline, ReportOutcome};
use crate::query::CurrencyQueryService;
use crate::scheduler::Scheduler;
use crate::seeding::SeedingPipeline;

#[derive(Parser)]
#[command(
    name = "rate-seeder",
    version,
    about = "Scrape EUR exchange rates into SQLite and render their history"
)]
struct Cli {
    /// Path to config.toml (defaults to the one next to Cargo.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run both pipelines on their schedules until Ctrl-C
    Run,
    /// Run one seeding cycle
    Seed,
    /// Render the history report once
    Report,
    /// List stored currencies
    List {
        #[arg(long)]
        json: bool,
    },
    /// Export stored currencies to CSV
    Export {
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
    },
}

struct App {
    seeding: Arc<SeedingPipeline>,
    history: Arc<HistoryReportPipeline>,
    query: CurrencyQueryService,
}

async fn build_app(config: &Config) -> Result<App> {
    let pool = db::create_db_pool(&config.database_url).await?;
    let store: Arc<dyn CurrencyStore> = Arc::new(SqliteCurrencyStore::new(pool));

    let client = api::http_client(config.request_timeout())?;
    let primary = FrankfurterClient::new(
        client.clone(),
        &config.sources.primary_url,
        config.report.history_days,
    );
    let secondary = OpenErClient::new(client.clone(), &config.sources.secondary_url);
    let history = FrankfurterClient::new(
        client,
        &config.sources.history_url,
        config.report.history_days,
    );

    Ok(App {
        seeding: Arc::new(SeedingPipeline::new(
            Arc::new(primary),
            Arc::new(secondary),
            store.clone(),
        )),
        history: Arc::new(HistoryReportPipeline::new(
            Arc::new(history),
            config.report_path(),
        )),
        query: CurrencyQueryService::new(store),
    })
}

async fn run_scheduler(config: &Config, app: App) -> Result<()> {
    let mut scheduler = Scheduler::new();
    scheduler
        .add(config.seeding_trigger(), app.seeding)
        .add(config.report_trigger()?, app.history);

    let handles = scheduler.start();
    info!("Scheduler started, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    for handle in handles {
        handle.abort();
    }
    Ok(())
}

async fn list_currencies(query: &CurrencyQueryService, json: bool) -> Result<()> {
    let currencies = query.get_all_currencies().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&currencies)?);
        return Ok(());
    }

    if currencies.is_empty() {
        println!("No currencies stored yet, run `rate-seeder seed` first");
    }
    for currency in currencies {
        println!(
            "{} - {} (updated {})",
            currency.code, currency.rate, currency.updated_at
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    logger::init_logger();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path)?;
    let app = build_app(&config).await?;

    match cli.command {
        Command::Run => run_scheduler(&config, app).await?,
        Command::Seed => {
            let outcome = app.seeding.run().await?;
            println!(
                "✅ Seeded from {} source: {} new, {} updated",
                outcome.source, outcome.inserted, outcome.updated
            );
        }
        Command::Report => match app.history.run().await? {
            ReportOutcome::Written { path, snapshots } => {
                println!(
                    "✅ History report with {} snapshots written to {}",
                    snapshots,
                    path.display()
                );
            }
            ReportOutcome::WriteFailed => {
                anyhow::bail!(
                    "History report could not be written to {}",
                    app.history.output_path().display()
                );
            }
        },
        Command::List { json } => list_currencies(&app.query, json).await?,
        Command::Export { output_dir } => {
            let path = export::export_currencies_csv(&app.query, &output_dir).await?;
            println!("✅ CSV file created at: {}", path.display());
        }
    }

    Ok(())
}
