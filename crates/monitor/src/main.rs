//! line-monitor - alert rules against a live production-line feed.

use std::path::PathBuf;
use std::sync::Arc;

use alerts::{AlertingContext, StaticSnapshot};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use config::{DashboardSettings, SettingsStore};
use notify::{AlertSink, Notifier};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use monitor::{install_rules, load_products, load_rules, validate_rules, MockFeed, Monitor, SensorBank};

/// Samples kept per sensor.
const SENSOR_HISTORY: usize = 120;

/// line-monitor - Watch production data and raise alerts from configured rules.
#[derive(Parser)]
#[command(name = "line-monitor")]
#[command(about = "Alert rule engine for production-line monitoring")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings storage file
    #[arg(long, global = true, env = "DASHBOARD_SETTINGS_PATH")]
    settings_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll mock production data and evaluate rules until stopped
    Run {
        /// JSON file with an array of alert configurations
        #[arg(long)]
        rules: PathBuf,

        /// Products generated per refresh
        #[arg(long, default_value = "50")]
        products: usize,

        /// Stop after this many refresh cycles
        #[arg(long)]
        cycles: Option<u64>,

        /// Seed for reproducible mock data
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Evaluate rules once against a products file and print fired alerts
    Check {
        /// JSON file with an array of alert configurations
        #[arg(long)]
        rules: PathBuf,

        /// JSON file with an array of products
        #[arg(long)]
        products_file: PathBuf,
    },

    /// Validate a rules file without evaluating it
    Validate {
        /// JSON file with an array of alert configurations
        #[arg(long)]
        rules: PathBuf,
    },

    /// Show or change dashboard settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print current settings as JSON
    Show,

    /// Update one or more settings
    Set {
        /// Seconds between refreshes
        #[arg(long)]
        refresh: Option<u64>,

        /// Percent change that counts as a sensor trend
        #[arg(long)]
        trend_threshold: Option<f64>,

        /// Samples per trend window
        #[arg(long)]
        trend_window: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("monitor=debug,alerts=debug,notify=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let settings_store = cli
        .settings_file
        .map_or_else(SettingsStore::from_env, SettingsStore::new);

    match cli.command {
        Commands::Run {
            rules,
            products,
            cycles,
            seed,
        } => {
            let settings = settings_store.load_settings();
            let feed = Arc::new(MockFeed::new(seed, products));
            let mut ctx = AlertingContext::from_env(feed.clone());

            let installed = install_rules(ctx.store_mut(), load_rules(&rules)?);
            if installed == 0 {
                bail!("no valid rules in {}", rules.display());
            }
            tracing::info!(
                rules = installed,
                products,
                interval_secs = settings.auto_refresh_interval_secs,
                "Starting line monitor"
            );

            let monitor = Monitor::new(ctx, feed, SensorBank::mock(seed, SENSOR_HISTORY), settings);
            let summaries = monitor
                .run(cycles, async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                        std::future::pending::<()>().await;
                    }
                })
                .await;

            let fired: usize = summaries.iter().map(|s| s.fired).sum();
            println!("{} cycles, {} alerts fired", summaries.len(), fired);
        }

        Commands::Check {
            rules,
            products_file,
        } => {
            let products = load_products(&products_file)?;
            // Time-based rules read this snapshot if run on demand.
            let source = Arc::new(StaticSnapshot::new(products.clone()));
            let mut ctx = AlertingContext::new(AlertSink::new(Notifier::from_env()), source);

            install_rules(ctx.store_mut(), load_rules(&rules)?);
            let fired = ctx.run_checks(&products);
            ctx.shutdown();
            ctx.flush().await;

            println!("{}", serde_json::to_string_pretty(&fired)?);
        }

        Commands::Validate { rules } => {
            let reports = validate_rules(&load_rules(&rules)?);
            let mut rejected = 0;
            for report in &reports {
                match &report.error {
                    None => println!("✓ {} ({}, {}): {}", report.name, report.id, report.mode, report.condition),
                    Some(e) => {
                        rejected += 1;
                        println!("✗ {} ({}): {e}", report.name, report.id);
                    }
                }
            }
            println!("{} accepted, {} rejected", reports.len() - rejected, rejected);
            if rejected > 0 {
                bail!("{rejected} invalid rule(s) in {}", rules.display());
            }
        }

        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                let settings = settings_store.load_settings();
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
            SettingsAction::Set {
                refresh,
                trend_threshold,
                trend_window,
            } => {
                let current = settings_store.load_settings();
                let updated = DashboardSettings {
                    auto_refresh_interval_secs: refresh
                        .unwrap_or(current.auto_refresh_interval_secs),
                    trend_threshold: trend_threshold.unwrap_or(current.trend_threshold),
                    trend_window: trend_window.unwrap_or(current.trend_window),
                };
                settings_store.save_settings(&updated)?;
                tracing::info!(path = %settings_store.path().display(), "Settings saved");
                println!("{}", serde_json::to_string_pretty(&updated)?);
            }
        },
    }

    Ok(())
}
