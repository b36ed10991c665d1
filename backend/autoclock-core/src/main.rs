use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod attendance;
mod attendance_api;
mod clock_time;
mod config;
mod factorial_client;
mod reconcile;
mod session;
mod shift_index;
mod shift_policy;
mod submission;

#[cfg(test)]
mod shift_policy_tests;
#[cfg(test)]
mod test_support;

use config::{load_env_settings, AppConfig, Cli};
use factorial_client::FactorialClient;
use reconcile::{reconcile, reset_month, RunSummary};
use session::Session;

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Setting tracing subscriber failed")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let today = Local::now().date_naive();
    let env = load_env_settings().context("Failed to load environment")?;
    let config = AppConfig::resolve(cli, env, today).context("Invalid configuration")?;
    info!(
        "Target month {}/{}{}",
        config.month,
        config.year,
        if config.run.dry_run { " (dry run)" } else { "" }
    );

    let client =
        FactorialClient::new(config.factorial.clone()).context("Failed to build HTTP client")?;
    let session = Session::establish(
        &client,
        &config.email,
        &config.password,
        config.year,
        config.month,
    )
    .await
    .context("Session setup failed")?;
    info!(
        "Using period {} for {}/{}",
        session.period_id, session.month, session.year
    );

    if config.reset_month {
        if session.shifts.is_empty() {
            info!("No shifts recorded for {}/{}", session.month, session.year);
        }
        let outcomes = reset_month(&session, &client, config.run.dry_run)
            .await
            .context("Month reset aborted")?;
        for outcome in &outcomes {
            println!("{}", outcome);
        }
        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        if failed > 0 {
            warn!("{} of {} deletions failed", failed, outcomes.len());
        }
    } else {
        let outcomes = reconcile(&session, &client, &config.run)
            .await
            .context("Clock-in run aborted")?;
        for outcome in &outcomes {
            println!("{}", outcome);
        }
        let summary = RunSummary::from_outcomes(&outcomes);
        if summary.failed > 0 {
            warn!("Some days failed, check them in Factorial: {}", summary);
        } else {
            info!("{}", summary);
        }
    }

    println!("done!");
    Ok(())
}
