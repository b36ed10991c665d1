// src/config.rs

use chrono::{Datelike, NaiveDate};
use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::attendance::ShiftWindow;
use crate::clock_time::{clock_key, TimeParseError};
use crate::factorial_client::FactorialConfig;
use crate::reconcile::{RunOptions, DEFAULT_LOCATION_TYPE};
use crate::shift_policy::PolicyConfig;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "autoclock",
    version,
    about = "FactorialHR auto clock in for the whole month from the command line"
)]
pub struct Cli {
    /// Your Factorial email address (falls back to $EMAIL)
    #[arg(short, long)]
    pub email: Option<String>,

    /// Clock-in year, defaults to the current year
    #[arg(short, long, value_name = "YYYY")]
    pub year: Option<i32>,

    /// Clock-in month, defaults to the current month
    #[arg(short, long, value_name = "MM")]
    pub month: Option<u32>,

    /// Default clock-in time
    #[arg(long = "clock-in", visible_alias = "ci", value_name = "HH:MM", default_value = "09:00")]
    pub clock_in: String,

    /// Default clock-out time
    #[arg(long = "clock-out", visible_alias = "co", value_name = "HH:MM", default_value = "18:00")]
    pub clock_out: String,

    /// Clock in for today only
    #[arg(short, long)]
    pub today: bool,

    /// Clock in only until today
    #[arg(long, visible_alias = "ut")]
    pub until_today: bool,

    /// Report what would be submitted without changing anything
    #[arg(long, visible_alias = "dr")]
    pub dry_run: bool,

    /// Delete all shifts for the given month
    #[arg(long, visible_alias = "rm")]
    pub reset_month: bool,

    /// Location type sent with every entry
    #[arg(long, default_value = DEFAULT_LOCATION_TYPE)]
    pub location_type: String,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Values read from the process environment (and `.env`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvSettings {
    pub email: Option<String>,
    pub password: Option<String>,
    pub factorial_base_url: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Missing {0}: pass it as a flag or set it in the environment")]
    MissingCredential(&'static str),

    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("Invalid {field}: {source}")]
    InvalidClockTime {
        field: &'static str,
        #[source]
        source: TimeParseError,
    },

    #[error("Clock-in {clock_in} must be before clock-out {clock_out}")]
    InvalidWindow { clock_in: String, clock_out: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub email: String,
    pub password: String,
    pub year: i32,
    pub month: u32,
    pub reset_month: bool,
    pub run: RunOptions,
    pub factorial: FactorialConfig,
}

pub fn load_env_settings() -> Result<EnvSettings, ConfigError> {
    Ok(envy::from_env::<EnvSettings>()?)
}

impl AppConfig {
    /// Combines flags and environment. `today` decides the default month and
    /// drives the today-only and until-today filters.
    pub fn resolve(cli: Cli, env: EnvSettings, today: NaiveDate) -> Result<Self, ConfigError> {
        let email = cli
            .email
            .or(env.email)
            .filter(|e| !e.trim().is_empty())
            .ok_or(ConfigError::MissingCredential("EMAIL"))?;
        let password = env
            .password
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingCredential("PASSWORD"))?;

        // --today always targets the current month.
        let (year, month) = if cli.today {
            (today.year(), today.month())
        } else {
            (
                cli.year.unwrap_or_else(|| today.year()),
                cli.month.unwrap_or_else(|| today.month()),
            )
        };
        if !(1..=12).contains(&month) {
            return Err(ConfigError::InvalidMonth(month));
        }

        let clock_in = clock_key(&cli.clock_in).map_err(|source| ConfigError::InvalidClockTime {
            field: "clock-in",
            source,
        })?;
        let clock_out = clock_key(&cli.clock_out).map_err(|source| ConfigError::InvalidClockTime {
            field: "clock-out",
            source,
        })?;
        if clock_in >= clock_out {
            return Err(ConfigError::InvalidWindow {
                clock_in: cli.clock_in,
                clock_out: cli.clock_out,
            });
        }

        let mut factorial = FactorialConfig::default();
        if let Some(base_url) = env.factorial_base_url.filter(|u| !u.is_empty()) {
            factorial.base_url = base_url;
        }

        Ok(Self {
            email,
            password,
            year,
            month,
            reset_month: cli.reset_month,
            run: RunOptions {
                policy: PolicyConfig {
                    default_window: ShiftWindow::new(cli.clock_in, cli.clock_out),
                    today_only: cli.today,
                    until_today: cli.until_today,
                    today,
                },
                location_type: cli.location_type,
                dry_run: cli.dry_run,
            },
            factorial,
        })
    }
}
