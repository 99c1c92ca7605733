// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context};
use chrono::NaiveTime;
use serde::Deserialize;

use crate::scheduler::Trigger;

/// Upper bound for `report.history_days` (about ten years).
pub const MAX_HISTORY_DAYS: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub seeding: SeedingConfig,
    pub report: ReportConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeedingConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Local time of day, "HH:MM"
    pub daily_at: String,
    pub output_dir: PathBuf,
    pub file_name: String,
    pub history_days: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub primary_url: String,
    pub secondary_url: String,
    pub history_url: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:rates.db".to_string(),
            seeding: SeedingConfig::default(),
            report: ReportConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60 * 60,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            daily_at: "05:00".to_string(),
            output_dir: PathBuf::from("output"),
            file_name: "last_three_months_rates.pdf".to_string(),
            history_days: 90,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            primary_url: "https://api.frankfurter.app".to_string(),
            secondary_url: "https://open.er-api.com/v6".to_string(),
            history_url: "https://api.frankfurter.app".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn seeding_trigger(&self) -> Trigger {
        Trigger::Every(Duration::from_secs(self.seeding.interval_secs))
    }

    pub fn report_trigger(&self) -> anyhow::Result<Trigger> {
        let time = NaiveTime::parse_from_str(&self.report.daily_at, "%H:%M")
            .with_context(|| format!("Invalid report.daily_at {:?}", self.report.daily_at))?;
        Ok(Trigger::DailyAt(time))
    }

    pub fn report_path(&self) -> PathBuf {
        self.report.output_dir.join(&self.report.file_name)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.timeout_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.seeding.interval_secs > 0,
            "seeding.interval_secs must be positive"
        );
        ensure!(
            self.sources.timeout_secs > 0,
            "sources.timeout_secs must be positive"
        );
        ensure!(
            self.report.history_days > 0,
            "report.history_days must be positive"
        );
        ensure!(
            self.report.history_days <= MAX_HISTORY_DAYS,
            "report.history_days must be at most {}",
            MAX_HISTORY_DAYS
        );
        ensure!(
            !self.report.file_name.is_empty(),
            "report.file_name must not be empty"
        );
        self.report_trigger()?;
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("config.toml");
    path
}

/// Load the config from `path`, falling back to the built-in defaults when
/// the file does not exist. `DATABASE_URL` overrides `database_url`.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let mut config = if path.exists() {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        Config::default()
    };

    if let Ok(database_url) = std::env::var("DATABASE_URL") {
        config.database_url = database_url;
    }

    config.validate()?;
    Ok(config)
}
