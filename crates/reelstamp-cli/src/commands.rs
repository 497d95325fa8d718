//! Command execution and output rendering

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use reelstamp_core::{SettingsStore, Timestamp, TimestampSettings, TrimRange};

use crate::cli::{Cli, Command};

/// Every representation of a single timestamp
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampReport {
    pub timestamp: String,
    pub srt: String,
    pub seconds: f64,
    pub seconds_string: String,
}

impl From<&Timestamp> for TimestampReport {
    fn from(ts: &Timestamp) -> Self {
        Self {
            timestamp: ts.to_string(),
            srt: ts.to_string_for_srt(),
            seconds: ts.to_seconds(),
            seconds_string: ts.to_seconds_string(),
        }
    }
}

impl TimestampReport {
    fn to_text(&self) -> String {
        format!(
            "text:    {}\nsrt:     {}\nseconds: {}",
            self.timestamp, self.srt, self.seconds_string
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimReport {
    pub range: TrimRange,
    pub duration: TimestampReport,
    pub filter: String,
}

/// Loads settings from `--settings` and applies command-line overrides
pub fn resolve_settings(cli: &Cli) -> Result<TimestampSettings> {
    let mut settings = match &cli.settings {
        Some(path) => SettingsStore::new(path)
            .try_load()
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => TimestampSettings::default(),
    };

    if let Some(formula) = cli.minutes_formula {
        settings.minutes_formula = formula.into();
    }

    debug!(
        "Using minutes formula {} with {:?} negative seconds",
        settings.minutes_formula, settings.negative_seconds
    );
    Ok(settings)
}

/// Runs a command and returns the rendered output
pub fn run(command: &Command, settings: &TimestampSettings, json: bool) -> Result<String> {
    match command {
        Command::Parse { timestamp } => {
            let ts = parse_arg(timestamp)?;
            render_timestamp(&ts, json)
        }
        Command::FromSeconds { seconds } => {
            let ts = settings
                .seconds_to_timestamp(*seconds)
                .with_context(|| format!("Cannot build a timestamp from {} seconds", seconds))?;
            render_timestamp(&ts, json)
        }
        Command::Sub { left, right } => {
            let (left, right) = (parse_arg(left)?, parse_arg(right)?);
            let diff = settings
                .difference(&left, &right)
                .with_context(|| format!("Cannot subtract {} from {}", right, left))?;
            info!("{} - {} = {}", left, right, diff);
            render_timestamp(&diff, json)
        }
        Command::Trim {
            start,
            end,
            audio,
            input,
            output,
        } => {
            let range = TrimRange::new(parse_arg(start)?, parse_arg(end)?)
                .context("Trim end must not precede its start")?;

            let filter = match (input, output) {
                (Some(input), Some(output)) => range.to_filter_string(input, output, *audio),
                _ if *audio => range.to_atrim_filter(),
                _ => range.to_trim_filter(),
            };

            if json {
                let report = TrimReport {
                    range,
                    duration: TimestampReport::from(&range.duration()),
                    filter,
                };
                Ok(serde_json::to_string_pretty(&report)?)
            } else {
                Ok(filter)
            }
        }
    }
}

fn parse_arg(raw: &str) -> Result<Timestamp> {
    Timestamp::parse(raw).with_context(|| format!("Invalid timestamp argument {:?}", raw))
}

fn render_timestamp(ts: &Timestamp, json: bool) -> Result<String> {
    let report = TimestampReport::from(ts);
    if json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(report.to_text())
    }
}
