// Service configuration read from the environment, with a .env file loaded
// first when present.

use crate::modules::exercise_progress::core::stats::MaxWeightMode;
use crate::modules::exercise_progress::use_cases::reconcile_progress::worker::WorkerSettings;
use crate::modules::exercise_progress::use_cases::track_workout_progress::handler::DEFAULT_CONFLICT_RETRIES;
use crate::shared::infrastructure::job_queue::JobOptions;
use anyhow::{Context, Result, bail};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub worker: WorkerSettings,
    pub job_options: JobOptions,
    pub max_weight_mode: MaxWeightMode,
    pub conflict_retries: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let defaults = JobOptions::default();

        Ok(Self {
            http_addr: parse(&var_or("HTTP_ADDR", "0.0.0.0:8080"), "HTTP_ADDR")?,
            worker: WorkerSettings {
                concurrency: parse(
                    &var_or("PROGRESS_WORKER_CONCURRENCY", "4"),
                    "PROGRESS_WORKER_CONCURRENCY",
                )?,
                rate_limit_max: parse(
                    &var_or("PROGRESS_RATE_LIMIT_MAX", "10"),
                    "PROGRESS_RATE_LIMIT_MAX",
                )?,
                rate_limit_window: Duration::from_millis(parse(
                    &var_or("PROGRESS_RATE_LIMIT_WINDOW_MS", "1000"),
                    "PROGRESS_RATE_LIMIT_WINDOW_MS",
                )?),
            },
            job_options: JobOptions {
                attempts: parse(&var_or("PROGRESS_JOB_ATTEMPTS", "3"), "PROGRESS_JOB_ATTEMPTS")?,
                backoff: Duration::from_millis(parse(
                    &var_or("PROGRESS_JOB_BACKOFF_MS", "2000"),
                    "PROGRESS_JOB_BACKOFF_MS",
                )?),
                ..defaults
            },
            max_weight_mode: parse_max_weight_mode(&var_or("PROGRESS_MAX_WEIGHT_MODE", "raw"))?,
            conflict_retries: parse(
                &var_or(
                    "PROGRESS_CONFLICT_RETRIES",
                    &DEFAULT_CONFLICT_RETRIES.to_string(),
                ),
                "PROGRESS_CONFLICT_RETRIES",
            )?,
        })
    }
}

fn parse<T>(raw: &str, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid {key} value: {raw}"))
}

fn parse_max_weight_mode(raw: &str) -> Result<MaxWeightMode> {
    match raw.trim().to_lowercase().as_str() {
        "raw" => Ok(MaxWeightMode::RawLoad),
        "effective" => Ok(MaxWeightMode::EffectiveLoad),
        other => bail!("Invalid PROGRESS_MAX_WEIGHT_MODE value: {other}"),
    }
}
