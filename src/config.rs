//! Runtime configuration: command-line flags over environment over defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::logging;

pub const HOME_ENV: &str = "TASKFLOW_HOME";
pub const BACKEND_ENV: &str = "TASKFLOW_BACKEND";
pub const LATENCY_ENV: &str = "TASKFLOW_LATENCY_MS";
pub const LOG_LEVEL_ENV: &str = "TASKFLOW_LOG_LEVEL";

const DEFAULT_HOME_DIR: &str = ".taskflow";
pub const DEFAULT_LATENCY_MS: u64 = 100;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BackendKind {
    Memory,
    #[default]
    Records,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Records => "records",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "mock" => Ok(Self::Memory),
            "records" | "remote" => Ok(Self::Records),
            other => Err(AppError::InvalidInput(format!(
                "unknown backend `{other}`; expected memory|records"
            ))),
        }
    }
}

/// Values given on the command line; `None` means not given.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub home: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub latency_ms: Option<u64>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub home: PathBuf,
    pub backend: BackendKind,
    pub latency: Duration,
    pub log_level: String,
}

impl Config {
    pub fn resolve(overrides: Overrides) -> Result<Self, AppError> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Same as `resolve`, reading variables through `env`.
    pub fn resolve_with<F>(overrides: Overrides, env: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let home = match overrides.home.or_else(|| lookup(HOME_ENV).map(PathBuf::from)) {
            Some(home) => home,
            None => default_home(&env)?,
        };

        let backend = match overrides.backend {
            Some(backend) => backend,
            None => match lookup(BACKEND_ENV) {
                Some(raw) => BackendKind::parse(&raw)?,
                None => BackendKind::default(),
            },
        };

        let latency_ms = match overrides.latency_ms {
            Some(ms) => ms,
            None => match lookup(LATENCY_ENV) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    AppError::InvalidInput(format!(
                        "{LATENCY_ENV} must be a whole number of milliseconds, got `{raw}`"
                    ))
                })?,
                None => DEFAULT_LATENCY_MS,
            },
        };

        let log_level = overrides
            .log_level
            .or_else(|| lookup(LOG_LEVEL_ENV))
            .unwrap_or_else(|| logging::default_log_level().to_string());
        let log_level = logging::normalize_level(&log_level)
            .map_err(AppError::InvalidInput)?
            .to_string();

        Ok(Self {
            home,
            backend,
            latency: Duration::from_millis(latency_ms),
            log_level,
        })
    }
}

fn default_home<F>(env: &F) -> Result<PathBuf, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let home = env("HOME")
        .or_else(|| env("USERPROFILE"))
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            AppError::InvalidInput(format!("HOME is not set; pass --home or set {HOME_ENV}"))
        })?;
    Ok(PathBuf::from(home).join(DEFAULT_HOME_DIR))
}
