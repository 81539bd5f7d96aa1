// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::pitch::PollPolicy;

const DEFAULT_API_URL: &str = "http://localhost:5000/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONFIG_FILE: &str = "jobboard.yaml";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub environment: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub log_file: Option<PathBuf>,
    pub session_file: PathBuf,
    pub poll: PollSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PollSettings {
    #[serde(default = "PollSettings::default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "PollSettings::default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "PollSettings::default_multiplier")]
    pub multiplier: u32,
    #[serde(default = "PollSettings::default_max_attempts")]
    pub max_attempts: u32,
}

impl PollSettings {
    fn default_initial_delay_ms() -> u64 {
        2_000
    }
    fn default_max_delay_ms() -> u64 {
        30_000
    }
    fn default_multiplier() -> u32 {
        2
    }
    fn default_max_attempts() -> u32 {
        10
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: Self::default_initial_delay_ms(),
            max_delay_ms: Self::default_max_delay_ms(),
            multiplier: Self::default_multiplier(),
            max_attempts: Self::default_max_attempts(),
        }
    }
}

/// One profile of `jobboard.yaml`; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileConfig {
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub session_file: Option<PathBuf>,
    pub poll: Option<PollSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub local: ProfileConfig,
    #[serde(default)]
    pub production: ProfileConfig,
}

impl ConfigFile {
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse jobboard.yaml")
    }

    fn profile(self, environment: &str) -> ProfileConfig {
        match environment {
            "production" | "prod" => self.production,
            _ => self.local,
        }
    }
}

impl ClientConfig {
    /// Load `.env`, then the config file, then environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Self::get_environment(|key| std::env::var(key).ok());
        info!("Loading configuration for environment: {}", environment);

        let path = std::env::var("JOBBOARD_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        let file = Self::read_file(&path)?;

        Self::resolve(file, &environment, |key| std::env::var(key).ok())
    }

    fn get_environment(lookup: impl Fn(&str) -> Option<String>) -> String {
        lookup("JOBBOARD_ENV")
            .or_else(|| lookup("ENVIRONMENT"))
            .unwrap_or_else(|| "local".to_string())
    }

    fn read_file(path: &Path) -> Result<Option<ConfigFile>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        ConfigFile::parse(&content).map(Some)
    }

    /// Merge a parsed config file with environment lookups (env wins).
    pub fn resolve(
        file: Option<ConfigFile>,
        environment: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let profile = file
            .map(|f| f.profile(environment))
            .unwrap_or_default();

        let api_base_url = lookup("JOBBOARD_API_URL")
            .or(profile.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = match lookup("JOBBOARD_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("JOBBOARD_TIMEOUT_SECS must be a whole number of seconds")?,
            None => profile.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let log_file = lookup("JOBBOARD_LOG_FILE")
            .map(PathBuf::from)
            .or(profile.log_file);

        let session_file = lookup("JOBBOARD_SESSION_FILE")
            .map(PathBuf::from)
            .or(profile.session_file)
            .unwrap_or_else(|| Self::default_session_file(&lookup));

        Ok(Self {
            environment: environment.to_string(),
            api_base_url,
            timeout_secs,
            log_file,
            session_file,
            poll: profile.poll.unwrap_or_default(),
        })
    }

    fn default_session_file(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
        let home = lookup("HOME").unwrap_or_else(|| ".".to_string());
        PathBuf::from(home)
            .join(".config")
            .join("jobboard")
            .join("session")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_millis(self.poll.initial_delay_ms),
            max_delay: Duration::from_millis(self.poll.max_delay_ms),
            multiplier: self.poll.multiplier,
            max_attempts: self.poll.max_attempts,
        }
    }
}
