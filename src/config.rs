use std::path::PathBuf;

use crate::error::ConfigError;
use crate::projects::ProjectDeletePolicy;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_LOG_DIR: &str = ".taskboard/logs";

/// Startup configuration, read once from the environment (after `.env`).
///
/// The record service credentials are optional here; the HTTP transport
/// insists on them, the demo store does not.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
    pub delete_policy: ProjectDeletePolicy,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let delete_policy = match non_empty("TASKBOARD_CASCADE_DELETE") {
            Some(raw) if parse_bool("TASKBOARD_CASCADE_DELETE", &raw)? => {
                ProjectDeletePolicy::CascadeTasks
            }
            _ => ProjectDeletePolicy::KeepTasks,
        };

        Ok(Self {
            api_url: non_empty("TASKBOARD_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            project_id: non_empty("TASKBOARD_PROJECT_ID"),
            public_key: non_empty("TASKBOARD_PUBLIC_KEY"),
            delete_policy,
            log_dir: non_empty("TASKBOARD_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        })
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}
