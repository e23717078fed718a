use crate::model::DEFAULT_TASKS;
use crate::store::DATA_FILE;
use crate::validation;
use std::path::PathBuf;

pub const ENV_WORKSPACE: &str = "DAYPLAN_WORKSPACE";
pub const ENV_DATA_FILE: &str = "DAYPLAN_DATA_FILE";
pub const ENV_DEFAULT_TASKS: &str = "DAYPLAN_DEFAULT_TASKS";
pub const ENV_LOG: &str = "DAYPLAN_LOG";

#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace opened at startup, if any.
    pub workspace: Option<PathBuf>,
    /// Data file name inside a workspace.
    pub data_file: String,
    /// Titles seeded onto new days.
    pub default_tasks: Vec<String>,
    /// tracing-subscriber filter directive.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: None,
            data_file: DATA_FILE.to_string(),
            default_tasks: DEFAULT_TASKS.iter().map(|s| s.to_string()).collect(),
            log_filter: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        cfg.workspace = get(ENV_WORKSPACE).map(PathBuf::from);
        if let Some(name) = get(ENV_DATA_FILE) {
            cfg.data_file = name;
        }
        if let Some(raw) = lookup(ENV_DEFAULT_TASKS) {
            // Present but empty means "no default tasks".
            cfg.default_tasks = raw
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| match validation::title(s, ENV_DEFAULT_TASKS) {
                    Ok(title) => Some(title),
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping default task title");
                        None
                    }
                })
                .collect();
        }
        cfg.log_filter = get(ENV_LOG);
        cfg
    }
}
