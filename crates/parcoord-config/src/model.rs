use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::parse::parse_bool;

/// Options consumed by post-processing coordination.
#[derive(Debug, Clone)]
pub struct Config {
    pub main_dir: PathBuf,
    pub queue_dir: PathBuf,
    pub par_quick: bool,
    /// Minutes; zero disables the repair time limit.
    pub par_time_limit: u32,
    pub pause_post_process: bool,
    raw: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_raw(HashMap::new()).expect("defaults are valid")
    }
}

impl Config {
    pub fn from_raw(raw: HashMap<String, String>) -> Result<Self, ConfigError> {
        let main_dir = raw
            .get("MainDir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("~/downloads"));
        let queue_dir = raw
            .get("QueueDir")
            .map(PathBuf::from)
            .unwrap_or_else(|| main_dir.join("queue"));
        let par_quick = bool_option(&raw, "ParQuick", true)?;
        let par_time_limit = match raw.get("ParTimeLimit") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                option: "ParTimeLimit".to_string(),
                value: value.clone(),
            })?,
            None => 0,
        };
        let pause_post_process = bool_option(&raw, "PausePostProcess", false)?;

        Ok(Self {
            main_dir,
            queue_dir,
            par_quick,
            par_time_limit,
            pause_post_process,
            raw,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.raw.get(key).map(String::as_str)
    }
}

fn bool_option(
    raw: &HashMap<String, String>,
    option: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match raw.get(option) {
        Some(value) => parse_bool(value).ok_or_else(|| ConfigError::InvalidValue {
            option: option.to_string(),
            value: value.clone(),
        }),
        None => Ok(default),
    }
}
