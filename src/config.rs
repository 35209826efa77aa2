use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};

use crate::health::AccessPolicy;
use crate::tracker::DEFAULT_REFRESH_INTERVAL;

const DATA_DIR_VAR: &str = "STEPGOAL_DATA_DIR";
const REFRESH_SECS_VAR: &str = "STEPGOAL_REFRESH_SECS";
const HEALTH_ACCESS_VAR: &str = "STEPGOAL_HEALTH_ACCESS";
const DEBUG_VAR: &str = "STEPGOAL_DEBUG";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub refresh_interval: Duration,
    pub health_access: AccessPolicy,
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = match lookup(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => lookup("HOME")
                .map(|home| PathBuf::from(home).join(".stepgoal"))
                .ok_or_else(|| anyhow!("{DATA_DIR_VAR} is unset and HOME is unknown"))?,
        };

        let refresh_interval = match lookup(REFRESH_SECS_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{REFRESH_SECS_VAR} must be a number of seconds"))?;
                if secs == 0 {
                    return Err(anyhow!("{REFRESH_SECS_VAR} must be greater than zero"));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_REFRESH_INTERVAL,
        };

        let health_access = match lookup(HEALTH_ACCESS_VAR) {
            Some(raw) => raw.parse()?,
            None => AccessPolicy::Grant,
        };

        let debug = lookup(DEBUG_VAR)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            data_dir,
            refresh_interval,
            health_access,
            debug,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("stepgoal.sqlite3")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_use_home_directory() {
        let config = config(&[("HOME", "/home/walker")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/home/walker/.stepgoal"));
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.health_access, AccessPolicy::Grant);
        assert!(!config.debug);
        assert_eq!(
            config.settings_path(),
            PathBuf::from("/home/walker/.stepgoal/settings.json")
        );
    }

    #[test]
    fn overrides_are_read() {
        let config = config(&[
            ("STEPGOAL_DATA_DIR", "/tmp/steps"),
            ("STEPGOAL_REFRESH_SECS", "15"),
            ("STEPGOAL_HEALTH_ACCESS", "deny"),
            ("STEPGOAL_DEBUG", "TRUE"),
        ])
        .unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/steps/stepgoal.sqlite3"));
        assert_eq!(config.refresh_interval, Duration::from_secs(15));
        assert_eq!(config.health_access, AccessPolicy::Deny);
        assert!(config.debug);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config(&[("HOME", "/h"), ("STEPGOAL_REFRESH_SECS", "0")]).is_err());
        assert!(config(&[("HOME", "/h"), ("STEPGOAL_REFRESH_SECS", "soon")]).is_err());
        assert!(config(&[("HOME", "/h"), ("STEPGOAL_HEALTH_ACCESS", "ask")]).is_err());
        assert!(config(&[]).is_err());
    }
}
