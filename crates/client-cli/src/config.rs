use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SERVER: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub server: Option<String>,
    /// Applies to every request, login included
    pub timeout_secs: Option<u64>,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "tracker", "tracker")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = project_dirs()?;

        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;

        Ok(config_dir.join("config.toml"))
    }

    /// Where the session snapshot lives
    pub fn data_dir() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn server(&self) -> String {
        self.remote
            .server
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "server" => self.remote.server = Some(value),
            "timeout_secs" => {
                let secs = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("timeout_secs must be a whole number of seconds"))?;
                self.remote.timeout_secs = Some(secs);
            }
            _ => anyhow::bail!("Unknown config key: {}. Valid keys: server, timeout_secs", key),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "server" => Ok(self.server()),
            "timeout_secs" => Ok(self.timeout().as_secs().to_string()),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server(), DEFAULT_SERVER);
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_set_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set("server", "http://tracker.local:9000".to_string()).unwrap();
        config.set("timeout_secs", "3".to_string()).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.get("server").unwrap(), "http://tracker.local:9000");
        assert_eq!(loaded.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_rejects_unknown_key_and_bad_timeout() {
        let mut config = Config::default();
        assert!(config.set("token", "abc".to_string()).is_err());
        assert!(config.set("timeout_secs", "soon".to_string()).is_err());
        assert!(config.get("api_key").is_err());
    }
}
