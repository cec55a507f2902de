use std::path::PathBuf;
use std::fs;
use serde::{Serialize, Deserialize};

/// Logging defaults read from `~/.minils.config` (JSON). The output format
/// is only ever chosen on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinilsConfig {
    /// Log level used when MINILS_LOG_LEVEL is unset
    pub log_level: Option<String>,
    /// Log file used when MINILS_LOG_FILE is unset
    pub log_file: Option<PathBuf>,
}

impl MinilsConfig {
    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        if let Some(path) = std::env::var_os("MINILS_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or("Could not find home directory")?;
        Ok(home.join(".minils.config"))
    }

    pub fn load() -> Result<MinilsConfig, Box<dyn std::error::Error>> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<MinilsConfig, Box<dyn std::error::Error>> {
        if !config_path.exists() {
            return Err("config file does not exist".into());
        }

        let content = fs::read_to_string(config_path)?;
        let config: MinilsConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    pub fn exists() -> bool {
        Self::config_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }
}
