use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tictactoe_common::config::{
    ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer,
};
use tictactoe_common::games::tictactoe::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};

pub const CONFIG_FILE_NAME: &str = "tictactoe_server_config.yaml";

pub fn default_config_path() -> PathBuf {
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        return exe_dir.join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn get_config_manager(
    path: impl Into<PathBuf>,
) -> ConfigManager<FileContentConfigProvider, ServerConfig, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(path)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Directory served for any path that is not an API route.
    pub static_files_path: Option<PathBuf>,
    pub min_board_size: usize,
    pub max_board_size: usize,
    pub session_inactivity_timeout_secs: u64,
    pub cleanup_interval_secs: u64,
    /// Fixed seed for every session's bot randomness. Unset means a fresh random seed per session.
    pub rng_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            static_files_path: None,
            min_board_size: MIN_BOARD_SIZE,
            max_board_size: MAX_BOARD_SIZE,
            session_inactivity_timeout_secs: 3600,
            cleanup_interval_secs: 300,
            rng_seed: None,
        }
    }
}

impl ServerConfig {
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.session_inactivity_timeout_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bind_address.trim().is_empty() {
            return Err("Bind address cannot be empty".to_string());
        }
        if self.min_board_size < MIN_BOARD_SIZE {
            return Err(format!("Minimum board size cannot be below {}", MIN_BOARD_SIZE));
        }
        if self.max_board_size > MAX_BOARD_SIZE {
            return Err(format!("Maximum board size cannot exceed {}", MAX_BOARD_SIZE));
        }
        if self.max_board_size < self.min_board_size {
            return Err(format!(
                "Maximum board size ({}) cannot be below minimum ({})",
                self.max_board_size, self.min_board_size
            ));
        }
        if self.session_inactivity_timeout_secs == 0 {
            return Err("Session inactivity timeout must be positive".to_string());
        }
        if self.cleanup_interval_secs == 0 {
            return Err("Cleanup interval must be positive".to_string());
        }
        Ok(())
    }
}
