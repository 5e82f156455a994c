use std::env;

pub const DEFAULT_ROOM_ACTION_HTML: &str = "<button class=\"joinButton\">Join!</button>";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Remove whatever room occupies the next id slot before inserting a new one.
    pub evict_stale_room_slot: bool,
    pub max_room_name_len: usize,
    pub room_action_html: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: lookup("SERVER_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            evict_stale_room_slot: match lookup("EVICT_STALE_ROOM_SLOT") {
                Some(value) => parse_bool(&value)
                    .ok_or(ConfigError::InvalidFlag("EVICT_STALE_ROOM_SLOT", value))?,
                None => false,
            },
            max_room_name_len: match lookup("MAX_ROOM_NAME_LEN") {
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber("MAX_ROOM_NAME_LEN", value))?,
                None => 100,
            },
            room_action_html: lookup("ROOM_ACTION_HTML")
                .unwrap_or_else(|| DEFAULT_ROOM_ACTION_HTML.to_string()),
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            evict_stale_room_slot: false,
            max_room_name_len: 100,
            room_action_html: DEFAULT_ROOM_ACTION_HTML.to_string(),
            log_format: LogFormat::Text,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server port")]
    InvalidPort,
    #[error("{0} must be a boolean, got {1:?}")]
    InvalidFlag(&'static str, String),
    #[error("{0} must be a non-negative integer, got {1:?}")]
    InvalidNumber(&'static str, String),
}
