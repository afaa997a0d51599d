use crate::types::{CodenameConfig, DatabaseConfig, LogFormat, LoggingConfig, ServerSettings};

/// Default SQLite file, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "dossier.db";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_ATTEMPTS: usize = 20;
pub const DEFAULT_LOG_LEVEL: &str = "info";

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DATABASE_PATH.to_string(),
            in_memory: false,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
        }
    }
}

impl Default for CodenameConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}
