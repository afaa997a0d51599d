mod defaults;
mod env;
pub mod types;
mod validation;

use std::path::Path;

pub use defaults::{
    DEFAULT_DATABASE_PATH, DEFAULT_HOST, DEFAULT_LOG_LEVEL, DEFAULT_MAX_ATTEMPTS, DEFAULT_PORT,
};
pub use types::*;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Missing environment variables: {0:?}")]
    MissingEnvVars(Vec<String>),

    #[error("Invalid value for '{0}': {1}")]
    InvalidValue(String, String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DossierConfig {
    /// Parse a configuration from a YAML string.
    /// Environment variables in the format `${VAR_NAME}` will be interpolated.
    /// Sections that are left out take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let interpolated = env::interpolate_env(yaml)?;

        // An empty (or comment-only) file parses as null.
        if interpolated.lines().all(|l| {
            let l = l.trim();
            l.is_empty() || l.starts_with('#')
        }) {
            return Ok(Self::default());
        }

        let config: DossierConfig = serde_yaml::from_str(&interpolated)?;
        Ok(config)
    }

    /// Load a configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Serialize the configuration as YAML. Secrets are redacted.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
database:
  path: /var/lib/dossier/agents.db
server:
  host: 0.0.0.0
  port: 8080
  api_key: s3cret
codename:
  max_attempts: 5
logging:
  level: debug
  format: json
"#;

        let config = DossierConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.database.path, "/var/lib/dossier/agents.db");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.api_key.as_ref().map(|k| k.expose()), Some("s3cret"));
        assert_eq!(config.codename.max_attempts, 5);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_partial_config_fills_defaults() {
        let yaml = r#"
server:
  port: 9000
"#;

        let config = DossierConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.database.path, DEFAULT_DATABASE_PATH);
        assert_eq!(config.codename.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = DossierConfig::from_yaml("# nothing here\n").unwrap();
        assert_eq!(config, DossierConfig::default());
    }

    #[test]
    fn test_parse_with_env_vars() {
        std::env::set_var("DOSSIER_TEST_DB_PATH", "/tmp/agents.db");

        let yaml = r#"
database:
  path: ${DOSSIER_TEST_DB_PATH}
"#;

        let config = DossierConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.database.path, "/tmp/agents.db");
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = DossierConfig::from_yaml("server: [unclosed");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_to_yaml_redacts_api_key() {
        let mut config = DossierConfig::default();
        config.server.api_key = Some(Secret::new("topsecret"));
        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.contains("topsecret"));
        assert!(yaml.contains("max_attempts: 20"));
    }

    #[test]
    fn test_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("dossier.yaml");
        std::fs::write(&path, "database:\n  in_memory: true\n").unwrap();

        let config = DossierConfig::from_file(&path).unwrap();
        assert!(config.database.in_memory);
    }

    #[test]
    fn test_from_missing_file() {
        let result = DossierConfig::from_file(Path::new("/nonexistent/dossier.yaml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
