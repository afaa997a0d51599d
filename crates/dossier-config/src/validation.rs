use crate::types::DossierConfig;
use crate::ConfigError;

impl DossierConfig {
    /// Validate the configuration and return a list of errors.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !self.database.in_memory && self.database.path.trim().is_empty() {
            errors.push(ConfigError::InvalidValue(
                "database.path".to_string(),
                "must not be empty unless database.in_memory is set".to_string(),
            ));
        }

        if self.server.host.trim().is_empty() {
            errors.push(ConfigError::InvalidValue(
                "server.host".to_string(),
                "must not be empty".to_string(),
            ));
        }

        if let Some(key) = &self.server.api_key {
            if key.expose().trim().is_empty() {
                errors.push(ConfigError::InvalidValue(
                    "server.api_key".to_string(),
                    "must not be blank; remove it to disable authentication".to_string(),
                ));
            }
        }

        if self.codename.max_attempts == 0 {
            errors.push(ConfigError::InvalidValue(
                "codename.max_attempts".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            errors.push(ConfigError::InvalidValue(
                "logging.level".to_string(),
                "must not be empty".to_string(),
            ));
        }

        errors
    }

    /// Validate and return Ok(()) if valid, or Err with the first error.
    pub fn validate_or_err(&self) -> Result<(), ConfigError> {
        match self.validate().into_iter().next() {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Secret;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DossierConfig::default().validate().is_empty());
    }

    #[test]
    fn test_empty_database_path() {
        let mut config = DossierConfig::default();
        config.database.path = "  ".to_string();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("database.path"));
    }

    #[test]
    fn test_empty_database_path_ok_in_memory() {
        let mut config = DossierConfig::default();
        config.database.path = String::new();
        config.database.in_memory = true;
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = DossierConfig::default();
        config.codename.max_attempts = 0;
        let err = config.validate_or_err().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(field, _) if field == "codename.max_attempts"));
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let mut config = DossierConfig::default();
        config.server.api_key = Some(Secret::new(" "));
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = DossierConfig::default();
        config.server.host = String::new();
        config.codename.max_attempts = 0;
        config.logging.level = String::new();
        assert_eq!(config.validate().len(), 3);
    }
}
