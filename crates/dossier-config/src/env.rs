use regex::Regex;
use std::env;

use crate::ConfigError;

/// Interpolate environment variables in a string.
///
/// `${VAR_NAME}` is replaced with the variable's value and is an error when
/// unset. `${VAR_NAME:-fallback}` uses `fallback` when the variable is unset.
pub fn interpolate_env(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;

    let mut result = String::with_capacity(input.len());
    let mut missing: Vec<String> = Vec::new();
    let mut last = 0;

    for cap in re.captures_iter(input) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        result.push_str(&input[last..whole.start()]);

        match (env::var(name.as_str()), cap.get(2)) {
            (Ok(value), _) => result.push_str(&value),
            (Err(_), Some(fallback)) => result.push_str(fallback.as_str()),
            (Err(_), None) => {
                if !missing.iter().any(|m| m == name.as_str()) {
                    missing.push(name.as_str().to_string());
                }
            }
        }
        last = whole.end();
    }
    result.push_str(&input[last..]);

    if !missing.is_empty() {
        return Err(ConfigError::MissingEnvVars(missing));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_env() {
        env::set_var("DOSSIER_TEST_HOST", "0.0.0.0");
        env::set_var("DOSSIER_TEST_PORT", "8080");

        let input = "host: ${DOSSIER_TEST_HOST}\nport: ${DOSSIER_TEST_PORT}";
        let result = interpolate_env(input).unwrap();
        assert_eq!(result, "host: 0.0.0.0\nport: 8080");
    }

    #[test]
    fn test_interpolate_env_missing() {
        let result = interpolate_env("path: ${DOSSIER_MISSING_12345}");
        match result {
            Err(ConfigError::MissingEnvVars(vars)) => {
                assert_eq!(vars, vec!["DOSSIER_MISSING_12345"]);
            }
            other => panic!("Expected MissingEnvVars error, got {:?}", other),
        }
    }

    #[test]
    fn test_interpolate_env_missing_reported_once() {
        let input = "${DOSSIER_GONE_1} ${DOSSIER_GONE_1} ${DOSSIER_GONE_2}";
        match interpolate_env(input) {
            Err(ConfigError::MissingEnvVars(vars)) => {
                assert_eq!(vars, vec!["DOSSIER_GONE_1", "DOSSIER_GONE_2"]);
            }
            other => panic!("Expected MissingEnvVars error, got {:?}", other),
        }
    }

    #[test]
    fn test_interpolate_env_fallback() {
        let input = "path: ${DOSSIER_UNSET_DB_PATH:-/var/lib/dossier.db}";
        let result = interpolate_env(input).unwrap();
        assert_eq!(result, "path: /var/lib/dossier.db");
    }

    #[test]
    fn test_interpolate_env_set_var_beats_fallback() {
        env::set_var("DOSSIER_TEST_LEVEL", "debug");
        let result = interpolate_env("level: ${DOSSIER_TEST_LEVEL:-info}").unwrap();
        assert_eq!(result, "level: debug");
    }

    #[test]
    fn test_interpolate_env_empty_fallback() {
        let result = interpolate_env("[${DOSSIER_UNSET_EMPTY:-}]").unwrap();
        assert_eq!(result, "[]");
    }

    #[test]
    fn test_interpolate_env_no_vars() {
        let input = "no variables here";
        assert_eq!(interpolate_env(input).unwrap(), input);
    }

    #[test]
    fn test_interpolate_env_adjacent_vars() {
        env::set_var("DOSSIER_VAR_A", "shadow");
        env::set_var("DOSSIER_VAR_B", "fox");
        let result = interpolate_env("${DOSSIER_VAR_A}${DOSSIER_VAR_B}").unwrap();
        assert_eq!(result, "shadowfox");
    }

    #[test]
    fn test_interpolate_env_partial_syntax_not_matched() {
        let input = "not a $VAR variable, not a ${VAR either";
        assert_eq!(interpolate_env(input).unwrap(), input);
    }

    #[test]
    fn test_interpolate_env_special_chars_in_value() {
        env::set_var("DOSSIER_SPECIAL_VAR", "value with $pecial ch@rs!");
        let result = interpolate_env("${DOSSIER_SPECIAL_VAR}").unwrap();
        assert_eq!(result, "value with $pecial ch@rs!");
    }
}
