//! `app.json` parsing with environment variable substitution.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::types::AppConfig;

/// File name looked up in the app directory.
pub const APP_CONFIG_FILE: &str = "app.json";

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid env var regex"));

/// Substitute `${VAR_NAME}` patterns with environment variable values.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set.
pub fn substitute_env_vars(input: &str) -> Result<String> {
    let mut missing = Vec::new();
    let result = ENV_VAR_RE.replace_all(input, |cap: &regex::Captures<'_>| {
        let var_name = &cap[1];
        std::env::var(var_name).unwrap_or_else(|_| {
            if !missing.iter().any(|m| m == var_name) {
                missing.push(var_name.to_string());
            }
            String::new()
        })
    });

    if !missing.is_empty() {
        anyhow::bail!("Missing environment variable(s): {}", missing.join(", "));
    }

    Ok(result.into_owned())
}

/// Parse an `app.json` document (after env var substitution).
///
/// # Errors
///
/// Returns an error if substitution fails, the JSON is invalid, or the
/// config does not validate.
pub fn parse_app_config_str(json: &str, name_override: Option<&str>) -> Result<AppConfig> {
    let substituted = substitute_env_vars(json)?;
    let config: AppConfig =
        serde_json::from_str(&substituted).context("Failed to parse app.json")?;
    Ok(config.finalize(name_override)?)
}

/// Load `app.json` from `app_dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_app_config(app_dir: &Path, name_override: Option<&str>) -> Result<AppConfig> {
    let path = app_dir.join(APP_CONFIG_FILE);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read app config: {}", path.display()))?;
    parse_app_config_str(&content, name_override)
        .with_context(|| format!("Invalid app config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TURBINE_TEST_FIXTURE", "fixtures/pg.json");
        let input = r#"{"resources": {"pg": "${TURBINE_TEST_FIXTURE}"}}"#;
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("fixtures/pg.json"));
        assert!(!result.contains("${TURBINE_TEST_FIXTURE}"));
        std::env::remove_var("TURBINE_TEST_FIXTURE");
    }

    #[test]
    fn test_repeated_var_substituted_everywhere() {
        std::env::set_var("TURBINE_TEST_ENV", "staging");
        let result = substitute_env_vars("${TURBINE_TEST_ENV}/${TURBINE_TEST_ENV}").unwrap();
        assert_eq!(result, "staging/staging");
        std::env::remove_var("TURBINE_TEST_ENV");
    }

    #[test]
    fn test_no_env_vars_passthrough() {
        let input = r#"{"name": "demo"}"#;
        assert_eq!(substitute_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_multiple_missing_env_vars_all_reported() {
        let result = substitute_env_vars("${TURBINE_MISSING_X} and ${TURBINE_MISSING_Y}");
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("TURBINE_MISSING_X"));
        assert!(err_msg.contains("TURBINE_MISSING_Y"));
    }

    #[test]
    fn test_parse_app_config_from_string() {
        let json = r#"{
            "name": "anonymize",
            "language": "rust",
            "environment": "common",
            "resources": {"source_name": "fixtures/demo-cdc.json"}
        }"#;
        let config = parse_app_config_str(json, None).unwrap();
        assert_eq!(config.name, "anonymize");
        assert_eq!(config.environment.as_deref(), Some("common"));
        assert_eq!(config.pipeline, "turbine-pipeline-anonymize");
        assert_eq!(config.resources["source_name"], "fixtures/demo-cdc.json");
    }

    #[test]
    fn test_parse_missing_name_errors() {
        let err = parse_app_config_str(r#"{"resources": {}}"#, None).unwrap_err();
        assert!(format!("{err:#}").contains("application name is required"));
    }

    #[test]
    fn test_parse_invalid_json_errors() {
        assert!(parse_app_config_str("{not json", None).is_err());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(APP_CONFIG_FILE), r#"{"name": "demo"}"#).unwrap();
        let config = load_app_config(dir.path(), Some("renamed")).unwrap();
        assert_eq!(config.name, "renamed");
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_app_config(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read app config"));
    }
}
