// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::HostvaultConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &HostvaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log_level `{}` is not one of: {}",
                config.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let vault = &config.vault;

    if vault.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.data_dir must not be empty".to_string(),
        });
    }

    for (key, name) in [
        ("master_file", &vault.master_file),
        ("connections_file", &vault.connections_file),
    ] {
        if name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("vault.{key} must not be empty"),
            });
        } else if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
            errors.push(ConfigError::Validation {
                message: format!("vault.{key} must be a bare file name, got `{name}`"),
            });
        }
    }

    if vault.master_file == vault.connections_file {
        errors.push(ConfigError::Validation {
            message: "vault.master_file and vault.connections_file must differ".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&HostvaultConfig::default()).is_ok());
    }

    #[test]
    fn dot_file_names_fail_validation() {
        for name in [".", ".."] {
            let mut config = HostvaultConfig::default();
            config.vault.connections_file = name.to_string();
            let errors = validate_config(&config).unwrap_err();
            assert!(has_message(&errors, "bare file name"), "{name} accepted");
        }
    }

    #[test]
    fn same_file_names_fail_validation() {
        let mut config = HostvaultConfig::default();
        config.vault.connections_file = "master.json".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "must differ"));
    }

    #[test]
    fn path_in_file_name_fails_validation() {
        let mut config = HostvaultConfig::default();
        config.vault.master_file = "../master.json".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "bare file name"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = HostvaultConfig::default();
        config.log_level = "loud".to_string();
        config.vault.data_dir = " ".to_string();
        config.vault.master_file = "..".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
