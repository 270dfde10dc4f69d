// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via environment variable or TTY prompt.

use std::io::IsTerminal;

use hostvault_core::HostvaultError;
use secrecy::{ExposeSecret, SecretString};

/// Environment variable holding the current master password.
pub const PASSWORD_ENV_VAR: &str = "HOSTVAULT_MASTER_PASSWORD";

/// Environment variable holding the replacement password for `passwd`.
pub const NEW_PASSWORD_ENV_VAR: &str = "HOSTVAULT_NEW_MASTER_PASSWORD";

/// Get the current master password.
///
/// Priority:
/// 1. `HOSTVAULT_MASTER_PASSWORD` (for scripts)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_master_password() -> Result<SecretString, HostvaultError> {
    if let Some(password) = from_env(PASSWORD_ENV_VAR) {
        return Ok(password);
    }
    if std::io::stdin().is_terminal() {
        return read_tty("Master password: ");
    }
    Err(no_password(PASSWORD_ENV_VAR))
}

/// Get a password for a new vault. Prompts twice on a TTY.
pub fn get_initial_password() -> Result<SecretString, HostvaultError> {
    choose_new(PASSWORD_ENV_VAR, "New master password: ")
}

/// Get the replacement password when rotating. Prompts twice on a TTY.
pub fn get_new_password() -> Result<SecretString, HostvaultError> {
    choose_new(NEW_PASSWORD_ENV_VAR, "New master password: ")
}

fn choose_new(env_var: &str, label: &str) -> Result<SecretString, HostvaultError> {
    // No confirmation for env vars.
    if let Some(password) = from_env(env_var) {
        return Ok(password);
    }
    if std::io::stdin().is_terminal() {
        let first = read_tty(label)?;
        let second = read_tty("Confirm master password: ")?;
        if first.expose_secret() != second.expose_secret() {
            return Err(HostvaultError::Vault("passwords do not match".to_string()));
        }
        return Ok(first);
    }
    Err(no_password(env_var))
}

fn from_env(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

fn read_tty(label: &str) -> Result<SecretString, HostvaultError> {
    let password = rpassword::prompt_password(label)
        .map_err(|e| HostvaultError::Vault(format!("failed to read password: {e}")))?;
    if password.is_empty() {
        return Err(HostvaultError::Vault("empty password not allowed".to_string()));
    }
    Ok(SecretString::from(password))
}

fn no_password(env_var: &str) -> HostvaultError {
    HostvaultError::Vault(format!(
        "no master password provided; set {env_var} or run interactively"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // SAFETY (all tests): env mutation is serialized by #[serial].

    #[test]
    #[serial]
    fn reads_password_from_env() {
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "Secret1!") };
        let result = get_master_password();
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "Secret1!");
    }

    #[test]
    #[serial]
    fn initial_password_from_env_skips_confirmation() {
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "Secret1!") };
        let result = get_initial_password();
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "Secret1!");
    }

    #[test]
    #[serial]
    fn new_password_uses_its_own_variable() {
        unsafe {
            std::env::set_var(PASSWORD_ENV_VAR, "old");
            std::env::set_var(NEW_PASSWORD_ENV_VAR, "new");
        }
        let current = get_master_password();
        let replacement = get_new_password();
        unsafe {
            std::env::remove_var(PASSWORD_ENV_VAR);
            std::env::remove_var(NEW_PASSWORD_ENV_VAR);
        }

        assert_eq!(current.unwrap().expose_secret(), "old");
        assert_eq!(replacement.unwrap().expose_secret(), "new");
    }

    #[test]
    #[serial]
    fn empty_env_var_is_ignored() {
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "") };
        let value = from_env(PASSWORD_ENV_VAR);
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        assert!(value.is_none());
    }
}
