//! Environment variable helpers

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration from the environment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// A required variable is not set (or is empty)
    #[error("{0} environment variable not set")]
    Missing(String),

    /// A variable is set but cannot be parsed
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// Read a variable, treating unset and empty the same way
pub fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse a variable, falling back to `default` when unset
pub fn env_or<T>(name: &str, default: T) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: Display,
{
    match optional_env(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| EnvError::Invalid {
            name: name.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_counts_as_missing() {
        // SAFETY: test-local variable name, not read by other tests
        unsafe {
            std::env::set_var("HIVE_UTILS_TEST_EMPTY", "   ");
        }
        assert_eq!(optional_env("HIVE_UTILS_TEST_EMPTY"), None);
    }

    #[test]
    fn test_env_or_parses_and_defaults() {
        // SAFETY: test-local variable names, not read by other tests
        unsafe {
            std::env::set_var("HIVE_UTILS_TEST_PORT", "8080");
            std::env::set_var("HIVE_UTILS_TEST_BAD_PORT", "eighty");
            std::env::remove_var("HIVE_UTILS_TEST_UNSET_PORT");
        }
        assert_eq!(env_or("HIVE_UTILS_TEST_PORT", 5000_u16), Ok(8080));
        assert_eq!(env_or("HIVE_UTILS_TEST_UNSET_PORT", 5000_u16), Ok(5000));
        assert!(matches!(
            env_or("HIVE_UTILS_TEST_BAD_PORT", 5000_u16),
            Err(EnvError::Invalid { .. })
        ));
    }
}
