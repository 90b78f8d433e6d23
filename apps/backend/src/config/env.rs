use std::env;
use std::str::FromStr;

use crate::error::AppError;

/// Non-empty value of `name`, if set.
pub(super) fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `name` if set, falling back to `default` when absent. A value that
/// is present but unparsable is a configuration error.
pub(super) fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match optional_var(name) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|_| {
            AppError::config(format!(
                "Environment variable '{name}' has an invalid value: '{raw}'"
            ))
        }),
    }
}

/// Reject zero and anything past `max`.
pub(super) fn ensure_range(name: &str, value: u64, max: u64) -> Result<u64, AppError> {
    if value == 0 || value > max {
        return Err(AppError::config(format!(
            "Environment variable '{name}' must be between 1 and {max}, got {value}"
        )));
    }
    Ok(value)
}
