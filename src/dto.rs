use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Plain confirmation body, e.g. after a delete.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Trims a required text input, rejecting blanks.
pub fn required(value: &str, what: &'static str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{what} is required"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Rejects text longer than the `VARCHAR(max)` column that stores it.
pub fn check_len(value: Option<&str>, max: usize, what: &str) -> AppResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(AppError::BadRequest(format!(
            "{what} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("  North ", "name").unwrap(), "North");
        assert_eq!(required("   ", "name").unwrap_err(), "name is required");
    }

    #[test]
    fn length_is_counted_in_characters() {
        assert!(check_len(Some("🌾🌾🌾"), 3, "Image").is_ok());
        assert!(check_len(None, 0, "Image").is_ok());
        let err = check_len(Some("abcd"), 3, "Image").unwrap_err();
        assert_eq!(err.to_string(), "Image must be at most 3 characters");
    }
}
