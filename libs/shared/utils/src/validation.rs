use std::sync::OnceLock;

use regex::Regex;

use shared_models::error::AppError;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("static email regex")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email.trim())
}

pub fn require_not_blank(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{} is required", field)));
    }
    Ok(())
}

pub fn require_email(email: &str) -> Result<(), AppError> {
    require_not_blank(email, "Email")?;
    if !is_valid_email(email) {
        return Err(AppError::ValidationError("Invalid email format".to_string()));
    }
    Ok(())
}

pub fn require_range(value: i32, min: i32, max: i32, field: &str) -> Result<(), AppError> {
    if value < min || value > max {
        return Err(AppError::ValidationError(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }
    Ok(())
}

/// Emails are stored lowercased so lookups are case-insensitive on every backend.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("vaidya@ayursutra.in"));
        assert!(!is_valid_email("vaidya"));
        assert!(!is_valid_email("vaidya@"));
        assert_matches!(require_email(" "), Err(AppError::ValidationError(_)));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(require_range(1, 1, 5, "Rating").is_ok());
        assert!(require_range(5, 1, 5, "Rating").is_ok());
        assert_matches!(
            require_range(6, 1, 5, "Rating"),
            Err(AppError::ValidationError(msg)) if msg == "Rating must be between 1 and 5"
        );
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Asha@Example.COM "), "asha@example.com");
    }
}
