use crate::utils::error::{DeployError, Result};
use regex::Regex;
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 驗證值符合指定的正規表達式（整串比對）
pub fn validate_pattern(field_name: &str, value: &str, pattern: &str, hint: &str) -> Result<()> {
    let re = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
        DeployError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("Invalid validation pattern: {}", e),
        }
    })?;

    if !re.is_match(value) {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: hint.to_string(),
        });
    }
    Ok(())
}

/// Python 模組名稱（app label）必須是合法識別字
pub fn validate_python_identifier(field_name: &str, value: &str) -> Result<()> {
    validate_pattern(
        field_name,
        value,
        r"[A-Za-z_][A-Za-z0-9_]*",
        "Must be a valid Python identifier",
    )
}

pub fn validate_max_length(field_name: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at most {} characters", max),
        });
    }
    Ok(())
}

pub fn validate_unique(field_name: &str, values: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(DeployError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.clone(),
                reason: "Duplicate entry".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("project.directory", "/srv/app").is_ok());
        assert!(validate_path("project.directory", "").is_err());
        assert!(validate_path("project.directory", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_python_identifier() {
        assert!(validate_python_identifier("apps.labels", "accounts").is_ok());
        assert!(validate_python_identifier("apps.labels", "_private2").is_ok());
        assert!(validate_python_identifier("apps.labels", "2fast").is_err());
        assert!(validate_python_identifier("apps.labels", "../etc").is_err());
        assert!(validate_python_identifier("apps.labels", "").is_err());
    }

    #[test]
    fn test_validate_unique() {
        let labels = vec!["accounts".to_string(), "catalog".to_string()];
        assert!(validate_unique("apps.labels", &labels).is_ok());

        let duplicated = vec!["catalog".to_string(), "catalog".to_string()];
        assert!(validate_unique("apps.labels", &duplicated).is_err());
    }

    #[test]
    fn test_validate_max_length() {
        assert!(validate_max_length("database.user", "peds_edu", 32).is_ok());
        assert!(validate_max_length("database.user", &"u".repeat(33), 32).is_err());
    }
}
