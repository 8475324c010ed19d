//! Field validators shared by the entities.

use crate::errors::ModelError;

pub const MAX_CODE_LEN: usize = 32;
pub const MAX_NAME_LEN: usize = 255;
/// Cap for `text` columns, which have no width of their own.
pub const MAX_TEXT_LEN: usize = 4000;

/// Trim and uppercase a code; allowed characters are `A-Z`, `0-9`, `.` and `-`.
pub fn normalize_code(code: &str) -> Result<String, ModelError> {
    let c = code.trim().to_ascii_uppercase();
    if c.is_empty() {
        return Err(ModelError::validation("code required"));
    }
    if c.len() > MAX_CODE_LEN {
        return Err(ModelError::validation(format!("code longer than {MAX_CODE_LEN} characters")));
    }
    if !c.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '.' || ch == '-') {
        return Err(ModelError::validation("code may only contain letters, digits, '.' and '-'"));
    }
    Ok(c)
}

pub fn validate_name(name: &str) -> Result<String, ModelError> {
    required_text("name", name, MAX_NAME_LEN)
}

fn within(field: &str, value: &str, max_len: usize) -> Result<(), ModelError> {
    if value.chars().count() > max_len {
        return Err(ModelError::validation(format!("{field} longer than {max_len} characters")));
    }
    Ok(())
}

/// Required trimmed text no longer than `max_len` characters.
pub fn required_text(field: &str, value: &str, max_len: usize) -> Result<String, ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ModelError::validation(format!("{field} required")));
    }
    within(field, v, max_len)?;
    Ok(v.to_string())
}

/// Blank optional strings collapse to `None`.
pub fn optional_text(field: &str, value: Option<&str>, max_len: usize) -> Result<Option<String>, ModelError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => {
            within(field, v, max_len)?;
            Ok(Some(v.to_string()))
        }
    }
}

pub fn validate_email(email: Option<&str>) -> Result<Option<String>, ModelError> {
    match optional_text("email", email, 255)? {
        None => Ok(None),
        Some(e) => {
            let valid = match e.split_once('@') {
                Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
                None => false,
            };
            if !valid {
                return Err(ModelError::validation("invalid email"));
            }
            Ok(Some(e.to_ascii_lowercase()))
        }
    }
}

pub fn non_negative(field: &str, value: f64) -> Result<f64, ModelError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::validation(format!("{field} must be >= 0")));
    }
    Ok(value)
}

pub fn positive(field: &str, value: f64) -> Result<f64, ModelError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ModelError::validation(format!("{field} must be > 0")));
    }
    Ok(value)
}
