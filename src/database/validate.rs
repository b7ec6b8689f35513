use crate::app::AppError;

/// Fails with `DomainViolation` if `value` holds more than `max` characters.
pub fn max_length(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    let length = value.chars().count();
    if length > max {
        return Err(AppError::DomainViolation(format!(
            "{} is {} characters long, at most {} allowed",
            field, length, max
        )));
    }
    Ok(())
}

/// As [`max_length`], and the value may not be empty.
pub fn required(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::DomainViolation(format!("{} may not be empty", field)));
    }
    max_length(field, value, max)
}

/// Loose address check: one `@`, non-empty local part, dotted domain, no spaces.
pub fn email(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    required(field, value, max)?;

    let invalid = || AppError::DomainViolation(format!("{} is not an e-mail address", field));
    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let dotted = domain.split('.').count() > 1 && domain.split('.').all(|label| !label.is_empty());
    if !dotted {
        return Err(invalid());
    }
    Ok(())
}
