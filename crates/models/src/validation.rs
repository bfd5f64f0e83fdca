//! Field limits for user-supplied catalogue data.

use crate::errors::ModelError;

pub const NAME_MAX_LEN: usize = 80;
pub const DESCRIPTION_MAX_LEN: usize = 300;

/// Names must have visible characters and at most [`NAME_MAX_LEN`] chars.
pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::invalid("name", "is required"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ModelError::invalid("name", format!("cannot exceed {NAME_MAX_LEN} characters")));
    }
    Ok(())
}

pub fn validate_description(description: Option<&str>) -> Result<(), ModelError> {
    match description {
        Some(d) if d.chars().count() > DESCRIPTION_MAX_LEN => {
            Err(ModelError::invalid("description", format!("cannot exceed {DESCRIPTION_MAX_LEN} characters")))
        }
        _ => Ok(()),
    }
}
