use crate::error::{DomainError, DomainResult};

pub const MAX_FULL_NAME_LEN: usize = 64;

/// Trims `full_name` and checks it is 1 to `MAX_FULL_NAME_LEN` characters.
pub fn validate_full_name(full_name: &str) -> DomainResult<String> {
    let name = full_name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_FULL_NAME_LEN {
        return Err(DomainError::InvalidName { len, max: MAX_FULL_NAME_LEN });
    }
    Ok(name.to_string())
}
