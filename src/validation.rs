use bs58;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid SS58 address format: {0}")]
    InvalidHotkey(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Checks the shape of an SS58 address: base58, with a one or two byte
/// network prefix, a 32 byte account id and a 2 byte checksum.
pub fn validate_hotkey(hotkey: &str) -> Result<(), ValidationError> {
    // Check if hotkey is empty
    if hotkey.trim().is_empty() {
        return Err(ValidationError::MissingParameter("hotkey".to_string()));
    }

    let decoded = match bs58::decode(hotkey).into_vec() {
        Ok(bytes) => bytes,
        Err(_) => return Err(ValidationError::InvalidHotkey(hotkey.to_string())),
    };

    let prefix_len = match decoded.first() {
        Some(b) if *b < 64 => 1,
        Some(b) if *b < 128 => 2,
        _ => return Err(ValidationError::InvalidHotkey(hotkey.to_string())),
    };

    if decoded.len() != prefix_len + 32 + 2 {
        return Err(ValidationError::InvalidHotkey(hotkey.to_string()));
    }

    Ok(())
}

pub fn validate_registration(email: &str, username: &str, password: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingParameter("email".to_string()));
    }
    if username.trim().is_empty() {
        return Err(ValidationError::MissingParameter("username".to_string()));
    }
    if password.is_empty() {
        return Err(ValidationError::MissingParameter("password".to_string()));
    }

    // local@domain.tld, nothing fancier
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid_email || email.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidParameter(format!("invalid email address: {}", email)));
    }

    Ok(())
}
