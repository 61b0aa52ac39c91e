//! Authentication handling for the inventory API.
//!
//! The server uses token authentication (`Authorization: Token ...`).
//! Tokens are stored in the OS keyring, keyed by profile name. A token is
//! acquired once from the token endpoint using Basic credentials.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::error::{ApiError, Result};

/// The keyring service name for LazyStock tokens.
const KEYRING_SERVICE: &str = "lazystock";

/// Authentication credentials for the inventory server.
#[derive(Debug, Clone)]
pub struct Auth {
    /// The user's login name.
    username: String,
    /// The prebuilt authorization header value.
    auth_header: String,
}

impl Auth {
    /// Create token authentication for a user.
    ///
    /// The header is built immediately and the raw token is not retained.
    pub fn new(username: &str, token: &str) -> Self {
        Self {
            username: username.to_string(),
            auth_header: format!("Token {}", token),
        }
    }

    /// Create authentication from a profile using the OS keyring.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be retrieved from the keyring.
    pub fn from_keyring(profile_name: &str, username: &str) -> Result<Self> {
        let token = get_token(profile_name)?;
        Ok(Self::new(username, &token))
    }

    /// Get the authorization header value for HTTP requests.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    /// Get the login name.
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Build a Basic Auth header value from username and password.
///
/// Used only against the token endpoint to acquire an API token.
pub fn basic_header(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    format!("Basic {}", BASE64.encode(credentials.as_bytes()))
}

/// Store an API token in the OS keyring.
///
/// # Arguments
///
/// * `profile_name` - The profile the token belongs to
/// * `token` - The API token to store
pub fn store_token(profile_name: &str, token: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(e.to_string()))?;
    entry
        .set_password(token)
        .map_err(|e| ApiError::Keyring(e.to_string()))
}

/// Retrieve an API token from the OS keyring.
pub fn get_token(profile_name: &str) -> Result<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(e.to_string()))?;
    entry.get_password().map_err(|e| match e {
        keyring::Error::NoEntry => ApiError::Keyring(format!(
            "No token stored for profile '{}'. Run 'lazystock login' first.",
            profile_name
        )),
        other => ApiError::Keyring(other.to_string()),
    })
}

/// Delete an API token from the OS keyring.
///
/// Missing entries are not an error.
pub fn delete_token(profile_name: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(e.to_string()))?;
    match entry.delete_password() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(ApiError::Keyring(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_header_value() {
        let auth = Auth::new("alice", "abc123");
        assert_eq!(auth.header_value(), "Token abc123");
    }

    #[test]
    fn test_auth_username() {
        let auth = Auth::new("alice", "abc123");
        assert_eq!(auth.username(), "alice");
    }

    #[test]
    fn test_basic_header_encoding() {
        // base64("alice:secret")
        assert_eq!(basic_header("alice", "secret"), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_basic_header_empty_password() {
        // base64("alice:")
        assert_eq!(basic_header("alice", ""), "Basic YWxpY2U6");
    }
}
