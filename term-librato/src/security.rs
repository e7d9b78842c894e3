//! Credential handling.
//!
//! The API token is the only secret the client holds. It is kept in a
//! [`SecureString`] so that it never shows up in `Debug` output and is wiped
//! from memory when the configuration is dropped.

use zeroize::ZeroizeOnDrop;

/// A secure string that automatically clears its contents when dropped.
#[derive(Clone, Default, ZeroizeOnDrop)]
pub struct SecureString(String);

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(***)")
    }
}

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the string value. Use carefully and avoid storing the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if no secret is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Account credentials sent as HTTP basic auth with every request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    mail: String,
    token: SecureString,
}

impl Credentials {
    pub fn new(mail: impl Into<String>, token: impl Into<SecureString>) -> Self {
        Self {
            mail: mail.into(),
            token: token.into(),
        }
    }

    /// Account mail, used as the basic auth username.
    pub fn mail(&self) -> &str {
        &self.mail
    }

    /// API token, used as the basic auth password.
    pub fn token(&self) -> &SecureString {
        &self.token
    }

    /// Returns true when both mail and token are set.
    pub fn is_complete(&self) -> bool {
        !self.mail.is_empty() && !self.token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_string_debug_is_redacted() {
        let secret = SecureString::new("abcd1234");
        assert_eq!(format!("{secret:?}"), "SecureString(***)");
        assert_eq!(secret.expose(), "abcd1234");
    }

    #[test]
    fn test_credentials_debug_hides_token() {
        let creds = Credentials::new("mail@domain.com", "supersecret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("mail@domain.com"));
        assert!(!debug.contains("supersecret"));
    }

    #[test]
    fn test_credentials_completeness() {
        assert!(Credentials::new("mail@domain.com", "token").is_complete());
        assert!(!Credentials::new("", "token").is_complete());
        assert!(!Credentials::new("mail@domain.com", "").is_complete());
        assert!(!Credentials::default().is_complete());
    }
}
