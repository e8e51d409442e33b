//! Read-only session context
//!
//! The credential is supplied by whoever owns login and token refresh; the
//! analytics engine only checks that one is present and forwards it.

use std::fmt;

/// Credentials handed to a remote source at construction time
#[derive(Clone, Default)]
pub struct SessionHandle {
    token: Option<String>,
}

impl SessionHandle {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.trim().is_empty()).then_some(token),
        }
    }

    /// A session without credentials; remote calls fail fast
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Read `SPENDLENS_TOKEN`
    pub fn from_env() -> Self {
        std::env::var("SPENDLENS_TOKEN")
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn credential(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_anonymous() {
        assert!(!SessionHandle::new("  ").is_authenticated());
        assert!(!SessionHandle::anonymous().is_authenticated());
        assert_eq!(SessionHandle::new("abc").credential(), Some("abc"));
    }

    #[test]
    fn test_debug_hides_token() {
        let debug = format!("{:?}", SessionHandle::new("secret-token"));
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("authenticated: true"));
    }
}
