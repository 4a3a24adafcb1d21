//! Anti-forgery tokens for state-changing forms
//!
//! One token is generated per boot and embedded in every form that changes
//! settings. Requests other than GET must echo it back in the `csrf`
//! parameter.

use crate::http::Method;
use crate::ConnectorError;

pub const CSRF_TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Fresh random token of ASCII letters and digits
    #[cfg(feature = "csrf")]
    pub fn generate() -> Self {
        use rand::{distributions::Alphanumeric, Rng};

        let token = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CSRF_TOKEN_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Adopt an existing token, e.g. one persisted across a soft restart
    pub fn from_string(token: impl Into<String>) -> Result<Self, ConnectorError> {
        let token = token.into();
        if token.len() != CSRF_TOKEN_LEN || !token.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ConnectorError::ConfigError(format!(
                "CSRF token must be {CSRF_TOKEN_LEN} ASCII alphanumerics"
            )));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// GET is exempt; every other method needs a matching `candidate`
    pub fn verify(&self, method: Method, candidate: Option<&str>) -> bool {
        if method == Method::Get {
            return true;
        }

        candidate.is_some_and(|c| constant_time_eq(c.as_bytes(), self.0.as_bytes()))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "abcdefghijklmnopqrstuvwxyzABCDEF";

    #[cfg(feature = "csrf")]
    #[test]
    fn generated_tokens_are_alphanumeric() {
        let token = CsrfToken::generate();
        assert_eq!(token.as_str().len(), CSRF_TOKEN_LEN);
        assert!(token.as_str().bytes().all(|b| b.is_ascii_alphanumeric()));
        assert_ne!(token, CsrfToken::generate());
    }

    #[test]
    fn malformed_tokens_rejected() {
        assert!(CsrfToken::from_string("short").is_err());
        assert!(CsrfToken::from_string("abcdefghijklmnopqrstuvwxyzABCDE!").is_err());
        assert!(CsrfToken::from_string(TOKEN).is_ok());
    }

    #[test]
    fn get_is_exempt() {
        let token = CsrfToken::from_string(TOKEN).unwrap();
        assert!(token.verify(Method::Get, None));
        assert!(!token.verify(Method::Post, None));
        assert!(!token.verify(Method::Post, Some("wrong")));
        assert!(token.verify(Method::Post, Some(TOKEN)));
    }
}
