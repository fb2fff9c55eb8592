use crate::error::{CsrfError, Result};
use crate::http::HttpRequest;
use rand::{RngCore, rngs::OsRng};
use std::fmt;

/// Fewest random bytes a token may carry (128 bits).
pub const MIN_TOKEN_BYTES: usize = 16;

/// An opaque CSRF token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Wrap an existing token value, e.g. one read from a cookie.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Read the token exposed to handlers under the request attribute `key`.
    pub fn from_request(request: &HttpRequest, key: &str) -> Option<Self> {
        request
            .param(key)
            .filter(|v| !v.is_empty())
            .map(|v| Self::new(v.clone()))
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CsrfToken").field(&"***").finish()
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh, unguessable tokens.
///
/// Implementations are shared across concurrently handled requests and
/// must not fall back to a weaker generator when their source fails.
pub trait TokenProvider: Send + Sync {
    fn generate(&self) -> Result<CsrfToken>;
}

/// Token provider backed by the operating system CSPRNG.
///
/// Tokens are `byte_length` random bytes rendered as lowercase hex.
#[derive(Debug, Clone)]
pub struct RandomTokenProvider {
    byte_length: usize,
}

impl RandomTokenProvider {
    pub fn new(byte_length: usize) -> Result<Self> {
        if byte_length < MIN_TOKEN_BYTES {
            return Err(CsrfError::InvalidConfig(format!(
                "token length must be at least {} bytes, got {}",
                MIN_TOKEN_BYTES, byte_length
            )));
        }
        Ok(Self { byte_length })
    }

    pub fn byte_length(&self) -> usize {
        self.byte_length
    }
}

impl Default for RandomTokenProvider {
    fn default() -> Self {
        Self { byte_length: 32 }
    }
}

impl TokenProvider for RandomTokenProvider {
    fn generate(&self) -> Result<CsrfToken> {
        let mut bytes = vec![0u8; self.byte_length];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            tracing::error!(error = %e, "OS random source failed while minting CSRF token");
            CsrfError::EntropySourceUnavailable(e.to_string())
        })?;
        Ok(CsrfToken(hex::encode(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_generation() {
        let provider = RandomTokenProvider::default();
        let token = provider.generate().unwrap();
        assert_eq!(token.as_str().len(), 64);
        assert!(
            token
                .as_str()
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        );
    }

    #[test]
    fn test_custom_length() {
        let provider = RandomTokenProvider::new(16).unwrap();
        assert_eq!(provider.generate().unwrap().as_str().len(), 32);
    }

    #[test]
    fn test_short_length_rejected() {
        assert!(matches!(
            RandomTokenProvider::new(8),
            Err(CsrfError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let provider = RandomTokenProvider::default();
        let tokens: HashSet<String> = (0..256)
            .map(|_| provider.generate().unwrap().into_inner())
            .collect();
        assert_eq!(tokens.len(), 256);
    }

    #[test]
    fn test_concurrent_generation() {
        let provider = std::sync::Arc::new(RandomTokenProvider::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                std::thread::spawn(move || {
                    (0..32)
                        .map(|_| provider.generate().unwrap().into_inner())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for token in handle.join().unwrap() {
                assert!(seen.insert(token));
            }
        }
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = CsrfToken::new("testing123");
        assert_eq!(format!("{:?}", token), "CsrfToken(\"***\")");
        assert_eq!(token.to_string(), "testing123");
    }

    #[test]
    fn test_from_request_attribute() {
        let mut request = HttpRequest::new("GET".to_string(), "/".to_string());
        assert!(CsrfToken::from_request(&request, "_csrfToken").is_none());

        request
            .params
            .insert("_csrfToken".to_string(), "abc123".to_string());
        assert_eq!(
            CsrfToken::from_request(&request, "_csrfToken"),
            Some(CsrfToken::new("abc123"))
        );
    }
}
