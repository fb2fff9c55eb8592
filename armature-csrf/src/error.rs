use thiserror::Error;

/// Failures raised by CSRF verification and token issuance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsrfError {
    #[error("Missing CSRF token")]
    MissingToken,

    #[error("CSRF token mismatch")]
    TokenMismatch,

    #[error("Secure random source unavailable: {0}")]
    EntropySourceUnavailable(String),

    #[error("Invalid CSRF configuration: {0}")]
    InvalidConfig(String),
}

impl CsrfError {
    /// HTTP status the transport layer should answer with.
    ///
    /// Rendering the response body is left to the surrounding framework.
    pub fn status_code(&self) -> u16 {
        match self {
            CsrfError::MissingToken | CsrfError::TokenMismatch => 403,
            CsrfError::EntropySourceUnavailable(_) | CsrfError::InvalidConfig(_) => 500,
        }
    }

    /// Whether this error is a verification rejection rather than a server fault.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CsrfError::MissingToken | CsrfError::TokenMismatch)
    }
}

pub type Result<T> = std::result::Result<T, CsrfError>;

/// Error type flowing through the middleware pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Csrf(#[from] CsrfError),

    #[error("Handler error: {0}")]
    Handler(String),
}

impl Error {
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Csrf(e) => e.status_code(),
            Error::Handler(_) => 500,
        }
    }

    /// Returns the CSRF failure, if this error came from the middleware.
    pub fn as_csrf(&self) -> Option<&CsrfError> {
        match self {
            Error::Csrf(e) => Some(e),
            Error::Handler(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_map_to_forbidden() {
        assert_eq!(CsrfError::MissingToken.status_code(), 403);
        assert_eq!(CsrfError::TokenMismatch.status_code(), 403);
        assert!(CsrfError::TokenMismatch.is_rejection());
    }

    #[test]
    fn test_entropy_failure_is_server_error() {
        let err = CsrfError::EntropySourceUnavailable("getrandom failed".to_string());
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_pipeline_error_wraps_csrf() {
        let err: Error = CsrfError::MissingToken.into();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.as_csrf(), Some(&CsrfError::MissingToken));
        assert_eq!(err.to_string(), "Missing CSRF token");

        let err = Error::Handler("boom".to_string());
        assert!(err.as_csrf().is_none());
    }
}
