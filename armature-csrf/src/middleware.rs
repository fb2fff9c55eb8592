use crate::classify::{MethodClass, classify};
use crate::compare::tokens_equal;
use crate::config::CsrfConfig;
use crate::cookies::TokenCookie;
use crate::error::{CsrfError, Error, Result};
use crate::extract::TokenExtractor;
use crate::http::{HttpRequest, HttpResponse};
use crate::pipeline::{Middleware, Next};
use crate::token::{CsrfToken, RandomTokenProvider, TokenProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Why an unsafe request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingToken,
    TokenMismatch,
}

impl From<Rejection> for CsrfError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::MissingToken => CsrfError::MissingToken,
            Rejection::TokenMismatch => CsrfError::TokenMismatch,
        }
    }
}

/// Outcome of verifying a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the request through. `token` is the token in effect; `issued` is
    /// set when it was freshly minted because the client had none.
    Pass { token: CsrfToken, issued: bool },
    Reject(Rejection),
}

impl Decision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Decision::Pass { .. })
    }

    pub fn token(&self) -> Option<&CsrfToken> {
        match self {
            Decision::Pass { token, .. } => Some(token),
            Decision::Reject(_) => None,
        }
    }
}

/// CSRF protection middleware
///
/// Holds only its configuration and token provider, so one instance can be
/// shared by every concurrently handled request.
#[derive(Clone)]
pub struct CsrfMiddleware {
    config: Arc<CsrfConfig>,
    extractor: TokenExtractor,
    provider: Arc<dyn TokenProvider>,
}

impl CsrfMiddleware {
    /// Create new CSRF middleware backed by the OS random source
    pub fn new(config: CsrfConfig) -> Result<Self> {
        let provider = RandomTokenProvider::new(config.token_length)?;
        Self::with_provider(config, Arc::new(provider))
    }

    /// Create with a custom token provider
    pub fn with_provider(config: CsrfConfig, provider: Arc<dyn TokenProvider>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor: TokenExtractor::from_config(&config),
            config: Arc::new(config),
            provider,
        })
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    /// Classify the request, treating excluded paths as safe.
    pub fn classify_request(&self, request: &HttpRequest) -> MethodClass {
        if self.config.is_excluded(&request.path) {
            MethodClass::Safe
        } else {
            classify(&request.method)
        }
    }

    /// The token the client already holds, or a freshly minted one.
    ///
    /// The flag is `true` when the token was minted.
    pub fn reference_token(&self, request: &HttpRequest) -> Result<(CsrfToken, bool)> {
        match request
            .cookie(&self.config.cookie_name)
            .filter(|value| !value.is_empty())
        {
            Some(value) => Ok((CsrfToken::new(value), false)),
            None => Ok((self.provider.generate()?, true)),
        }
    }

    /// Decide whether the request may proceed.
    ///
    /// Only a failing entropy source produces an `Err`; verification
    /// failures are reported as [`Decision::Reject`].
    pub fn decide(&self, request: &HttpRequest) -> Result<Decision> {
        let (reference, issued) = self.reference_token(request)?;

        if self.classify_request(request).is_safe() {
            return Ok(Decision::Pass {
                token: reference,
                issued,
            });
        }

        let Some(asserted) = self.extractor.extract(request) else {
            return Ok(Decision::Reject(Rejection::MissingToken));
        };

        if tokens_equal(Some(&asserted), Some(&reference)) {
            Ok(Decision::Pass {
                token: reference,
                issued,
            })
        } else {
            Ok(Decision::Reject(Rejection::TokenMismatch))
        }
    }

    /// Verify the request and prepare it for the downstream handler.
    ///
    /// Returns the cookie to attach to the response, if one is due.
    fn admit(&self, request: &mut HttpRequest) -> Result<Option<TokenCookie>> {
        let (token, issued) = match self.decide(request)? {
            Decision::Pass { token, issued } => (token, issued),
            Decision::Reject(rejection) => {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    reason = ?rejection,
                    "CSRF verification failed"
                );
                return Err(rejection.into());
            }
        };

        if issued {
            debug!(path = %request.path, "Issued new CSRF token");
        }

        if self.config.strip_token_field && self.classify_request(request) == MethodClass::Unsafe {
            request.data.remove(&self.config.field_name);
        }

        let cookie = (issued || self.config.refresh_cookie)
            .then(|| TokenCookie::for_request(&self.config, request, &token));

        request
            .params
            .insert(self.config.field_name.clone(), token.into_inner());

        Ok(cookie)
    }

    /// Run the request through CSRF protection and a synchronous handler.
    ///
    /// On rejection the handler is never called.
    pub fn protect<F>(
        &self,
        mut request: HttpRequest,
        next: F,
    ) -> std::result::Result<HttpResponse, Error>
    where
        F: FnOnce(HttpRequest) -> std::result::Result<HttpResponse, Error>,
    {
        let cookie = self.admit(&mut request)?;
        let mut response = next(request)?;
        if let Some(cookie) = cookie {
            response.set_cookie(cookie);
        }
        Ok(response)
    }
}

#[async_trait]
impl Middleware for CsrfMiddleware {
    async fn handle(
        &self,
        mut req: HttpRequest,
        next: Next,
    ) -> std::result::Result<HttpResponse, Error> {
        let cookie = self.admit(&mut req)?;
        let mut response = next(req).await?;
        if let Some(cookie) = cookie {
            response.set_cookie(cookie);
        }
        Ok(response)
    }
}
