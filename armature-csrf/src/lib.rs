//! # Armature CSRF Protection
//!
//! Cross-Site Request Forgery (CSRF) protection for Armature applications,
//! using the synchronizer token pattern.
//!
//! ## Features
//!
//! - ✅ **Per-client tokens** - Random hex tokens kept in an HttpOnly cookie
//! - ✅ **Fail-closed methods** - Only `GET` and `HEAD` skip verification
//! - ✅ **Header or form field** - `X-CSRF-Token` header, then `_csrfToken` field
//! - ✅ **Timing-safe comparison** - Fixed-size digests compared in constant time
//! - ✅ **Handler access** - Token exposed as the `_csrfToken` request attribute
//! - ✅ **Path Exclusion** - Exclude specific paths from protection
//!
//! ## Quick Start
//!
//! ```rust
//! use armature_csrf::{CsrfConfig, CsrfMiddleware, SameSite};
//!
//! let config = CsrfConfig::default()
//!     .with_cookie_secure(true)
//!     .with_same_site(Some(SameSite::Strict));
//!
//! let csrf = CsrfMiddleware::new(config).unwrap();
//! ```
//!
//! ## Protecting a request
//!
//! ```rust
//! use armature_csrf::{CsrfConfig, CsrfError, CsrfMiddleware, HttpRequest, HttpResponse};
//!
//! let csrf = CsrfMiddleware::new(CsrfConfig::default()).unwrap();
//!
//! // A first GET mints a token and sets the cookie
//! let request = HttpRequest::new("GET".to_string(), "/form".to_string());
//! let response = csrf
//!     .protect(request, |req| {
//!         let token = req.param("_csrfToken").cloned().unwrap_or_default();
//!         Ok(HttpResponse::ok().with_body(token.into_bytes()))
//!     })
//!     .unwrap();
//! let cookie = response.cookie("csrfToken").unwrap();
//! assert_eq!(cookie.value.as_bytes(), response.body.as_slice());
//!
//! // The POST must echo the token back
//! let request = HttpRequest::new("POST".to_string(), "/form".to_string())
//!     .with_cookie("csrfToken", &cookie.value)
//!     .with_header("X-CSRF-Token", "forged");
//! let err = csrf.protect(request, |_| Ok(HttpResponse::ok())).unwrap_err();
//! assert_eq!(err.as_csrf(), Some(&CsrfError::TokenMismatch));
//! assert_eq!(err.status_code(), 403);
//! ```
//!
//! ## Usage with an async pipeline
//!
//! ```rust
//! use armature_csrf::{CsrfConfig, CsrfMiddleware, HttpRequest, HttpResponse, Middleware, next};
//!
//! # tokio_test::block_on(async {
//! let csrf = CsrfMiddleware::new(CsrfConfig::default()).unwrap();
//! let request = HttpRequest::new("GET".to_string(), "/".to_string());
//!
//! let response = csrf
//!     .handle(request, next(|_req| async { Ok(HttpResponse::ok()) }))
//!     .await
//!     .unwrap();
//! assert_eq!(response.set_cookie_headers().len(), 1);
//! # });
//! ```

pub mod classify;
pub mod compare;
pub mod config;
pub mod cookies;
pub mod error;
pub mod extract;
pub mod http;
pub mod middleware;
pub mod pipeline;
pub mod token;

pub use classify::{MethodClass, classify};
pub use compare::tokens_equal;
pub use config::{CsrfConfig, SameSite};
pub use cookies::TokenCookie;
pub use error::{CsrfError, Error, Result};
pub use extract::{TokenExtractor, TokenSource};
pub use self::http::{HttpRequest, HttpResponse};
pub use middleware::{CsrfMiddleware, Decision, Rejection};
pub use pipeline::{HandlerFuture, Middleware, Next, next};
pub use token::{CsrfToken, RandomTokenProvider, TokenProvider};
