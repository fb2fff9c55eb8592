use crate::config::{CsrfConfig, SameSite};
use crate::http::HttpRequest;
use crate::token::CsrfToken;
use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, Expiration, time::OffsetDateTime};

/// Cookie carrying the CSRF token back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCookie {
    pub name: String,
    pub value: String,
    /// `None` means a session cookie.
    pub expires: Option<DateTime<Utc>>,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
}

impl TokenCookie {
    /// A plain session cookie with the default protection flags.
    pub fn session(
        name: impl Into<String>,
        value: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: None,
            path: path.into(),
            http_only: true,
            secure: false,
            same_site: Some(SameSite::Lax),
        }
    }

    /// Build the token cookie for a request.
    ///
    /// The path falls back to the application base path and the secure flag
    /// to the transport security of the request. The cookie is always HttpOnly.
    pub fn for_request(config: &CsrfConfig, request: &HttpRequest, token: &CsrfToken) -> Self {
        let expires = (config.expiry > 0).then(|| Utc::now() + Duration::seconds(config.expiry));

        Self {
            name: config.cookie_name.clone(),
            value: token.as_str().to_string(),
            expires,
            path: config
                .cookie_path
                .clone()
                .unwrap_or_else(|| request.base_path.clone()),
            http_only: true,
            secure: config.cookie_secure.unwrap_or(request.secure),
            same_site: config.same_site,
        }
    }

    /// Expiry as unix seconds, `0` for a session cookie.
    pub fn expiry_timestamp(&self) -> i64 {
        self.expires.map(|t| t.timestamp()).unwrap_or(0)
    }

    pub fn is_session(&self) -> bool {
        self.expires.is_none()
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let expires = self
            .expires
            .and_then(|t| OffsetDateTime::from_unix_timestamp(t.timestamp()).ok())
            .map(Expiration::DateTime)
            .unwrap_or(Expiration::Session);

        let mut builder = Cookie::build((self.name.clone(), self.value.clone()))
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .expires(expires);

        if let Some(same_site) = self.same_site {
            builder = builder.same_site(same_site.into());
        }

        builder.build().to_string()
    }
}

impl From<SameSite> for cookie::SameSite {
    fn from(value: SameSite) -> Self {
        match value {
            SameSite::Strict => cookie::SameSite::Strict,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::None => cookie::SameSite::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        HttpRequest::new("GET".to_string(), "/dir/posts".to_string()).with_base_path("/dir/")
    }

    #[test]
    fn test_defaults_follow_request() {
        let config = CsrfConfig::default();
        let cookie = TokenCookie::for_request(&config, &request(), &CsrfToken::new("abc"));

        assert_eq!(cookie.name, "csrfToken");
        assert_eq!(cookie.value, "abc");
        assert_eq!(cookie.path, "/dir/");
        assert_eq!(cookie.expiry_timestamp(), 0);
        assert!(cookie.http_only);
        assert!(!cookie.secure);

        let secure = TokenCookie::for_request(
            &config,
            &request().with_secure(true),
            &CsrfToken::new("abc"),
        );
        assert!(secure.secure);
    }

    #[test]
    fn test_config_overrides() {
        let config = CsrfConfig::default()
            .with_cookie_path("/")
            .with_cookie_secure(true)
            .with_expiry(3600)
            .with_same_site(Some(SameSite::Strict));
        let cookie = TokenCookie::for_request(&config, &request(), &CsrfToken::new("abc"));

        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
        assert!(!cookie.is_session());
        assert!(cookie.expiry_timestamp() > Utc::now().timestamp());
        assert_eq!(cookie.same_site, Some(SameSite::Strict));
    }

    #[test]
    fn test_header_value() {
        let header = TokenCookie::session("csrfToken", "abc", "/dir/").to_header_value();

        assert!(header.starts_with("csrfToken=abc"));
        assert!(header.contains("Path=/dir/"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(!header.contains("Secure"));
        assert!(!header.contains("Expires"));
    }

    #[test]
    fn test_header_value_with_expiry() {
        let mut cookie = TokenCookie::session("csrfToken", "abc", "/");
        cookie.expires = Some(Utc::now() + Duration::hours(1));
        cookie.secure = true;
        let header = cookie.to_header_value();

        assert!(header.contains("Expires="));
        assert!(header.contains("Secure"));
    }
}
