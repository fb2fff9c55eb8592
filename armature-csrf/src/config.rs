use crate::error::{CsrfError, Result};
use crate::token::MIN_TOKEN_BYTES;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// CSRF protection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Cookie name for the CSRF token
    pub cookie_name: String,

    /// Header name carrying the asserted token
    pub header_name: String,

    /// Body field carrying the asserted token; also the request attribute key
    pub field_name: String,

    /// Cookie path; `None` scopes the cookie to the request base path
    pub cookie_path: Option<String>,

    /// Cookie secure flag; `None` mirrors the transport security
    pub cookie_secure: Option<bool>,

    /// Cookie SameSite policy
    pub same_site: Option<SameSite>,

    /// Random bytes per token
    pub token_length: usize,

    /// Cookie lifetime in seconds, 0 for a session cookie
    pub expiry: i64,

    /// Re-send the cookie on every passing request, not only on issuance
    pub refresh_cookie: bool,

    /// Remove the token field from body data once verified
    pub strip_token_field: bool,

    /// Path prefixes exempt from verification
    pub exclude_paths: Vec<String>,
}

/// Cookie SameSite attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SameSite {
    #[serde(alias = "strict")]
    Strict,
    #[serde(alias = "lax")]
    Lax,
    #[serde(alias = "none")]
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

}

impl FromStr for SameSite {
    type Err = CsrfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            _ => Err(CsrfError::InvalidConfig(format!(
                "unknown SameSite policy '{}'",
                s
            ))),
        }
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "csrfToken".to_string(),
            header_name: "X-CSRF-Token".to_string(),
            field_name: "_csrfToken".to_string(),
            cookie_path: None,
            cookie_secure: None,
            same_site: Some(SameSite::Lax),
            token_length: 32,
            expiry: 0,
            refresh_cookie: true,
            strip_token_field: true,
            exclude_paths: Vec::new(),
        }
    }
}

impl CsrfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `ARMATURE_CSRF_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// - `ARMATURE_CSRF_COOKIE_NAME`, `ARMATURE_CSRF_HEADER_NAME`, `ARMATURE_CSRF_FIELD_NAME`
    /// - `ARMATURE_CSRF_COOKIE_PATH`
    /// - `ARMATURE_CSRF_SECURE=1|0`
    /// - `ARMATURE_CSRF_SAME_SITE=strict|lax|none|off`
    /// - `ARMATURE_CSRF_TOKEN_LENGTH` (bytes), `ARMATURE_CSRF_EXPIRY` (seconds)
    /// - `ARMATURE_CSRF_REFRESH_COOKIE=1|0`, `ARMATURE_CSRF_STRIP_FIELD=1|0`
    /// - `ARMATURE_CSRF_EXCLUDE_PATHS` (comma separated)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`CsrfConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("ARMATURE_CSRF_COOKIE_NAME") {
            config.cookie_name = v;
        }
        if let Some(v) = lookup("ARMATURE_CSRF_HEADER_NAME") {
            config.header_name = v;
        }
        if let Some(v) = lookup("ARMATURE_CSRF_FIELD_NAME") {
            config.field_name = v;
        }
        if let Some(v) = lookup("ARMATURE_CSRF_COOKIE_PATH") {
            config.cookie_path = Some(v);
        }
        if let Some(v) = lookup("ARMATURE_CSRF_SECURE") {
            config.cookie_secure = Some(parse_flag("ARMATURE_CSRF_SECURE", &v)?);
        }
        if let Some(v) = lookup("ARMATURE_CSRF_SAME_SITE") {
            config.same_site = match v.to_lowercase().as_str() {
                "off" | "" => None,
                other => Some(other.parse().map_err(|_| {
                    CsrfError::InvalidConfig(format!(
                        "ARMATURE_CSRF_SAME_SITE: unknown policy '{}'",
                        v
                    ))
                })?),
            };
        }
        if let Some(v) = lookup("ARMATURE_CSRF_TOKEN_LENGTH") {
            config.token_length = v
                .trim()
                .parse()
                .map_err(|_| invalid_number("ARMATURE_CSRF_TOKEN_LENGTH", &v))?;
        }
        if let Some(v) = lookup("ARMATURE_CSRF_EXPIRY") {
            config.expiry = v
                .trim()
                .parse()
                .map_err(|_| invalid_number("ARMATURE_CSRF_EXPIRY", &v))?;
        }
        if let Some(v) = lookup("ARMATURE_CSRF_REFRESH_COOKIE") {
            config.refresh_cookie = parse_flag("ARMATURE_CSRF_REFRESH_COOKIE", &v)?;
        }
        if let Some(v) = lookup("ARMATURE_CSRF_STRIP_FIELD") {
            config.strip_token_field = parse_flag("ARMATURE_CSRF_STRIP_FIELD", &v)?;
        }
        if let Some(v) = lookup("ARMATURE_CSRF_EXCLUDE_PATHS") {
            config.exclude_paths = v
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that would weaken or break protection.
    pub fn validate(&self) -> Result<()> {
        if self.token_length < MIN_TOKEN_BYTES {
            return Err(CsrfError::InvalidConfig(format!(
                "token length must be at least {} bytes, got {}",
                MIN_TOKEN_BYTES, self.token_length
            )));
        }
        for (what, value) in [
            ("cookie name", &self.cookie_name),
            ("header name", &self.header_name),
            ("field name", &self.field_name),
        ] {
            if value.trim().is_empty() {
                return Err(CsrfError::InvalidConfig(format!("{} must not be empty", what)));
            }
        }
        if self.expiry < 0 {
            return Err(CsrfError::InvalidConfig(
                "expiry must not be negative".to_string(),
            ));
        }
        if self.same_site == Some(SameSite::None) && self.cookie_secure != Some(true) {
            return Err(CsrfError::InvalidConfig(
                "SameSite=None requires the secure flag".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `path` falls under one of the excluded prefixes.
    ///
    /// Prefixes match whole path segments: `/webhooks` covers `/webhooks`
    /// and `/webhooks/github` but not `/webhooks-admin`.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_paths
            .iter()
            .any(|excluded| segment_prefix(path, excluded))
    }

    /// Set cookie name
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set header name
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Set field name
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Set cookie path
    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = Some(path.into());
        self
    }

    /// Set cookie secure flag
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = Some(secure);
        self
    }

    /// Set cookie SameSite policy
    pub fn with_same_site(mut self, same_site: Option<SameSite>) -> Self {
        self.same_site = same_site;
        self
    }

    /// Set random bytes per token
    pub fn with_token_length(mut self, bytes: usize) -> Self {
        self.token_length = bytes;
        self
    }

    /// Set cookie lifetime in seconds
    pub fn with_expiry(mut self, seconds: i64) -> Self {
        self.expiry = seconds;
        self
    }

    pub fn with_refresh_cookie(mut self, refresh: bool) -> Self {
        self.refresh_cookie = refresh;
        self
    }

    pub fn with_strip_token_field(mut self, strip: bool) -> Self {
        self.strip_token_field = strip;
        self
    }

    /// Add excluded paths
    pub fn with_exclude_paths(mut self, paths: Vec<String>) -> Self {
        self.exclude_paths = paths;
        self
    }
}

fn segment_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || prefix.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

fn invalid_number(key: &str, value: &str) -> CsrfError {
    CsrfError::InvalidConfig(format!("{}: '{}' is not a number", key, value))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CsrfError::InvalidConfig(format!(
            "{}: '{}' is not a boolean",
            key, value
        ))),
    }
}
