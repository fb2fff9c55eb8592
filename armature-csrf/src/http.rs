// HTTP request and response types seen by the middleware

use crate::cookies::TokenCookie;
use cookie::Cookie;
use http::header::COOKIE;
use std::collections::HashMap;

/// HTTP request wrapper
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    /// Path the application is mounted under (the webroot).
    pub base_path: String,
    /// Whether the request arrived over TLS.
    pub secure: bool,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Parsed body fields.
    pub data: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    /// Request-scoped attributes handed to downstream handlers.
    pub params: HashMap<String, String>,
}

impl HttpRequest {
    pub fn new(method: String, path: String) -> Self {
        Self {
            method,
            path,
            base_path: "/".to_string(),
            secure: false,
            headers: HashMap::new(),
            body: Vec::new(),
            data: HashMap::new(),
            query_params: HashMap::new(),
            params: HashMap::new(),
        }
    }

    /// Set a header. Names are stored lowercased, so a later header that
    /// differs only in case replaces the earlier one.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Append a cookie to the `Cookie` header.
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        let pair = format!("{}={}", name, value);
        self.headers
            .entry(COOKIE.as_str().to_string())
            .and_modify(|header| {
                header.push_str("; ");
                header.push_str(&pair);
            })
            .or_insert_with(|| pair.clone());
        self
    }

    /// Set the raw body and parse its fields into `data`.
    ///
    /// JSON objects contribute their string members and other JSON values
    /// contribute nothing. Anything that is not JSON is tried as a
    /// url-encoded form. Unparseable bodies leave `data` untouched.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.data.extend(parse_body_fields(&body));
        self.body = body;
        self
    }

    /// Look up a header, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// All cookies presented by the client.
    pub fn cookies(&self) -> HashMap<String, String> {
        self.header(COOKIE.as_str())
            .map(|raw| {
                Cookie::split_parse(raw)
                    .filter_map(|c| c.ok())
                    .map(|c| (c.name().to_string(), c.value().to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.header(COOKIE.as_str()).and_then(|raw| {
            Cookie::split_parse(raw)
                .filter_map(|c| c.ok())
                .find(|c| c.name() == name)
                .map(|c| c.value().to_string())
        })
    }

    /// Get a parsed body field by name
    pub fn field(&self, name: &str) -> Option<&String> {
        self.data.get(name)
    }

    /// Get a request attribute by name
    pub fn param(&self, name: &str) -> Option<&String> {
        self.params.get(name)
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }
}

fn parse_body_fields(body: &[u8]) -> Vec<(String, String)> {
    if body.is_empty() {
        return Vec::new();
    }

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        let serde_json::Value::Object(map) = value else {
            return Vec::new();
        };
        return map
            .into_iter()
            .filter_map(|(k, v)| match v {
                serde_json::Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect();
    }

    serde_urlencoded::from_bytes::<Vec<(String, String)>>(body).unwrap_or_default()
}

/// HTTP response wrapper
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub cookies: Vec<TokenCookie>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
            cookies: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Queue a cookie, replacing any earlier one with the same name.
    pub fn set_cookie(&mut self, cookie: TokenCookie) {
        self.cookies.retain(|c| c.name != cookie.name);
        self.cookies.push(cookie);
    }

    pub fn cookie(&self, name: &str) -> Option<&TokenCookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    /// Render queued cookies as `Set-Cookie` header values.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.cookies.iter().map(TokenCookie::to_header_value).collect()
    }
}
