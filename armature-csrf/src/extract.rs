use crate::config::CsrfConfig;
use crate::http::HttpRequest;
use crate::token::CsrfToken;

/// Place a client may put its asserted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Request header, matched case-insensitively
    Header(String),
    /// Parsed body field
    BodyField(String),
}

impl TokenSource {
    fn read<'a>(&self, request: &'a HttpRequest) -> Option<&'a str> {
        match self {
            TokenSource::Header(name) => request.header(name),
            TokenSource::BodyField(name) => request.field(name).map(String::as_str),
        }
    }
}

/// Pulls the caller-asserted token out of a request.
///
/// Sources are tried in order and the first non-empty value wins. The token
/// cookie is never consulted: it is the reference, not the assertion.
#[derive(Debug, Clone)]
pub struct TokenExtractor {
    sources: Vec<TokenSource>,
}

impl TokenExtractor {
    pub fn new(sources: Vec<TokenSource>) -> Self {
        Self { sources }
    }

    /// Header first, then the body field.
    pub fn from_config(config: &CsrfConfig) -> Self {
        Self::new(vec![
            TokenSource::Header(config.header_name.clone()),
            TokenSource::BodyField(config.field_name.clone()),
        ])
    }

    pub fn sources(&self) -> &[TokenSource] {
        &self.sources
    }

    pub fn extract(&self, request: &HttpRequest) -> Option<CsrfToken> {
        self.sources
            .iter()
            .filter_map(|source| source.read(request))
            .find(|value| !value.is_empty())
            .map(CsrfToken::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TokenExtractor {
        TokenExtractor::from_config(&CsrfConfig::default())
    }

    fn post() -> HttpRequest {
        HttpRequest::new("POST".to_string(), "/".to_string())
    }

    #[test]
    fn test_header_token() {
        let req = post().with_header("X-CSRF-Token", "testing123");
        assert_eq!(extractor().extract(&req), Some(CsrfToken::new("testing123")));
    }

    #[test]
    fn test_body_field_token() {
        let req = post().with_field("_csrfToken", "from-body");
        assert_eq!(extractor().extract(&req), Some(CsrfToken::new("from-body")));
    }

    #[test]
    fn test_header_takes_precedence() {
        let req = post()
            .with_header("x-csrf-token", "from-header")
            .with_field("_csrfToken", "from-body");
        assert_eq!(extractor().extract(&req), Some(CsrfToken::new("from-header")));
    }

    #[test]
    fn test_empty_header_falls_through() {
        let req = post()
            .with_header("X-CSRF-Token", "")
            .with_field("_csrfToken", "from-body");
        assert_eq!(extractor().extract(&req), Some(CsrfToken::new("from-body")));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let req = post()
            .with_header("X-CSRF-Token", "")
            .with_field("_csrfToken", "");
        assert_eq!(extractor().extract(&req), None);
    }

    #[test]
    fn test_cookie_is_not_an_assertion() {
        let req = post().with_cookie("csrfToken", "testing123");
        assert_eq!(extractor().extract(&req), None);
    }

    #[test]
    fn test_query_is_not_an_assertion() {
        let req = post().with_query("_csrfToken", "testing123");
        assert_eq!(extractor().extract(&req), None);
    }
}
