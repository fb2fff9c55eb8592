use http::Method;

/// Whether a request method is exempt from token verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodClass {
    Safe,
    Unsafe,
}

impl MethodClass {
    pub fn is_safe(self) -> bool {
        self == MethodClass::Safe
    }
}

/// Classify a request method.
///
/// Only the canonical `GET` and `HEAD` are safe. Anything else, including
/// lowercase spellings and methods we have never heard of, must be verified.
pub fn classify(method: &str) -> MethodClass {
    if method == Method::GET.as_str() || method == Method::HEAD.as_str() {
        MethodClass::Safe
    } else {
        MethodClass::Unsafe
    }
}
