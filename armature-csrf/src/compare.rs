//! Token comparison.
//!
//! Both values are hashed to fixed-size SHA-256 digests before comparing,
//! so neither the mismatch position nor the input lengths show up in the
//! comparison timing.

use crate::token::CsrfToken;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compare an asserted token against the reference token.
///
/// An absent value never matches, not even another absent value.
pub fn tokens_equal(a: Option<&CsrfToken>, b: Option<&CsrfToken>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => digest_eq(a.as_str().as_bytes(), b.as_str().as_bytes()),
        _ => false,
    }
}

fn digest_eq(a: &[u8], b: &[u8]) -> bool {
    let a = Sha256::digest(a);
    let b = Sha256::digest(b);
    a.as_slice().ct_eq(b.as_slice()).into()
}
