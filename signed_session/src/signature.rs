//! HMAC-SHA256 signing of session identifiers.
//!
//! A signed value is `<value>.<mac>` where `<mac>` is the standard base64 encoding of
//! `HMAC-SHA256(secret, value)` with the `=` padding stripped. Cookie values carry an
//! additional `s:` prefix marking the format version.

use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SIGNED_COOKIE_PREFIX: &str = "s:";

fn mac_of(value: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(value.as_bytes());
    STANDARD_NO_PAD.encode(mac.finalize().into_bytes())
}

pub fn sign(value: &str, secret: &str) -> String {
    format!("{value}.{}", mac_of(value, secret))
}

/// Returns the original value iff the signature matches, `None` otherwise.
pub fn unsign(signed: &str, secret: &str) -> Option<String> {
    let (value, _) = signed.rsplit_once('.')?;
    let expected = sign(value, secret);

    if bool::from(expected.as_bytes().ct_eq(signed.as_bytes())) {
        Some(value.to_string())
    } else {
        None
    }
}

pub fn sign_cookie(value: &str, secret: &str) -> String {
    format!("{SIGNED_COOKIE_PREFIX}{}", sign(value, secret))
}

/// Verify a cookie value against every secret in turn.
///
/// A missing `s:` prefix is a failure, not an unsigned value.
pub fn unsign_cookie<S: AsRef<str>>(input: &str, secrets: &[S]) -> Option<String> {
    let signed = input.strip_prefix(SIGNED_COOKIE_PREFIX)?;
    secrets
        .iter()
        .find_map(|secret| unsign(signed, secret.as_ref()))
}
