//! Canonical request signing.
//!
//! Flow verifies each request by recomputing an HMAC-SHA256 over the
//! parameter set: names sorted bytewise, each name concatenated directly
//! with its value, no separators. The digest travels hex-encoded in the `s`
//! parameter.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Sign a parameter set with the merchant's secret key.
///
/// `BTreeMap` iteration yields keys in bytewise lexicographic order, which
/// is exactly the order the remote verifier uses. Values must already be
/// stringified by the caller (`to_string()` on integers is stable and never
/// produces scientific notation).
pub fn sign(secret: &str, params: &BTreeMap<String, String>) -> String {
    let mut message = String::new();
    for (name, value) in params {
        message.push_str(name);
        message.push_str(value);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    to_hex(&mac.finalize().into_bytes())
}

/// Lowercase hex encoding of the digest.
fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::new(), |mut s, b| {
        use std::fmt::Write;
        let _ = write!(s, "{b:02x}");
        s
    })
}
