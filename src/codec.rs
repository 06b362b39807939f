//! Padding-free base64url, as used by the marketplace signature token.
//!
//! The marketplace strips `=` padding from both halves of the token, so the
//! decoder re-pads before handing off to a strict decoder.

use base64::{engine::general_purpose, Engine as _};

use crate::error::Error;

/// Decodes padding-free base64url.
///
/// Input is padded with `=` up to the next multiple of four and then decoded
/// with the URL-safe alphabet. Characters outside that alphabet, and lengths
/// no padding can fix, are rejected.
///
/// # Examples
///
/// ```
/// use marketplace_canvas::codec;
///
/// assert_eq!(codec::decode("cGF5bG9hZA").unwrap(), b"payload");
/// assert!(codec::decode("not base64!").is_err());
/// ```
pub fn decode(encoded: &str) -> Result<Vec<u8>, Error> {
    let mut padded = String::with_capacity(encoded.len() + 3);
    padded.push_str(encoded);
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    Ok(general_purpose::URL_SAFE.decode(padded)?)
}

/// Encodes bytes as base64url with all trailing `=` removed.
///
/// # Examples
///
/// ```
/// use marketplace_canvas::codec;
///
/// assert_eq!(codec::encode(b"payload"), "cGF5bG9hZA");
/// ```
pub fn encode(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
