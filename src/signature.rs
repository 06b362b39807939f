//! HMAC-SHA1 signature tokens.
//!
//! A token has the form `<digest>.<payload>`, both halves padding-free
//! base64url. The payload is opaque: the marketplace chooses it only so there
//! is something to MAC. The signed request parameters travel separately as
//! ordinary request parameters.

use std::fmt;

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::codec;
use crate::secret::SecretKey;

type HmacSha1 = Hmac<Sha1>;

/// Why a signature token did not verify.
///
/// This is an outcome, not a fault: the gate folds every variant into
/// "unauthenticated".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSignature {
    /// One of the halves was not valid base64url
    Malformed,
    /// One of the halves was missing or decoded to nothing
    Empty,
    /// The digest did not match the payload under this key
    Mismatch,
}

impl fmt::Display for InvalidSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidSignature::Malformed => write!(f, "signature is not valid base64url"),
            InvalidSignature::Empty => write!(f, "signature is missing its digest or payload"),
            InvalidSignature::Mismatch => write!(f, "signature digest does not match"),
        }
    }
}

impl std::error::Error for InvalidSignature {}

/// Proof that a token was produced with the configured key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSignature {
    payload: Vec<u8>,
}

impl VerifiedSignature {
    /// The opaque payload bytes that were signed.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Checks signature tokens against the marketplace secret.
///
/// # Examples
///
/// ```
/// use marketplace_canvas::{signature, SecretKey, SignatureVerifier};
///
/// let verifier = SignatureVerifier::new(SecretKey::new("shh"));
/// let token = signature::sign(b"shh", b"payload");
///
/// assert!(verifier.verify(&token).is_ok());
/// assert!(verifier.verify("garbage").is_err());
/// ```
#[derive(Debug)]
pub struct SignatureVerifier {
    secret: SecretKey,
}

impl SignatureVerifier {
    /// Creates a verifier bound to `secret`.
    pub fn new(secret: SecretKey) -> Self {
        Self { secret }
    }

    /// Verifies `token`.
    ///
    /// A trailing `.` is appended before splitting so a token without a
    /// payload splits cleanly and then fails as [`InvalidSignature::Empty`].
    /// Anything after a second `.` is ignored. The digest comparison runs in
    /// constant time.
    pub fn verify(&self, token: &str) -> Result<VerifiedSignature, InvalidSignature> {
        let terminated = format!("{}.", token);
        let mut parts = terminated.split('.');
        let digest_part = parts.next().unwrap_or_default();
        let payload_part = parts.next().unwrap_or_default();

        let digest = codec::decode(digest_part).map_err(|_| InvalidSignature::Malformed)?;
        let payload = codec::decode(payload_part).map_err(|_| InvalidSignature::Malformed)?;
        if digest.is_empty() || payload.is_empty() {
            return Err(InvalidSignature::Empty);
        }

        let mut mac = keyed_mac(self.secret.expose_secret());
        mac.update(&payload);
        mac.verify_slice(&digest)
            .map_err(|_| InvalidSignature::Mismatch)?;

        Ok(VerifiedSignature { payload })
    }

    /// Produces a token for `payload` under this verifier's key.
    pub fn sign(&self, payload: &[u8]) -> String {
        sign(self.secret.expose_secret(), payload)
    }
}

/// Produces a `<digest>.<payload>` token the way the marketplace host does.
pub fn sign(secret: &[u8], payload: &[u8]) -> String {
    let mut mac = keyed_mac(secret);
    mac.update(payload);
    let digest = mac.finalize().into_bytes();
    format!("{}.{}", codec::encode(&digest), codec::encode(payload))
}

fn keyed_mac(secret: &[u8]) -> HmacSha1 {
    HmacSha1::new_from_slice(secret).expect("HMAC can take key of any size")
}
