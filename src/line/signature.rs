//! `X-Line-Signature` verification
//!
//! LINE signs the raw request body with HMAC-SHA256 keyed by the channel
//! secret and sends the base64 digest in the header.

use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{Error, Result};

/// Header carrying the signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Compute the base64 signature for a body
#[must_use]
pub fn sign(secret: &str, body: &[u8]) -> String {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(body);
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Verify a webhook signature in constant time
///
/// # Errors
///
/// Returns `Error::Signature` when the header is missing, undecodable or wrong
pub fn verify(secret: &str, body: &[u8], signature: Option<&str>) -> Result<()> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Signature("missing signature".to_string()))?;

    let provided = base64::engine::general_purpose::STANDARD
        .decode(signature)
        .map_err(|_| Error::Signature("malformed signature".to_string()))?;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| Error::Signature("bad channel secret".to_string()))?;
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| Error::Signature("signature mismatch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "channel-secret";
    const BODY: &[u8] = br#"{"destination":"U1","events":[]}"#;

    #[test]
    fn accepts_valid_signature() {
        let signature = sign(SECRET, BODY);
        assert!(verify(SECRET, BODY, Some(&signature)).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let signature = sign(SECRET, BODY);
        let err = verify(SECRET, b"{\"events\":[{}]}", Some(&signature)).unwrap_err();
        assert!(matches!(err, Error::Signature(ref m) if m == "signature mismatch"));
    }

    #[test]
    fn rejects_wrong_secret() {
        let signature = sign("other-secret", BODY);
        assert!(verify(SECRET, BODY, Some(&signature)).is_err());
    }

    #[test]
    fn rejects_missing_or_garbage_header() {
        assert!(matches!(
            verify(SECRET, BODY, None),
            Err(Error::Signature(ref m)) if m == "missing signature"
        ));
        assert!(matches!(
            verify(SECRET, BODY, Some("%%%")),
            Err(Error::Signature(ref m)) if m == "malformed signature"
        ));
    }
}
