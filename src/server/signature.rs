//! `X-Hub-Signature-256` verification for webhook deliveries.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Check `sha256=<hex>` against the HMAC-SHA256 of `body` keyed with `secret`.
///
/// Comparison is constant-time.
pub fn verify(secret: &[u8], body: &[u8], header: Option<&str>) -> bool {
    let Some(hex_digest) = header.and_then(|h| h.trim().strip_prefix("sha256=")) else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Header value for `body` signed with `secret`.
pub fn sign(secret: &[u8], body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(body);
    Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_body_verifies() {
        let header = sign(b"app-secret", b"{\"object\":\"whatsapp_business_account\"}").unwrap();
        assert!(verify(
            b"app-secret",
            b"{\"object\":\"whatsapp_business_account\"}",
            Some(&header)
        ));
    }

    #[test]
    fn tampered_body_fails() {
        let header = sign(b"app-secret", b"original").unwrap();
        assert!(!verify(b"app-secret", b"tampered", Some(&header)));
    }

    #[test]
    fn wrong_secret_fails() {
        let header = sign(b"other", b"body").unwrap();
        assert!(!verify(b"app-secret", b"body", Some(&header)));
    }

    #[test]
    fn missing_or_garbled_header_fails() {
        assert!(!verify(b"s", b"body", None));
        assert!(!verify(b"s", b"body", Some("md5=abcd")));
        assert!(!verify(b"s", b"body", Some("sha256=not-hex")));
    }
}
