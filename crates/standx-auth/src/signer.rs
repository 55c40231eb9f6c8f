//! Request signing for mutating API calls.
//!
//! Canonical message: `version "," request_id "," timestamp "," payload`
//! where payload is the exact serialized request body. The ed25519
//! signature of the UTF-8 message is base64-encoded into the
//! `x-request-signature` header. Read-only calls carry bearer auth only
//! and never pass through here.

use crate::clock::ClockOffset;
use crate::credential::SigningCredential;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::Signer as _;
use uuid::Uuid;

/// Current signing protocol version.
pub const SIGN_VERSION: &str = "v1";

/// The four signature headers attached to a mutating request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `x-request-sign-version`
    pub version: String,
    /// `x-request-id` (fresh per call, never reused)
    pub request_id: String,
    /// `x-request-timestamp` (server-corrected milliseconds)
    pub timestamp: String,
    /// `x-request-signature` (base64 ed25519 signature)
    pub signature: String,
}

/// Signs request payloads under the imported credential.
///
/// Construction requires a credential, so a missing key is impossible
/// after startup by construction.
pub struct RequestSigner {
    credential: SigningCredential,
    offset: ClockOffset,
}

impl RequestSigner {
    pub fn new(credential: SigningCredential, offset: ClockOffset) -> Self {
        Self { credential, offset }
    }

    /// Sign a serialized request body.
    ///
    /// Generates a fresh random request id and stamps the
    /// server-corrected time.
    pub fn sign(&self, payload: &[u8]) -> SignedHeaders {
        let request_id = Uuid::new_v4().to_string();
        let timestamp = self.offset.adjusted_now_ms();
        self.sign_parts(&request_id, timestamp, payload)
    }

    /// Sign with explicit id and timestamp. Deterministic: identical
    /// inputs always produce the identical signature.
    pub fn sign_parts(&self, request_id: &str, timestamp: i64, payload: &[u8]) -> SignedHeaders {
        let mut message =
            Vec::with_capacity(SIGN_VERSION.len() + request_id.len() + 16 + 3 + payload.len());
        message.extend_from_slice(SIGN_VERSION.as_bytes());
        message.push(b',');
        message.extend_from_slice(request_id.as_bytes());
        message.push(b',');
        message.extend_from_slice(timestamp.to_string().as_bytes());
        message.push(b',');
        message.extend_from_slice(payload);

        let signature = self.credential.key().sign(&message);

        SignedHeaders {
            version: SIGN_VERSION.to_string(),
            request_id: request_id.to_string(),
            timestamp: timestamp.to_string(),
            signature: BASE64.encode(signature.to_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> RequestSigner {
        let encoded = bs58::encode([42u8; 32]).into_string();
        let credential = SigningCredential::import(&encoded).unwrap();
        RequestSigner::new(credential, ClockOffset(0))
    }

    const PAYLOAD: &[u8] = br#"{"symbol":"BTC-USD","leverage":5}"#;
    const REQ_ID: &str = "0e5c3e9e-0d3a-4a8e-9a26-6d55a1b7a001";

    #[test]
    fn test_signing_is_deterministic() {
        let s = signer();
        let a = s.sign_parts(REQ_ID, 1700000000000, PAYLOAD);
        let b = s.sign_parts(REQ_ID, 1700000000000, PAYLOAD);
        assert_eq!(a, b);
    }

    #[test]
    fn test_changing_any_field_changes_signature() {
        let s = signer();
        let base = s.sign_parts(REQ_ID, 1700000000000, PAYLOAD);

        let other_id = s.sign_parts("0e5c3e9e-0d3a-4a8e-9a26-6d55a1b7a002", 1700000000000, PAYLOAD);
        assert_ne!(base.signature, other_id.signature);

        let other_ts = s.sign_parts(REQ_ID, 1700000000001, PAYLOAD);
        assert_ne!(base.signature, other_ts.signature);

        let other_payload = s.sign_parts(REQ_ID, 1700000000000, b"{}");
        assert_ne!(base.signature, other_payload.signature);
    }

    #[test]
    fn test_different_keys_disagree() {
        let a = signer();

        let encoded = bs58::encode([43u8; 32]).into_string();
        let b = RequestSigner::new(
            SigningCredential::import(&encoded).unwrap(),
            ClockOffset(0),
        );

        assert_ne!(
            a.sign_parts(REQ_ID, 1700000000000, PAYLOAD).signature,
            b.sign_parts(REQ_ID, 1700000000000, PAYLOAD).signature
        );
    }

    #[test]
    fn test_fresh_request_ids_per_call() {
        let s = signer();
        let a = s.sign(PAYLOAD);
        let b = s.sign(PAYLOAD);
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_signature_is_base64_of_64_bytes() {
        let s = signer();
        let headers = s.sign_parts(REQ_ID, 1700000000000, PAYLOAD);
        let raw = BASE64.decode(&headers.signature).unwrap();
        assert_eq!(raw.len(), 64);
        assert_eq!(headers.version, SIGN_VERSION);
    }
}
