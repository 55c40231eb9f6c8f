//! Signing credential import.
//!
//! The operator supplies a 32-byte ed25519 seed in one of two encodings:
//! base-58, or base-64 (optionally 33 bytes with a leading version byte,
//! which is stripped). Any other length fails the import.

use crate::error::{AuthError, AuthResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::SigningKey;
use tracing::info;
use zeroize::Zeroizing;

/// Length of a raw ed25519 seed.
const KEY_LEN: usize = 32;

/// Highest leading byte treated as a version marker in the 33-byte
/// base-64 form.
const VERSION_MARKER_MAX: u8 = 0x01;

/// Encoding the key was recognized in, for the import log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyEncoding {
    Base58,
    Base64,
    Base64Prefixed,
}

impl std::fmt::Display for KeyEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base58 => write!(f, "base58"),
            Self::Base64 => write!(f, "base64"),
            Self::Base64Prefixed => write!(f, "base64 (33 bytes)"),
        }
    }
}

/// Imported ed25519 signing credential.
///
/// Raw seed bytes are zeroized after the dalek key is constructed.
pub struct SigningCredential {
    key: SigningKey,
}

impl SigningCredential {
    /// Import a key from its string encoding.
    ///
    /// Recognizes version-marked 33-byte base-64, then base-58, then
    /// plain base-64. The decoded value must be exactly 32 bytes (or 33
    /// bytes base-64 with a leading marker byte, in which case the
    /// trailing 32 are used).
    pub fn import(key_str: &str) -> AuthResult<Self> {
        let key_str = key_str.trim();
        if key_str.is_empty() {
            return Err(AuthError::Credential("empty key string".to_string()));
        }

        let (bytes, encoding) = Self::decode(key_str)?;
        let seed: &[u8; KEY_LEN] = bytes[..]
            .try_into()
            .map_err(|_| AuthError::Credential("key is not 32 bytes".to_string()))?;

        let key = SigningKey::from_bytes(seed);
        info!(%encoding, "Signing key imported");

        Ok(Self { key })
    }

    fn decode(key_str: &str) -> AuthResult<(Zeroizing<Vec<u8>>, KeyEncoding)> {
        // A 33-byte key renders as 44 unpadded base-64 chars that usually
        // fall inside the base-58 alphabet too, so a bs58 attempt would
        // misread it. Check the version-marked base-64 form first.
        if let Ok(decoded) = BASE64.decode(key_str) {
            if decoded.len() == KEY_LEN + 1 && decoded[0] <= VERSION_MARKER_MAX {
                return Ok((Self::strip_version(decoded), KeyEncoding::Base64Prefixed));
            }
        }

        if let Ok(decoded) = bs58::decode(key_str).into_vec() {
            if decoded.len() == KEY_LEN {
                return Ok((Zeroizing::new(decoded), KeyEncoding::Base58));
            }
        }

        if let Ok(decoded) = BASE64.decode(key_str) {
            match decoded.len() {
                KEY_LEN => return Ok((Zeroizing::new(decoded), KeyEncoding::Base64)),
                len if len == KEY_LEN + 1 => {
                    return Ok((Self::strip_version(decoded), KeyEncoding::Base64Prefixed));
                }
                _ => {}
            }
        }

        Err(AuthError::Credential(
            "key must decode to 32 bytes (base58 or base64)".to_string(),
        ))
    }

    /// Drop the leading version byte; the seed is the trailing 32.
    fn strip_version(decoded: Vec<u8>) -> Zeroizing<Vec<u8>> {
        let stripped = Zeroizing::new(decoded[1..].to_vec());
        drop(Zeroizing::new(decoded));
        stripped
    }

    /// The dalek signing key.
    pub(crate) fn key(&self) -> &SigningKey {
        &self.key
    }

    /// Raw seed bytes (test support).
    #[cfg(test)]
    pub fn seed(&self) -> [u8; KEY_LEN] {
        self.key.to_bytes()
    }
}
