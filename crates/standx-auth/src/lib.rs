//! Credential import, clock synchronization, and request signing.
//!
//! Every mutating call to the StandX API must carry four signature
//! headers binding the request body to the operator's ed25519 key,
//! stamped with server-synchronized time. This crate owns that whole
//! pipeline: decoding the key, estimating the server clock offset once
//! at startup, and producing the signed header set per request.

pub mod clock;
pub mod credential;
pub mod error;
pub mod signer;

pub use clock::{ClockOffset, ClockSync};
pub use credential::SigningCredential;
pub use error::{AuthError, AuthResult};
pub use signer::{RequestSigner, SignedHeaders, SIGN_VERSION};
