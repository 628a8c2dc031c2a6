//! OpenPGP engine contract
//!
//! The actual cryptography lives in an external backend (a gpg subprocess,
//! a gpgme binding, a pure-Rust implementation). This module defines the
//! capability trait the orchestration layer drives and the record types the
//! backend reports verification results with.
//!
//! Engines are not assumed safe for concurrent invocation; the orchestrator
//! serializes every call through one lock, which is why the trait takes
//! `&mut self`.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Which operation an engine call (or a hook adjustment) is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Sign,
    Encrypt,
    Decrypt,
    Verify,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Sign => "sign",
            Operation::Encrypt => "encrypt",
            Operation::Decrypt => "decrypt",
            Operation::Verify => "verify",
        }
    }
}

/// Options passed to every engine call. Hooks may replace the defaults
/// before the call is made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Key id or address to sign as. `None` lets the engine pick its
    /// default identity.
    pub signer: Option<String>,
    /// For encrypt calls: also sign with the resolved identity. Combined
    /// sign-and-encrypt is one engine operation, not two.
    pub sign: bool,
    /// Request ASCII-armored output.
    pub armor: bool,
    /// Backend-specific switches, passed through untouched.
    pub extra: Vec<(String, String)>,
}

/// Per-key assurance level, ordered from no confidence to full trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Validity {
    None,
    Unknown,
    Marginal,
    Full,
}

/// Outcome code the engine reports for one signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigStatus {
    /// The signature verified against the payload.
    Good,
    /// The signature did not match the payload.
    BadSignature,
    /// Verification could not be completed (expired key, unsupported
    /// algorithm, backend trouble). Carries the engine's own description.
    Error(String),
}

/// One signature's verification result, as supplied by the engine.
#[derive(Debug, Clone)]
pub struct SignatureRecord {
    /// Fingerprint of the signing key.
    pub fingerprint: String,
    /// When the signature was made.
    pub timestamp: DateTime<Utc>,
    /// Assurance level for the signing key.
    pub validity: Validity,
    pub status: SigStatus,
    /// User ids reported alongside the result, when the backend inlines
    /// them. The interpreter prefers the uids from a fresh key lookup.
    pub uids: Vec<String>,
}

/// A locally resolvable public key.
#[derive(Debug, Clone)]
pub struct KeyInfo {
    pub fingerprint: String,
    /// User identities bound to the key, primary first.
    pub uids: Vec<String>,
}

/// Plaintext plus signature results from one combined decrypt-and-verify
/// call. Decryption and verification are a single backend operation, not
/// two, so their outputs arrive together.
#[derive(Debug, Clone)]
pub struct DecryptResult {
    pub plaintext: Vec<u8>,
    pub signatures: Vec<SignatureRecord>,
}

#[derive(Error, Debug)]
pub enum EngineError {
    /// The backend is not installed or not reachable.
    #[error("OpenPGP backend not available: {0}")]
    Unavailable(String),
    /// The backend ran but the operation failed.
    #[error("{0}")]
    Operation(String),
    /// No public key matching the fingerprint is locally known.
    #[error("no public key for {0}")]
    KeyNotFound(String),
}

/// Capability contract of the external OpenPGP backend.
///
/// Every method may block on subprocess I/O or on secret-key unlocking
/// (e.g. a passphrase prompt). None is cancellable and none retries.
pub trait PgpEngine: Send {
    /// Human-readable backend name, used in user-facing verdict lines.
    fn name(&self) -> &str;

    /// One-shot availability check, performed at orchestrator construction.
    fn probe(&self) -> Result<(), EngineError>;

    /// Produce a detached signature over `payload`.
    fn sign(&mut self, payload: &[u8], options: &EngineOptions) -> Result<Vec<u8>, EngineError>;

    /// Encrypt `payload` to every listed recipient.
    fn encrypt(
        &mut self,
        recipients: &[String],
        payload: &[u8],
        options: &EngineOptions,
    ) -> Result<Vec<u8>, EngineError>;

    /// Decrypt `ciphertext` and verify any embedded signatures in one call.
    fn decrypt_and_verify(
        &mut self,
        ciphertext: &[u8],
        options: &EngineOptions,
    ) -> Result<DecryptResult, EngineError>;

    /// Verify a detached `signature` over `payload`.
    fn verify(
        &mut self,
        signature: &[u8],
        payload: &[u8],
        options: &EngineOptions,
    ) -> Result<Vec<SignatureRecord>, EngineError>;

    /// Resolve a fingerprint to a locally known public key.
    fn lookup_key(&mut self, fingerprint: &str) -> Result<KeyInfo, EngineError>;
}
