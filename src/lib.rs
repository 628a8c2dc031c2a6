//! Sealmail - OpenPGP orchestration for a mail client
//!
//! This crate sits between a mail client's composition/display layers and
//! an external OpenPGP backend. Outbound, it resolves the signing identity,
//! canonicalizes the payload, drives the engine, and wraps the result into
//! the RFC 3156 `multipart/signed` / `multipart/encrypted` envelopes.
//! Inbound, it interprets per-signature verification results into one
//! aggregate trust verdict and reconstructs a displayable message from
//! decrypted plaintext, repairing a known MIME defect of other clients
//! along the way.
//!
//! The backend itself (key management, the actual cryptography, subprocess
//! plumbing) is behind the [`PgpEngine`] trait; deployment-specific
//! customization is behind [`CryptoHooks`].

pub mod canonical;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod hooks;
pub mod identity;
pub mod manager;
pub mod mime;
pub mod reparse;
pub mod verdict;

// Re-export commonly used items for convenience
pub use engine::{
    DecryptResult, EngineError, EngineOptions, KeyInfo, Operation, PgpEngine, SigStatus,
    SignatureRecord, Validity,
};
pub use envelope::{build_encrypted, build_signed, Disposition, Envelope, Part};
pub use error::ComposeError;
pub use hooks::{CryptoHooks, NoopHooks};
pub use identity::{resolve_signer, AccountIdentity};
pub use manager::{ComposeOutcome, CryptoManager, DecryptOutput};
pub use mime::{Body, ContentType, Message};
pub use verdict::{interpret, Verdict, VerdictKind};
