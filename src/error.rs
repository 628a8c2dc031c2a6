//! Error types for the composition path
//!
//! Only outbound operations fail explicitly: the user can retry or abandon
//! sending. Inbound verify/decrypt failures are never surfaced as errors;
//! they are folded into a [`Verdict`](crate::Verdict) so the display path
//! always has something to render.

use thiserror::Error;

use crate::engine::EngineError;

/// A sign or encrypt invocation failed while composing an outbound message.
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("signing failed: {0}")]
    Sign(#[source] EngineError),

    #[error("encryption failed: {0}")]
    Encrypt(#[source] EngineError),
}
