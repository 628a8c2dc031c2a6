//! The orchestration entry point
//!
//! [`CryptoManager`] owns the engine behind one lock and exposes the five
//! public operations: sign, encrypt, sign-and-encrypt, verify, decrypt.
//! It is constructed once at process startup and passed by reference to
//! every caller that needs cryptography.
//!
//! Every operation is synchronous and may block on subprocess I/O or on
//! secret-key unlocking (a passphrase prompt, for instance). Nothing here
//! is cancellable and nothing retries; callers wanting responsiveness must
//! run these calls off any latency-sensitive thread.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::canonical::canonicalize;
use crate::engine::{EngineOptions, Operation, PgpEngine};
use crate::envelope::{build_encrypted, build_signed, Envelope, Part};
use crate::error::ComposeError;
use crate::hooks::{CryptoHooks, NoopHooks};
use crate::identity::{resolve_signer, AccountIdentity};
use crate::reparse::{find_charset_marker, rebuild_armored, rebuild_mime};
use crate::verdict::{interpret, Verdict, VerdictKind};
use crate::mime::Message;

/// Result of an outbound operation. When the backend is missing the
/// operation yields a displayable verdict instead of failing; an engine
/// that is present but errors is a [`ComposeError`].
#[derive(Debug)]
pub enum ComposeOutcome {
    Envelope(Envelope),
    Unavailable(Verdict),
}

/// Everything the display path gets back from a decrypt call. The
/// decryption notice and the signature verdict are deliberately separate
/// values; they answer different questions.
#[derive(Debug)]
pub struct DecryptOutput {
    /// Did decryption itself succeed?
    pub notice: Verdict,
    /// Trust verdict over any embedded signatures. Absent when decryption
    /// failed outright.
    pub signature: Option<Verdict>,
    /// The reconstructed message. Absent when decryption failed.
    pub message: Option<Message>,
}

/// Single shared orchestrator over an OpenPGP backend.
///
/// The engine is not safe for concurrent invocation, so every call is
/// serialized through one mutex. Availability is probed exactly once at
/// construction; all other state is freshly allocated per call and owned
/// by the caller afterwards.
pub struct CryptoManager<E: PgpEngine, H: CryptoHooks = NoopHooks> {
    engine: Mutex<E>,
    hooks: H,
    available: bool,
    backend: String,
}

impl<E: PgpEngine> CryptoManager<E, NoopHooks> {
    pub fn new(engine: E) -> Self {
        Self::with_hooks(engine, NoopHooks)
    }
}

impl<E: PgpEngine, H: CryptoHooks> CryptoManager<E, H> {
    pub fn with_hooks(engine: E, hooks: H) -> Self {
        let backend = engine.name().to_string();
        let available = match engine.probe() {
            Ok(()) => true,
            Err(err) => {
                log::warn!("{} backend unavailable: {}", backend, err);
                false
            }
        };
        Self {
            engine: Mutex::new(engine),
            hooks,
            available,
            backend,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Sign `payload` as `from` and wrap it into a `multipart/signed`
    /// envelope. The detached signature is computed over the canonicalized
    /// serialization of the payload part.
    pub fn sign(
        &self,
        from: &str,
        accounts: &[AccountIdentity],
        payload: &Part,
    ) -> Result<ComposeOutcome, ComposeError> {
        if !self.available {
            return Ok(ComposeOutcome::Unavailable(self.unavailable_verdict()));
        }
        let options = self.options_for(
            Operation::Sign,
            EngineOptions {
                signer: resolve_signer(from, accounts),
                armor: true,
                ..EngineOptions::default()
            },
        );
        let canonical = canonicalize(&payload.to_bytes());
        let signature = self
            .lock_engine()
            .sign(&canonical, &options)
            .map_err(ComposeError::Sign)?;
        log::info!("signed outbound message from {}", from);
        Ok(ComposeOutcome::Envelope(build_signed(
            payload.clone(),
            signature,
        )))
    }

    /// Encrypt `payload` to `to` and wrap the ciphertext into a
    /// `multipart/encrypted` envelope. The sender is always added to the
    /// recipient set so their sent copy stays readable.
    pub fn encrypt(
        &self,
        from: &str,
        to: &[String],
        accounts: &[AccountIdentity],
        payload: &Part,
        sign: bool,
    ) -> Result<ComposeOutcome, ComposeError> {
        if !self.available {
            return Ok(ComposeOutcome::Unavailable(self.unavailable_verdict()));
        }
        let recipients = recipients_with_sender(from, to);
        let mut defaults = EngineOptions {
            armor: true,
            ..EngineOptions::default()
        };
        if sign {
            defaults.sign = true;
            defaults.signer = resolve_signer(from, accounts);
        }
        let options = self.options_for(Operation::Encrypt, defaults);
        let canonical = canonicalize(&payload.to_bytes());
        let ciphertext = self
            .lock_engine()
            .encrypt(&recipients, &canonical, &options)
            .map_err(ComposeError::Encrypt)?;
        log::info!(
            "encrypted outbound message from {} to {} recipients",
            from,
            recipients.len()
        );
        Ok(ComposeOutcome::Envelope(build_encrypted(ciphertext)))
    }

    /// Combined sign-and-encrypt: one engine call, parameterized encryption.
    pub fn sign_and_encrypt(
        &self,
        from: &str,
        to: &[String],
        accounts: &[AccountIdentity],
        payload: &Part,
    ) -> Result<ComposeOutcome, ComposeError> {
        self.encrypt(from, to, accounts, payload, true)
    }

    /// Verify a detached signature over `payload` and interpret the result.
    /// Always returns a verdict; engine trouble on this path is folded in,
    /// never propagated.
    pub fn verify(&self, payload: &[u8], signature: &[u8]) -> Verdict {
        if !self.available {
            return self.unavailable_verdict();
        }
        let options = self.options_for(Operation::Verify, EngineOptions::default());
        let canonical = canonicalize(payload);
        let mut engine = self.lock_engine();
        match engine.verify(signature, &canonical, &options) {
            Ok(records) => interpret(
                &records,
                |fingerprint| engine.lookup_key(fingerprint).ok(),
                &self.hooks,
            ),
            Err(err) => {
                log::info!("signature verification failed: {}", err);
                Verdict::new(VerdictKind::Unknown, "unable to verify signature")
                    .with_lines(vec![err.to_string()])
            }
        }
    }

    /// Decrypt (and verify, in the same engine call) a ciphertext body and
    /// reconstruct a displayable message from the recovered plaintext.
    ///
    /// `armor` selects the reconstruction mode: armored bodies were
    /// textually embedded and become flat decoded text; everything else is
    /// re-parsed as a standalone MIME message with the one-shot structure
    /// repair.
    pub fn decrypt(&self, ciphertext: &[u8], armor: bool) -> DecryptOutput {
        if !self.available {
            return DecryptOutput {
                notice: self.unavailable_verdict(),
                signature: None,
                message: None,
            };
        }
        let options = self.options_for(
            Operation::Decrypt,
            EngineOptions {
                armor,
                ..EngineOptions::default()
            },
        );
        let canonical = canonicalize(ciphertext);
        let mut engine = self.lock_engine();
        let result = match engine.decrypt_and_verify(&canonical, &options) {
            Ok(result) => result,
            Err(err) => {
                // Local outcome for the display path, not a fault.
                log::info!("decryption failed: {}", err);
                return DecryptOutput {
                    notice: Verdict::new(VerdictKind::Invalid, "could not decrypt message")
                        .with_lines(vec![err.to_string()]),
                    signature: None,
                    message: None,
                };
            }
        };
        let signature = interpret(
            &result.signatures,
            |fingerprint| engine.lookup_key(fingerprint).ok(),
            &self.hooks,
        );
        drop(engine);

        let message = if armor {
            let charset = find_charset_marker(ciphertext);
            rebuild_armored(&result.plaintext, charset.as_deref())
        } else {
            rebuild_mime(&result.plaintext)
        };
        DecryptOutput {
            notice: Verdict::new(VerdictKind::Valid, "message decrypted for display"),
            signature: Some(signature),
            message: Some(message),
        }
    }

    fn unavailable_verdict(&self) -> Verdict {
        Verdict::new(VerdictKind::Unknown, "cryptographic operations unavailable").with_lines(
            vec![format!("The {} backend is not available", self.backend)],
        )
    }

    fn options_for(&self, op: Operation, defaults: EngineOptions) -> EngineOptions {
        match self.hooks.adjust_options(op, &defaults) {
            Some(adjusted) => {
                log::debug!("{} options adjusted by hook", op.as_str());
                adjusted
            }
            None => defaults,
        }
    }

    fn lock_engine(&self) -> MutexGuard<'_, E> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The caller-supplied recipients plus the sender, so the sender can
/// always decrypt their own sent copy.
fn recipients_with_sender(from: &str, to: &[String]) -> Vec<String> {
    let mut recipients = to.to_vec();
    if !recipients.iter().any(|r| r.eq_ignore_ascii_case(from)) {
        recipients.push(from.to_string());
    }
    recipients
}
