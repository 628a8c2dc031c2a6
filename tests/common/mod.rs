//! Common test setup and utilities for integration tests
//!
//! Provides a scriptable mock OpenPGP engine that records what the
//! orchestration layer asks of it, plus shared record/key constructors.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use sealmail::{
    DecryptResult, EngineError, EngineOptions, KeyInfo, PgpEngine, SigStatus, SignatureRecord,
    Validity,
};

/// Initialize test logging (call once per test)
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Scripted behavior and call recording for the mock engine. Tests keep a
/// handle to this state after the engine moves into the manager.
#[derive(Default)]
pub struct EngineState {
    /// When set, `probe` fails with this reason.
    pub unavailable: Option<String>,
    pub fail_sign: Option<String>,
    pub fail_encrypt: Option<String>,
    pub fail_decrypt: Option<String>,
    /// Plaintext returned by decrypt_and_verify.
    pub plaintext: Vec<u8>,
    /// Signature records returned by verify and decrypt_and_verify.
    pub signatures: Vec<SignatureRecord>,
    /// Locally known keys, by fingerprint.
    pub keys: HashMap<String, KeyInfo>,

    pub recorded_payloads: Vec<Vec<u8>>,
    pub recorded_recipients: Vec<Vec<String>>,
    pub recorded_options: Vec<(String, EngineOptions)>,
    pub lookups: Vec<String>,
}

pub struct MockEngine {
    state: Arc<Mutex<EngineState>>,
}

impl MockEngine {
    pub fn new() -> (Self, Arc<Mutex<EngineState>>) {
        let state = Arc::new(Mutex::new(EngineState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }

    pub fn with_state(state: EngineState) -> (Self, Arc<Mutex<EngineState>>) {
        let state = Arc::new(Mutex::new(state));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl PgpEngine for MockEngine {
    fn name(&self) -> &str {
        "mock-gpg"
    }

    fn probe(&self) -> Result<(), EngineError> {
        match &self.state.lock().unwrap().unavailable {
            Some(reason) => Err(EngineError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn sign(&mut self, payload: &[u8], options: &EngineOptions) -> Result<Vec<u8>, EngineError> {
        let mut state = self.state.lock().unwrap();
        state.recorded_payloads.push(payload.to_vec());
        state
            .recorded_options
            .push(("sign".to_string(), options.clone()));
        if let Some(reason) = &state.fail_sign {
            return Err(EngineError::Operation(reason.clone()));
        }
        Ok(b"-----BEGIN PGP SIGNATURE-----\nMOCKSIG\n-----END PGP SIGNATURE-----\n".to_vec())
    }

    fn encrypt(
        &mut self,
        recipients: &[String],
        payload: &[u8],
        options: &EngineOptions,
    ) -> Result<Vec<u8>, EngineError> {
        let mut state = self.state.lock().unwrap();
        state.recorded_payloads.push(payload.to_vec());
        state.recorded_recipients.push(recipients.to_vec());
        state
            .recorded_options
            .push(("encrypt".to_string(), options.clone()));
        if let Some(reason) = &state.fail_encrypt {
            return Err(EngineError::Operation(reason.clone()));
        }
        Ok(b"-----BEGIN PGP MESSAGE-----\nMOCKCIPHER\n-----END PGP MESSAGE-----\n".to_vec())
    }

    fn decrypt_and_verify(
        &mut self,
        ciphertext: &[u8],
        options: &EngineOptions,
    ) -> Result<DecryptResult, EngineError> {
        let mut state = self.state.lock().unwrap();
        state.recorded_payloads.push(ciphertext.to_vec());
        state
            .recorded_options
            .push(("decrypt".to_string(), options.clone()));
        if let Some(reason) = &state.fail_decrypt {
            return Err(EngineError::Operation(reason.clone()));
        }
        Ok(DecryptResult {
            plaintext: state.plaintext.clone(),
            signatures: state.signatures.clone(),
        })
    }

    fn verify(
        &mut self,
        _signature: &[u8],
        payload: &[u8],
        options: &EngineOptions,
    ) -> Result<Vec<SignatureRecord>, EngineError> {
        let mut state = self.state.lock().unwrap();
        state.recorded_payloads.push(payload.to_vec());
        state
            .recorded_options
            .push(("verify".to_string(), options.clone()));
        Ok(state.signatures.clone())
    }

    fn lookup_key(&mut self, fingerprint: &str) -> Result<KeyInfo, EngineError> {
        let mut state = self.state.lock().unwrap();
        state.lookups.push(fingerprint.to_string());
        state
            .keys
            .get(fingerprint)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound(fingerprint.to_string()))
    }
}

pub const ALICE_FPR: &str = "AAAA1111BBBB2222CCCC";

pub fn alice_key() -> KeyInfo {
    KeyInfo {
        fingerprint: ALICE_FPR.to_string(),
        uids: vec!["Alice <alice@example.org>".to_string()],
    }
}

pub fn signature_record(validity: Validity, status: SigStatus) -> SignatureRecord {
    SignatureRecord {
        fingerprint: ALICE_FPR.to_string(),
        timestamp: Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap(),
        validity,
        status,
        uids: Vec::new(),
    }
}
