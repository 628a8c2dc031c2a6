//! Signature-verification interpretation
//!
//! Converts the raw per-signature records reported by the engine into one
//! aggregate trust verdict plus human-readable detail lines. This encodes
//! the policy for how multiple signatures combine, how trust levels gate
//! the outcome, and how an unresolvable key degrades a signature without
//! aborting interpretation of the rest.

use serde::{Deserialize, Serialize};

use crate::engine::{KeyInfo, SigStatus, SignatureRecord, Validity};
use crate::hooks::CryptoHooks;

/// Aggregate outcome of one verify or decrypt-verify call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictKind {
    /// Every signature verified and every signing key is trusted (or the
    /// message carried no signature at all).
    Valid,
    /// Every signature verified but at least one signing key lacks a
    /// trusted certification path.
    ValidUntrusted,
    /// At least one signature did not match the payload.
    Invalid,
    /// Verification could not be completed.
    Unknown,
}

/// The user-facing trust verdict: an outcome, a one-line summary, and
/// ordered free-text detail lines. Immutable once constructed; the UI
/// layer consumes it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub kind: VerdictKind,
    pub summary: String,
    pub lines: Vec<String>,
}

impl Verdict {
    pub fn new(kind: VerdictKind, summary: impl Into<String>) -> Self {
        Self {
            kind,
            summary: summary.into(),
            lines: Vec::new(),
        }
    }

    pub fn with_lines(mut self, lines: Vec<String>) -> Self {
        self.lines = lines;
        self
    }
}

/// Fixed warning lines emitted for a resolvable key without a trusted
/// certification path.
const UNTRUSTED_WARNING: [&str; 2] = [
    "WARNING: This key is not certified with a trusted signature!",
    "There is no indication that the signature belongs to the owner.",
];

const NO_PUBLIC_KEY: &str = "No public key available for verification";

/// Reduce an ordered sequence of signature records to one verdict.
///
/// `lookup` resolves a fingerprint to a locally known key and may fail
/// (`None`); a failed lookup downgrades that signature to untrusted and
/// adds an explanatory line, nothing more.
pub fn interpret(
    records: &[SignatureRecord],
    mut lookup: impl FnMut(&str) -> Option<KeyInfo>,
    hooks: &dyn CryptoHooks,
) -> Verdict {
    if records.is_empty() {
        // Decryption succeeded and there was nothing to verify; the absence
        // of a signature is not itself a failure.
        return Verdict::new(VerdictKind::Valid, "message wasn't signed");
    }

    let mut lines: Vec<String> = Vec::new();
    let mut all_trusted = true;
    let mut any_bad = false;
    let mut any_error = false;
    let mut first_summary: Option<String> = None;

    for record in records {
        let key = lookup(&record.fingerprint);
        if key.is_none() {
            log::debug!("no local key for {}", record.fingerprint);
        }
        let trusted = key.is_some() && record.validity >= Validity::Marginal;
        all_trusted &= trusted;
        match &record.status {
            SigStatus::Good => {}
            SigStatus::BadSignature => any_bad = true,
            SigStatus::Error(_) => any_error = true,
        }

        lines.push(format!(
            "Signature made {} using key {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            short_key_id(&record.fingerprint)
        ));
        match &key {
            Some(key) => {
                let mut uids = key.uids.iter();
                match uids.next() {
                    Some(primary) => lines.push(format!("From {}", primary)),
                    None => lines.push(format!("From key {}", key.fingerprint)),
                }
                for uid in uids {
                    lines.push(format!("aka {}", uid));
                }
                if !trusted {
                    lines.extend(UNTRUSTED_WARNING.iter().map(|s| s.to_string()));
                }
            }
            None => lines.push(NO_PUBLIC_KEY.to_string()),
        }
        lines.extend(hooks.augment_signature_detail(record, key.as_ref()));

        if first_summary.is_none() {
            first_summary = Some(signature_summary(record, key.as_ref(), trusted));
        }
    }

    // Summary comes from the first signature only, even when later
    // signatures differ in trust. Longstanding policy; changing it needs a
    // product decision, not a refactor.
    let summary = first_summary.unwrap_or_default();

    let kind = if any_bad {
        VerdictKind::Invalid
    } else if any_error {
        VerdictKind::Unknown
    } else if all_trusted {
        VerdictKind::Valid
    } else {
        VerdictKind::ValidUntrusted
    };

    Verdict::new(kind, summary).with_lines(lines)
}

fn signature_summary(record: &SignatureRecord, key: Option<&KeyInfo>, trusted: bool) -> String {
    let signer = key
        .and_then(|k| k.uids.first())
        .or_else(|| record.uids.first())
        .cloned()
        .unwrap_or_else(|| record.fingerprint.clone());
    match &record.status {
        SigStatus::Good if trusted => format!("Good signature from {}", signer),
        SigStatus::Good => format!("Good signature from {} (untrusted)", signer),
        SigStatus::BadSignature => format!("Bad signature from {}", signer),
        SigStatus::Error(reason) => format!("Unable to check signature: {}", reason),
    }
}

/// Last eight characters of the fingerprint. Fingerprints are hex in
/// practice, but the string comes from the engine, so cut on character
/// boundaries rather than bytes.
fn short_key_id(fingerprint: &str) -> &str {
    match fingerprint.char_indices().rev().nth(7) {
        Some((index, _)) => &fingerprint[index..],
        None => fingerprint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::NoopHooks;
    use chrono::{TimeZone, Utc};

    fn record(fingerprint: &str, validity: Validity, status: SigStatus) -> SignatureRecord {
        SignatureRecord {
            fingerprint: fingerprint.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            validity,
            status,
            uids: Vec::new(),
        }
    }

    fn known_key(fingerprint: &str) -> Option<KeyInfo> {
        Some(KeyInfo {
            fingerprint: fingerprint.to_string(),
            uids: vec![
                "Alice <alice@example.org>".to_string(),
                "Alice (work) <alice@work.example>".to_string(),
            ],
        })
    }

    #[test]
    fn no_signatures_is_valid() {
        let verdict = interpret(&[], |_| None, &NoopHooks);
        assert_eq!(verdict.kind, VerdictKind::Valid);
        assert_eq!(verdict.summary, "message wasn't signed");
        assert!(verdict.lines.is_empty());
    }

    #[test]
    fn full_validity_is_valid() {
        let records = vec![record("ABCDEF0123456789", Validity::Full, SigStatus::Good)];
        let verdict = interpret(&records, known_key, &NoopHooks);
        assert_eq!(verdict.kind, VerdictKind::Valid);
        assert_eq!(verdict.summary, "Good signature from Alice <alice@example.org>");
    }

    #[test]
    fn marginal_validity_is_valid() {
        let records = vec![record("ABCDEF0123456789", Validity::Marginal, SigStatus::Good)];
        let verdict = interpret(&records, known_key, &NoopHooks);
        assert_eq!(verdict.kind, VerdictKind::Valid);
    }

    #[test]
    fn low_validity_is_valid_untrusted_with_warnings() {
        let records = vec![record("ABCDEF0123456789", Validity::Unknown, SigStatus::Good)];
        let verdict = interpret(&records, known_key, &NoopHooks);
        assert_eq!(verdict.kind, VerdictKind::ValidUntrusted);
        assert!(verdict.lines.contains(&UNTRUSTED_WARNING[0].to_string()));
        assert!(verdict.lines.contains(&UNTRUSTED_WARNING[1].to_string()));
    }

    #[test]
    fn bad_signature_dominates_trusted_signature() {
        let records = vec![
            record("BAD0000000000000", Validity::Full, SigStatus::BadSignature),
            record("ABCDEF0123456789", Validity::Full, SigStatus::Good),
        ];
        let verdict = interpret(&records, known_key, &NoopHooks);
        assert_eq!(verdict.kind, VerdictKind::Invalid);
    }

    #[test]
    fn other_error_without_bad_signature_is_unknown() {
        let records = vec![record(
            "ABCDEF0123456789",
            Validity::Full,
            SigStatus::Error("key expired".to_string()),
        )];
        let verdict = interpret(&records, known_key, &NoopHooks);
        assert_eq!(verdict.kind, VerdictKind::Unknown);
        assert_eq!(verdict.summary, "Unable to check signature: key expired");
    }

    #[test]
    fn unresolvable_key_downgrades_without_aborting() {
        let records = vec![
            record("MISSING000000000", Validity::Full, SigStatus::Good),
            record("ABCDEF0123456789", Validity::Full, SigStatus::Good),
        ];
        let verdict = interpret(
            &records,
            |fpr| {
                if fpr.starts_with("MISSING") {
                    None
                } else {
                    known_key(fpr)
                }
            },
            &NoopHooks,
        );
        // Both signatures still interpreted; the missing key only costs trust.
        assert_eq!(verdict.kind, VerdictKind::ValidUntrusted);
        assert!(verdict.lines.contains(&NO_PUBLIC_KEY.to_string()));
        assert!(verdict.lines.iter().any(|l| l.contains("alice@example.org")));
    }

    #[test]
    fn summary_comes_from_first_signature_only() {
        let records = vec![
            record("ABCDEF0123456789", Validity::Full, SigStatus::Good),
            record("ABCDEF0123456789", Validity::None, SigStatus::Good),
        ];
        let verdict = interpret(&records, known_key, &NoopHooks);
        assert_eq!(verdict.kind, VerdictKind::ValidUntrusted);
        // First signature was trusted, so the summary carries no
        // untrusted marker even though the aggregate does.
        assert_eq!(verdict.summary, "Good signature from Alice <alice@example.org>");
    }

    #[test]
    fn secondary_uids_emit_aka_lines() {
        let records = vec![record("ABCDEF0123456789", Validity::Full, SigStatus::Good)];
        let verdict = interpret(&records, known_key, &NoopHooks);
        assert!(verdict
            .lines
            .contains(&"aka Alice (work) <alice@work.example>".to_string()));
    }

    #[test]
    fn short_key_id_cuts_last_eight_characters() {
        assert_eq!(short_key_id("ABCDEF0123456789"), "23456789");
        assert_eq!(short_key_id("SHORT"), "SHORT");
        assert_eq!(short_key_id("éééééééééé"), "éééééééé");
    }

    #[test]
    fn non_ascii_fingerprint_does_not_panic() {
        // A byte-based cut of the last eight bytes would land inside 'é'.
        let mut rec = record("ABCDEFGHé1234567", Validity::Full, SigStatus::Good);
        rec.uids.push("Boris <boris@example.org>".to_string());
        let verdict = interpret(&[rec], |_| None, &NoopHooks);
        assert_eq!(verdict.kind, VerdictKind::ValidUntrusted);
        assert!(verdict.lines.iter().any(|l| l.starts_with("Signature made ")));
    }

    #[test]
    fn hook_lines_are_appended_per_signature() {
        struct KeyserverHint;
        impl CryptoHooks for KeyserverHint {
            fn augment_signature_detail(
                &self,
                record: &SignatureRecord,
                _key: Option<&KeyInfo>,
            ) -> Vec<String> {
                vec![format!("Fetch key: hkps://keys.example/{}", record.fingerprint)]
            }
        }
        let records = vec![record("ABCDEF0123456789", Validity::Full, SigStatus::Good)];
        let verdict = interpret(&records, known_key, &KeyserverHint);
        assert!(verdict
            .lines
            .contains(&"Fetch key: hkps://keys.example/ABCDEF0123456789".to_string()));
    }
}
