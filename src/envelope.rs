//! Outbound MIME envelope construction
//!
//! Builds the RFC 3156 wire shapes: `multipart/signed` around a payload and
//! its detached signature, and `multipart/encrypted` around a control part
//! and the opaque ciphertext. Envelopes are built fresh per operation and
//! ownership passes to the composition subsystem immediately.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::mime::ContentType;

/// Media type of a detached OpenPGP signature part.
pub const PGP_SIGNATURE: &str = "application/pgp-signature";
/// Media type of the encryption control part.
pub const PGP_ENCRYPTED: &str = "application/pgp-encrypted";
/// Fixed filename of the signature attachment.
pub const SIGNATURE_FILENAME: &str = "signature.asc";
/// Fixed filename of the ciphertext part.
pub const CIPHERTEXT_FILENAME: &str = "msg.asc";
/// Fixed one-line body of the control part.
pub const VERSION_BODY: &[u8] = b"Version: 1\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    fn as_str(&self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

/// One leaf of an envelope: its own content type, optional disposition and
/// filename, and the body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub content_type: ContentType,
    pub disposition: Option<Disposition>,
    pub filename: Option<String>,
    pub body: Vec<u8>,
}

impl Part {
    pub fn new(content_type: ContentType, body: Vec<u8>) -> Self {
        Self {
            content_type,
            disposition: None,
            filename: None,
            body,
        }
    }

    pub fn text(body: &str) -> Self {
        Self::new(
            ContentType::text_plain().with_param("charset", "utf-8"),
            body.as_bytes().to_vec(),
        )
    }

    /// Serialize to wire bytes. The detached signature is computed over
    /// exactly this rendering of the payload part (canonicalized), so it
    /// must match what is later transmitted byte for byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 128);
        out.extend_from_slice(format!("Content-Type: {}\r\n", self.content_type).as_bytes());
        if let Some(disposition) = self.disposition {
            match &self.filename {
                Some(name) => out.extend_from_slice(
                    format!(
                        "Content-Disposition: {}; filename=\"{}\"\r\n",
                        disposition.as_str(),
                        name
                    )
                    .as_bytes(),
                ),
                None => out.extend_from_slice(
                    format!("Content-Disposition: {}\r\n", disposition.as_str()).as_bytes(),
                ),
            }
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

/// The constructed MIME tree handed to the composition subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub content_type: ContentType,
    pub parts: Vec<Part>,
}

impl Envelope {
    /// Serialize with a generated boundary. The boundary is appended to the
    /// envelope's Content-Type parameters in the output.
    pub fn to_bytes(&self) -> Vec<u8> {
        let boundary = generate_boundary();
        let ct = self
            .content_type
            .clone()
            .with_param("boundary", &boundary);
        let mut out = Vec::new();
        out.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
        out.extend_from_slice(b"MIME-Version: 1.0\r\n\r\n");
        for part in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            out.extend_from_slice(&part.to_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        out
    }
}

/// Wrap a payload and its detached signature into `multipart/signed`.
/// The payload travels unchanged as part one; the signature is attached
/// as a named signature file.
pub fn build_signed(payload: Part, signature: Vec<u8>) -> Envelope {
    let signature_part = Part {
        content_type: ContentType::parse(PGP_SIGNATURE),
        disposition: Some(Disposition::Attachment),
        filename: Some(SIGNATURE_FILENAME.to_string()),
        body: signature,
    };
    Envelope {
        content_type: ContentType::new("multipart", "signed")
            .with_param("protocol", PGP_SIGNATURE),
        parts: vec![payload, signature_part],
    }
}

/// Wrap ciphertext into `multipart/encrypted`: a fixed control part followed
/// by the ciphertext as an opaque inline part.
pub fn build_encrypted(ciphertext: Vec<u8>) -> Envelope {
    let control_part = Part::new(ContentType::parse(PGP_ENCRYPTED), VERSION_BODY.to_vec());
    let ciphertext_part = Part {
        content_type: ContentType::new("application", "octet-stream"),
        disposition: Some(Disposition::Inline),
        filename: Some(CIPHERTEXT_FILENAME.to_string()),
        body: ciphertext,
    };
    Envelope {
        content_type: ContentType::new("multipart", "encrypted")
            .with_param("protocol", PGP_ENCRYPTED),
        parts: vec![control_part, ciphertext_part],
    }
}

fn generate_boundary() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("=-sealmail-{:08x}{:04x}", nanos, n)
}
