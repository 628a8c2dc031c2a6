//! Message reconstruction from decrypted plaintext
//!
//! After a successful decrypt the recovered bytes must be turned back into
//! a displayable message. Inline-armored bodies become flat text decoded
//! with the charset the armor block advertises; attachment-style payloads
//! are re-parsed as standalone MIME messages, with a one-shot repair for a
//! defect in some encrypting clients that omit the MIME-Version header on
//! the inner payload.

use encoding_rs::Encoding;

use crate::canonical::decanonicalize;
use crate::mime::Message;

/// Find a `Charset:` marker preceding the encoded block of an armored
/// ciphertext body. Scanning stops at the blank line that separates the
/// armor headers from the encoded data.
pub fn find_charset_marker(ciphertext: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(ciphertext);
    let mut in_armor_headers = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("-----BEGIN PGP") {
            in_armor_headers = true;
            continue;
        }
        if in_armor_headers && trimmed.is_empty() {
            break;
        }
        if let Some(rest) = strip_prefix_ignore_case(trimmed, "charset:") {
            let value = rest.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Decode inline-armored plaintext into a flat text message, using the
/// advertised charset when it names a known encoding and UTF-8 otherwise.
/// No MIME parsing happens on this path; the body was embedded text, not
/// a structured attachment.
pub fn rebuild_armored(plaintext: &[u8], charset: Option<&str>) -> Message {
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);
    let (text, _, had_errors) = encoding.decode(plaintext);
    if had_errors {
        log::warn!("lossy {} decode of decrypted text", encoding.name());
    }
    Message::flat_text(&text, encoding.name())
}

/// Decanonicalize and parse decrypted plaintext as a standalone MIME
/// message, repairing the structure if needed.
pub fn rebuild_mime(plaintext: &[u8]) -> Message {
    let raw = decanonicalize(plaintext);
    let parsed = Message::parse(&raw);
    repair_if_needed(&raw, parsed)
}

/// One-shot MIME-structure repair.
///
/// Some encrypting clients write an inner payload that declares a
/// multipart Content-Type but omits the MIME-Version header, so a
/// conforming parse leaves the body flat. When that shape is detected,
/// prepend the missing header and re-parse exactly once. Never applied in
/// a loop; a payload this heuristic cannot fix stays as the re-parse
/// left it.
pub fn repair_if_needed(raw: &[u8], parsed: Message) -> Message {
    if !parsed.content_type.is_multipart() || parsed.is_multipart() {
        return parsed;
    }
    log::debug!("multipart declared without MIME-Version, re-parsing with injected header");
    let mut patched = Vec::with_capacity(raw.len() + 20);
    patched.extend_from_slice(b"MIME-Version: 1.0\n");
    patched.extend_from_slice(raw);
    Message::parse(&patched)
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    match line.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&line[prefix.len()..]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARMORED: &[u8] = b"-----BEGIN PGP MESSAGE-----\n\
Version: GnuPG v2\n\
Charset: ISO-8859-1\n\
\n\
hQEMA5mZly9lyc9\n\
-----END PGP MESSAGE-----\n";

    #[test]
    fn charset_marker_found_in_armor_headers() {
        assert_eq!(find_charset_marker(ARMORED), Some("ISO-8859-1".to_string()));
    }

    #[test]
    fn charset_scan_stops_at_encoded_block() {
        let body = b"-----BEGIN PGP MESSAGE-----\n\nQ2hhcnNldDogS09JOC1S\nCharset: KOI8-R\n";
        assert_eq!(find_charset_marker(body), None);
    }

    #[test]
    fn armored_rebuild_decodes_with_advertised_charset() {
        // 0xE9 is é in ISO-8859-1 and invalid as UTF-8.
        let msg = rebuild_armored(b"caf\xe9", Some("ISO-8859-1"));
        assert_eq!(msg.body, crate::mime::Body::Flat("café".as_bytes().to_vec()));
        assert!(!msg.is_multipart());
    }

    #[test]
    fn unknown_charset_falls_back_to_utf8() {
        let msg = rebuild_armored("plain text".as_bytes(), Some("no-such-charset"));
        assert_eq!(msg.content_type.param("charset"), Some("UTF-8"));
    }

    #[test]
    fn repair_injects_mime_version_once() {
        let raw: &[u8] = b"Content-Type: multipart/mixed; boundary=\"bb\"\n\n\
--bb\nContent-Type: text/plain\n\ninner\n--bb--\n";
        let parsed = Message::parse(raw);
        assert!(!parsed.is_multipart());
        let repaired = repair_if_needed(raw, parsed);
        assert!(repaired.is_multipart());
        assert_eq!(repaired.parts().len(), 1);
    }

    #[test]
    fn well_formed_message_is_left_alone() {
        let raw: &[u8] = b"MIME-Version: 1.0\nContent-Type: multipart/mixed; boundary=\"bb\"\n\n\
--bb\n\ninner\n--bb--\n";
        let parsed = Message::parse(raw);
        let repaired = repair_if_needed(raw, parsed.clone());
        assert_eq!(repaired, parsed);
    }

    #[test]
    fn rebuild_mime_decanonicalizes_first() {
        let canonical = b"Content-Type: text/plain\r\n\r\nline one\r\nline two\r\n";
        let msg = rebuild_mime(canonical);
        assert_eq!(
            msg.body,
            crate::mime::Body::Flat(b"line one\nline two\n".to_vec())
        );
    }
}
