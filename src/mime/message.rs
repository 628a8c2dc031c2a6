//! Message parsing: header block plus flat or multipart body

use super::ContentType;

/// Body of a parsed message: either opaque bytes or sub-messages split on
/// a multipart boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Flat(Vec<u8>),
    Multipart(Vec<Message>),
}

/// A parsed message: unfolded headers, the parsed Content-Type, and the
/// body. Freshly allocated per parse; the caller owns it outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub headers: Vec<(String, String)>,
    pub content_type: ContentType,
    pub body: Body,
}

impl Message {
    /// Parse raw message bytes. Lenient by design: anything that cannot be
    /// interpreted as structure is kept as flat body bytes.
    ///
    /// At the top level, multipart splitting engages only when the message
    /// both declares a multipart Content-Type with a boundary and carries
    /// a MIME-Version header; RFC 2045 makes the version header a
    /// precondition for MIME semantics, and some encrypting clients omit
    /// it on inner payloads (see [`crate::reparse::repair_if_needed`]).
    /// Sub-parts never carry their own MIME-Version header, so recursion
    /// splits on the declared Content-Type alone.
    pub fn parse(raw: &[u8]) -> Self {
        Self::parse_gated(raw, true)
    }

    /// Recursive entry for body parts: no MIME-Version gate.
    fn parse_part(raw: &[u8]) -> Self {
        Self::parse_gated(raw, false)
    }

    fn parse_gated(raw: &[u8], top_level: bool) -> Self {
        let (header_block, body_bytes) = split_header_block(raw);
        let headers = parse_headers(header_block);
        let content_type = find_header(&headers, "content-type")
            .map(ContentType::parse)
            .unwrap_or_else(ContentType::text_plain);
        let version_ok = !top_level || find_header(&headers, "mime-version").is_some();

        if content_type.is_multipart() && version_ok {
            if let Some(boundary) = content_type.param("boundary") {
                let sections = split_multipart(body_bytes, boundary);
                if !sections.is_empty() {
                    return Self {
                        headers,
                        content_type,
                        body: Body::Multipart(
                            sections.iter().map(|s| Message::parse_part(s)).collect(),
                        ),
                    };
                }
            }
        }

        Self {
            headers,
            content_type,
            body: Body::Flat(body_bytes.to_vec()),
        }
    }

    /// A flat text message, the shape the armor decrypt path produces.
    pub fn flat_text(text: &str, charset: &str) -> Self {
        let content_type = ContentType::text_plain().with_param("charset", charset);
        Self {
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            content_type,
            body: Body::Flat(text.as_bytes().to_vec()),
        }
    }

    /// First header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Whether the parse actually produced a multipart body (as opposed to
    /// merely declaring a multipart Content-Type).
    pub fn is_multipart(&self) -> bool {
        matches!(self.body, Body::Multipart(_))
    }

    /// Sub-messages of a multipart body, empty for flat bodies.
    pub fn parts(&self) -> &[Message] {
        match &self.body {
            Body::Multipart(parts) => parts,
            Body::Flat(_) => &[],
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Split at the first empty line; everything before is the header block.
/// A message without an empty line is all headers and no body.
fn split_header_block(raw: &[u8]) -> (&[u8], &[u8]) {
    // A body opening with a blank line has no headers at all.
    if let Some(rest) = raw.strip_prefix(b"\r\n") {
        return (&[], rest);
    }
    if let Some(rest) = raw.strip_prefix(b"\n") {
        return (&[], rest);
    }
    let crlf = find_subslice(raw, b"\r\n\r\n").map(|i| (i, i + 4));
    let lf = find_subslice(raw, b"\n\n").map(|i| (i, i + 2));
    match (crlf, lf) {
        (Some((a, ae)), Some((b, be))) => {
            if a <= b {
                (&raw[..a], &raw[ae..])
            } else {
                (&raw[..b], &raw[be..])
            }
        }
        (Some((a, ae)), None) => (&raw[..a], &raw[ae..]),
        (None, Some((b, be))) => (&raw[..b], &raw[be..]),
        (None, None) => (raw, &[]),
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parse and unfold the header block. Continuation lines (leading space or
/// tab) append to the previous header value.
fn parse_headers(block: &[u8]) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for raw_line in block.split(|&b| b == b'\n') {
        let line = String::from_utf8_lossy(strip_cr(raw_line));
        if line.is_empty() {
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
        // Lines without a colon are silently dropped.
    }
    headers
}

fn strip_cr(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

/// Cut the body into sections delimited by `--boundary` lines, dropping
/// preamble and epilogue. Returns no sections when the boundary never
/// appears, in which case the caller keeps the body flat.
fn split_multipart(body: &[u8], boundary: &str) -> Vec<Vec<u8>> {
    let open = format!("--{}", boundary);
    let close = format!("--{}--", boundary);
    let mut sections: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<Vec<u8>> = None;

    for raw_line in body.split(|&b| b == b'\n') {
        let line = strip_cr(raw_line);
        if line == close.as_bytes() {
            if let Some(section) = current.take() {
                sections.push(trim_final_newline(section));
            }
            break;
        }
        if line == open.as_bytes() {
            if let Some(section) = current.take() {
                sections.push(trim_final_newline(section));
            }
            current = Some(Vec::new());
            continue;
        }
        if let Some(section) = current.as_mut() {
            section.extend_from_slice(raw_line);
            section.push(b'\n');
        }
    }
    if let Some(section) = current.take() {
        sections.push(trim_final_newline(section));
    }
    sections
}

/// The line break before a boundary delimiter belongs to the delimiter,
/// not to the part content.
fn trim_final_newline(mut section: Vec<u8>) -> Vec<u8> {
    if section.ends_with(b"\n") {
        section.pop();
        if section.ends_with(b"\r") {
            section.pop();
        }
    }
    section
}
