//! Content-Type header parsing and rendering

use std::fmt;

/// A parsed `Content-Type` value: primary type, subtype, and parameters
/// in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub primary: String,
    pub subtype: String,
    pub params: Vec<(String, String)>,
}

impl ContentType {
    pub fn new(primary: &str, subtype: &str) -> Self {
        Self {
            primary: primary.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// Parameter value by case-insensitive name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_multipart(&self) -> bool {
        self.primary == "multipart"
    }

    /// Default type for bodies with no Content-Type header.
    pub fn text_plain() -> Self {
        Self::new("text", "plain")
    }

    /// Parse a header value like
    /// `multipart/signed; protocol="application/pgp-signature"`.
    /// Lenient: an unparseable value falls back to `text/plain`.
    pub fn parse(value: &str) -> Self {
        let mut segments = value.split(';');
        let mime_type = segments.next().unwrap_or("").trim();
        let (primary, subtype) = match mime_type.split_once('/') {
            Some((p, s)) if !p.is_empty() && !s.is_empty() => (p, s),
            _ => return Self::text_plain(),
        };
        let mut ct = Self::new(primary, subtype);
        for segment in segments {
            if let Some((name, raw)) = segment.split_once('=') {
                let value = raw.trim().trim_matches('"');
                ct.params
                    .push((name.trim().to_ascii_lowercase(), value.to_string()));
            }
        }
        ct
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.primary, self.subtype)?;
        for (name, value) in &self.params {
            if value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"-._".contains(&b))
            {
                write!(f, "; {}={}", name, value)?;
            } else {
                write!(f, "; {}=\"{}\"", name, value)?;
            }
        }
        Ok(())
    }
}
