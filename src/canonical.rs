//! Line-ending canonicalization for OpenPGP text operations
//!
//! Detached signatures are computed over canonical-form text (CRLF line
//! endings). Mail bodies composed locally usually carry bare LFs, so every
//! payload is canonicalized before it reaches the engine, and engine output
//! is decanonicalized before it is re-parsed as a message.

/// Rewrite every bare LF (not already preceded by CR) into CRLF.
pub fn canonicalize(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 32);
    let mut prev = 0u8;
    for &b in input {
        if b == b'\n' && prev != b'\r' {
            out.push(b'\r');
        }
        out.push(b);
        prev = b;
    }
    out
}

/// Inverse transform: CRLF back to LF.
pub fn decanonicalize(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'\r' && input.get(i + 1) == Some(&b'\n') {
            i += 1;
        }
        out.push(input[i]);
        i += 1;
    }
    out
}
