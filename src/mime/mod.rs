//! Minimal MIME message model
//!
//! This module carries just enough RFC 2045/5322 structure for the
//! orchestration layer: header splitting and unfolding, Content-Type
//! parsing, and boundary-based multipart splitting. It is a lenient
//! parser — mail in the wild is malformed more often than not, and the
//! decrypt pipeline in particular must cope with inner payloads produced
//! by other clients.

mod content_type;
mod message;

pub use content_type::ContentType;
pub use message::{Body, Message};
