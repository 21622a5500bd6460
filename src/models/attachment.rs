use std::collections::HashMap;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::models::message::required;
use crate::utils::format_file_timestamp;

/// One binary attachment of an MMS. The payload stays base64-encoded until
/// [`decode`](AttachmentPart::decode) is called, so attachments that are
/// never viewed or exported are never decoded.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentPart {
    pub seq: Option<i64>,
    pub content_type: String,
    /// Synthesized, collision-resistant name; see [`synthesize_file_name`]
    pub file_name: String,
    pub charset: Option<String>,
    /// Base64 payload exactly as it appeared in the backup
    pub data: String,
}

impl AttachmentPart {
    /// Decode the base64 payload into raw bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        // some exports wrap the payload across lines
        let compact: String = self.data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(compact.as_bytes())
            .with_context(|| format!("invalid base64 payload in attachment '{}'", self.file_name))
    }
}

/// Recipient/sender role of an `<addr>` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AddrKind {
    To,
    Cc,
    Bcc,
    From,
}

impl AddrKind {
    /// Map the numeric role code used by the backup format
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "151" => Some(AddrKind::To),
            "130" => Some(AddrKind::Cc),
            "129" => Some(AddrKind::Bcc),
            "137" => Some(AddrKind::From),
            _ => None,
        }
    }
}

/// One recipient/sender entry of an MMS, present for group messages
#[derive(Debug, Clone, Serialize)]
pub struct Addr {
    pub address: String,
    pub kind: AddrKind,
    pub charset: Option<String>,
}

impl Addr {
    /// Build from an `<addr>` attribute map. An unknown role code is a
    /// non-fatal anomaly: the entry is skipped with a warning.
    pub fn from_attributes(attrs: &HashMap<String, String>) -> Result<Option<Self>> {
        let address = required(attrs, "addr", "address")?.to_string();
        let code = required(attrs, "addr", "type")?;
        match AddrKind::from_code(code) {
            Some(kind) => {
                Ok(Some(Addr { address, kind, charset: attrs.get("charset").cloned() }))
            }
            None => {
                eprintln!("Warning: <addr> for {} has unknown role code '{}', skipping", address, code);
                Ok(None)
            }
        }
    }
}

/// Build a unique file name for a binary MMS part.
///
/// The backup rarely carries usable part names, and never unique ones, so the
/// name is assembled from the resolved contact and the message time:
/// `MMS_<contact>_<yyyy-mm-dd>_<hh-mm-ss>_<original name>`, or with a
/// `.<subtype>` extension guessed from the content type when no original
/// name exists.
pub fn synthesize_file_name(
    contact: &str,
    timestamp: i64,
    original_name: Option<&str>,
    content_type: &str,
) -> String {
    let stamp = format_file_timestamp(timestamp);
    match original_name {
        Some(name) => format!("MMS_{}{}_{}", contact, stamp, name),
        None => {
            let ext = content_type.split('/').nth(1).filter(|s| !s.is_empty()).unwrap_or("bin");
            format!("MMS_{}{}.{}", contact, stamp, ext)
        }
    }
}
