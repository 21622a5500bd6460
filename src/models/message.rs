use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::models::attachment::{Addr, AttachmentPart, synthesize_file_name};
use crate::utils::format_readable_date;

/// Contact name the backup app writes when it could not resolve a number
pub const UNKNOWN_CONTACT: &str = "(Unknown)";

/// Attribute value the backup app writes for absent optional fields
const NULL_VALUE: &str = "null";

/// Message direction, from the `type` attribute on `<sms>` (codes 1-6)
/// or the `msg_box` attribute on `<mms>` (codes 1-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Received,
    Sent,
    Draft,
    Outbox,
    Failed,
    Queued,
}

impl Direction {
    /// Parse a numeric direction code as written by the backup app
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "1" => Ok(Direction::Received),
            "2" => Ok(Direction::Sent),
            "3" => Ok(Direction::Draft),
            "4" => Ok(Direction::Outbox),
            "5" => Ok(Direction::Failed),
            "6" => Ok(Direction::Queued),
            other => bail!("unknown message direction code '{}'", other),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Received => "Received",
            Direction::Sent => "Sent",
            Direction::Draft => "Draft",
            Direction::Outbox => "Outbox",
            Direction::Failed => "Failed",
            Direction::Queued => "Queued",
        }
    }

    pub fn is_received(&self) -> bool {
        matches!(self, Direction::Received)
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Direction::Sent)
    }
}

/// Grouping identity under which messages are indexed: one conversation
/// partner, or every message regardless of partner
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConversationKey {
    All,
    Contact(String),
}

impl ConversationKey {
    pub fn contact(name: impl Into<String>) -> Self {
        ConversationKey::Contact(name.into())
    }
}

/// One SMS, built atomically from the attributes of an `<sms>` element
/// and immutable thereafter
#[derive(Debug, Clone, Serialize)]
pub struct SmsMessage {
    pub address: String,
    /// Epoch milliseconds; the authoritative sort key
    pub timestamp: i64,
    pub direction: Direction,
    pub body: String,
    pub contact_name: String,
    /// Resolved display contact: the contact name, or the address when the
    /// backup only knew "(Unknown)"
    pub contact: String,
    pub readable_date: String,
    pub read: Option<bool>,
    pub status: Option<i32>,
}

impl SmsMessage {
    pub fn from_attributes(attrs: &HashMap<String, String>) -> Result<Self> {
        let address = required(attrs, "sms", "address")?.to_string();
        let timestamp = parse_timestamp(required(attrs, "sms", "date")?)?;
        let direction = Direction::from_code(required(attrs, "sms", "type")?)?;
        let body = required(attrs, "sms", "body")?.to_string();
        let contact_name = required(attrs, "sms", "contact_name")?.to_string();
        let contact = resolve_contact(&contact_name, &address);
        let readable_date = attrs
            .get("readable_date")
            .cloned()
            .unwrap_or_else(|| format_readable_date(timestamp));

        Ok(Self {
            address,
            timestamp,
            direction,
            body,
            contact_name,
            contact,
            readable_date,
            read: attrs.get("read").map(|v| v == "1"),
            status: attrs.get("status").and_then(|v| v.parse().ok()),
        })
    }
}

/// One MMS: header attributes from the `<mms>` element, then mutated by
/// `add_part`/`add_addr` for its nested elements until the closing tag
#[derive(Debug, Clone, Serialize)]
pub struct MmsMessage {
    pub address: String,
    pub timestamp: i64,
    pub direction: Direction,
    pub contact_name: String,
    pub contact: String,
    pub readable_date: String,
    /// Aggregated body, collected from the text-bearing parts
    pub text: String,
    pub parts: Vec<AttachmentPart>,
    pub addrs: Vec<Addr>,
}

impl MmsMessage {
    pub fn from_attributes(attrs: &HashMap<String, String>) -> Result<Self> {
        let address = required(attrs, "mms", "address")?.to_string();
        let timestamp = parse_timestamp(required(attrs, "mms", "date")?)?;
        let direction = Direction::from_code(required(attrs, "mms", "msg_box")?)?;
        let contact_name = required(attrs, "mms", "contact_name")?.to_string();
        let contact = resolve_contact(&contact_name, &address);
        let readable_date = attrs
            .get("readable_date")
            .cloned()
            .unwrap_or_else(|| format_readable_date(timestamp));

        Ok(Self {
            address,
            timestamp,
            direction,
            contact_name,
            contact,
            readable_date,
            text: String::new(),
            parts: Vec::new(),
            addrs: Vec::new(),
        })
    }

    /// Apply the content-type policy to one `<part>` element.
    ///
    /// `application/smil` is presentation markup the backup attaches to every
    /// MMS and carries no user content; it is dropped. `text/plain` parts are
    /// merged into the aggregated body. Any other content type merges a text
    /// attribute into the body as well (nothing the user wrote is lost, no
    /// matter how it was declared) and materializes a binary payload as an
    /// [`AttachmentPart`].
    pub fn add_part(&mut self, attrs: &HashMap<String, String>) -> Result<()> {
        let content_type = required(attrs, "part", "ct")?;
        if content_type == "application/smil" {
            return Ok(());
        }

        if content_type == "text/plain" {
            let text = required(attrs, "part", "text")?;
            self.merge_body(text);
            return Ok(());
        }

        if let Some(text) = optional(attrs, "text") {
            self.merge_body(text);
        }
        if let Some(data) = optional(attrs, "data") {
            let file_name = synthesize_file_name(
                &self.contact,
                self.timestamp,
                optional(attrs, "name"),
                content_type,
            );
            self.parts.push(AttachmentPart {
                seq: attrs.get("seq").and_then(|v| v.parse().ok()),
                content_type: content_type.to_string(),
                file_name,
                charset: optional(attrs, "chset").map(str::to_string),
                data: data.to_string(),
            });
        }
        Ok(())
    }

    /// Append an `<addr>` recipient/sender entry
    pub fn add_addr(&mut self, attrs: &HashMap<String, String>) -> Result<()> {
        if let Some(addr) = Addr::from_attributes(attrs)? {
            self.addrs.push(addr);
        }
        Ok(())
    }

    fn merge_body(&mut self, text: &str) {
        if self.text.is_empty() {
            self.text = text.to_string();
        } else {
            // blank line between parts
            self.text.push_str("\n\n");
            self.text.push_str(text);
        }
    }
}

/// One message of either kind, with the shared capability set the index
/// and its consumers need
#[derive(Debug, Clone, Serialize)]
pub enum Message {
    Sms(SmsMessage),
    Mms(MmsMessage),
}

impl Message {
    pub fn direction(&self) -> Direction {
        match self {
            Message::Sms(m) => m.direction,
            Message::Mms(m) => m.direction,
        }
    }

    pub fn address(&self) -> &str {
        match self {
            Message::Sms(m) => &m.address,
            Message::Mms(m) => &m.address,
        }
    }

    /// Resolved display contact, also the conversation key
    pub fn contact(&self) -> &str {
        match self {
            Message::Sms(m) => &m.contact,
            Message::Mms(m) => &m.contact,
        }
    }

    /// Epoch milliseconds
    pub fn timestamp(&self) -> i64 {
        match self {
            Message::Sms(m) => m.timestamp,
            Message::Mms(m) => m.timestamp,
        }
    }

    pub fn readable_date(&self) -> &str {
        match self {
            Message::Sms(m) => &m.readable_date,
            Message::Mms(m) => &m.readable_date,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Message::Sms(m) => &m.body,
            Message::Mms(m) => &m.text,
        }
    }

    pub fn attachments(&self) -> &[AttachmentPart] {
        match self {
            Message::Sms(_) => &[],
            Message::Mms(m) => &m.parts,
        }
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments().is_empty()
    }
}

/// Fetch a required attribute, or fail the parse: a missing required
/// attribute means the document does not match the backup schema
pub(crate) fn required<'a>(
    attrs: &'a HashMap<String, String>,
    tag: &str,
    key: &str,
) -> Result<&'a str> {
    attrs
        .get(key)
        .map(String::as_str)
        .with_context(|| format!("<{}> element is missing required attribute '{}'", tag, key))
}

/// Fetch an optional attribute, treating the literal "null" the backup app
/// writes for absent values as missing
pub(crate) fn optional<'a>(attrs: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    attrs.get(key).map(String::as_str).filter(|v| *v != NULL_VALUE)
}

fn parse_timestamp(value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .with_context(|| format!("invalid epoch-millisecond timestamp '{}'", value))
}

fn resolve_contact(contact_name: &str, address: &str) -> String {
    if contact_name == UNKNOWN_CONTACT {
        address.to_string()
    } else {
        contact_name.to_string()
    }
}
