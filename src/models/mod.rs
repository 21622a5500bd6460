//! Data models for SMS Backup & Restore exports.
//!
//! This module defines the data structures used throughout the application:
//!
//! - [`SmsMessage`] - one short text message, built from an `<sms>` element
//! - [`MmsMessage`] - one multimedia message with its parts and recipients
//! - [`Message`] - sum type over both kinds with the shared capability set
//! - [`AttachmentPart`] / [`Addr`] - nested MMS content and recipients
//! - [`ConversationKey`] - grouping identity for the conversation index
//!
//! Construction happens from the attribute maps the streaming XML parser
//! emits; the types are immutable once their element closes.

pub mod attachment;
pub mod message;

pub use attachment::{Addr, AddrKind, AttachmentPart, synthesize_file_name};
pub use message::{ConversationKey, Direction, Message, MmsMessage, SmsMessage, UNKNOWN_CONTACT};
