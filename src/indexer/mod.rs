//! Conversation index over a parsed backup
//!
//! The parser hands over messages in document order; the indexer groups
//! them by resolved conversation partner, sorts every sequence by the
//! numeric epoch-millisecond timestamp, and exposes the read-only query
//! surface (all messages, one conversation, the contact list) that the CLI
//! and any other consumer work against.

pub mod builder;
pub mod index;

pub use builder::build_index;
pub use index::ConversationIndex;
