//! SMS Backup Explorer - browse and export SMS Backup & Restore XML backups
//!
//! This library parses the XML export produced by the "SMS Backup & Restore"
//! Android app and reconstructs a per-conversation, chronologically ordered
//! view of SMS and MMS messages. It supports:
//!
//! - Repairing the split UTF-16 surrogate pairs the app writes for emoji,
//!   which standard XML parsers reject
//! - Streaming the document in one pass, MMS parts and recipients included
//! - Grouping messages by conversation partner and sorting them by timestamp
//! - Lazily decoding base64 attachments for display or export
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use sms_backup_explorer::build_index;
//!
//! let index = build_index(Path::new("sms-20200412.xml"))?;
//! for contact in index.contacts() {
//!     println!("{}", contact);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod indexer;
pub mod models;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use indexer::builder::build_index;
pub use indexer::index::ConversationIndex;
pub use models::{ConversationKey, Direction, Message};
pub use parsers::backup::parse_backup_file;
pub use parsers::repair::repair_line;
