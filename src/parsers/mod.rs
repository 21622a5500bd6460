//! Streaming ingestion pipeline for SMS Backup & Restore XML exports
//!
//! # Error Handling Strategy
//!
//! Unlike line-oriented formats where a bad line can be skipped, a backup
//! export is one XML document: a tokenization failure poisons everything
//! after it. Parsing is therefore all-or-nothing - any fatal error (markup
//! the parser cannot tokenize even after repair, a required attribute
//! missing from a message element) aborts the parse via `anyhow::Result`
//! and the caller gets no partial data.
//!
//! Anomalies that do not affect the reconstructed messages (unknown
//! elements, stray attributes on container elements) are reported to stderr
//! and parsing continues.
//!
//! The pipeline stages, leaves first:
//!
//! 1. [`repair`] - per-line rewrite of split UTF-16 surrogate pairs that
//!    the backup app emits as paired `&#NNNNN;` references
//! 2. [`xml`] - pull-based structural event reader over quick-xml
//! 3. [`backup`] - event dispatch building typed message records

pub mod backup;
pub mod repair;
pub mod xml;

pub use backup::{MessageBuilder, parse_backup_file};
pub use repair::{RepairingReader, repair_line};
pub use xml::{EventReader, MarkupEvent};
