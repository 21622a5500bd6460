//! Message builder: turns the structural event stream into typed records.
//!
//! # Error Handling Strategy
//!
//! Parsing a backup is all-or-nothing: malformed markup, a missing required
//! attribute, or an `<mms>` left open at end of document aborts the whole
//! parse and no partial result is returned. Schema oddities that do not
//! threaten the reconstructed data - unrecognized elements, attributes on
//! the `<parts>`/`<addrs>` containers, a `<part>` outside any `<mms>` - are
//! reported as warnings on stderr and parsing continues.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::models::{Message, MmsMessage, SmsMessage};
use crate::parsers::repair::RepairingReader;
use crate::parsers::xml::{EventReader, MarkupEvent};

/// Stateful consumer of [`MarkupEvent`]s. Carries the MMS currently under
/// construction as owned state; the record is finalized and pushed when its
/// closing tag arrives, immutable from then on.
pub struct MessageBuilder {
    messages: Vec<Message>,
    current_mms: Option<MmsMessage>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self { messages: Vec::new(), current_mms: None }
    }

    pub fn handle(&mut self, event: MarkupEvent) -> Result<()> {
        match event {
            MarkupEvent::Start { name, attributes } => self.handle_start(&name, &attributes),
            MarkupEvent::End { name } => {
                if name == "mms" {
                    if let Some(mms) = self.current_mms.take() {
                        self.messages.push(Message::Mms(mms));
                    }
                }
                Ok(())
            }
            // the backup format keeps everything in attributes
            MarkupEvent::Text(_) => Ok(()),
            MarkupEvent::Eof => Ok(()),
        }
    }

    fn handle_start(&mut self, name: &str, attrs: &HashMap<String, String>) -> Result<()> {
        match name {
            "sms" => {
                self.messages.push(Message::Sms(SmsMessage::from_attributes(attrs)?));
            }
            "mms" => {
                if self.current_mms.is_some() {
                    bail!("nested <mms> elements in backup document");
                }
                self.current_mms = Some(MmsMessage::from_attributes(attrs)?);
            }
            "part" => match self.current_mms.as_mut() {
                Some(mms) => mms.add_part(attrs)?,
                None => eprintln!("Warning: <part> outside of an <mms> element, skipping"),
            },
            "addr" => match self.current_mms.as_mut() {
                Some(mms) => mms.add_addr(attrs)?,
                None => eprintln!("Warning: <addr> outside of an <mms> element, skipping"),
            },
            "parts" | "addrs" => {
                if !attrs.is_empty() {
                    let mut keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
                    keys.sort_unstable();
                    eprintln!(
                        "Warning: <{}> container carries unexpected attributes: {}",
                        name,
                        keys.join(", ")
                    );
                }
            }
            // root element; carries count/backup metadata we don't need
            "smses" => {}
            other => {
                eprintln!("Warning: skipping unrecognized element <{}>", other);
            }
        }
        Ok(())
    }

    /// Consume the builder after the event stream is exhausted
    pub fn finish(self) -> Result<Vec<Message>> {
        if self.current_mms.is_some() {
            bail!("backup document ended inside an <mms> element");
        }
        Ok(self.messages)
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a backup export into messages in document order.
///
/// Runs the full ingestion pipeline in one streaming pass: the file is read
/// line by line, each line goes through the surrogate-pair repair filter,
/// the repaired text feeds the XML event reader, and the events drive a
/// [`MessageBuilder`].
pub fn parse_backup_file(path: &Path) -> Result<Vec<Message>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open backup file: {}", path.display()))?;
    let repaired = RepairingReader::new(BufReader::new(file));
    let mut events = EventReader::new(repaired);
    let mut builder = MessageBuilder::new();
    loop {
        match events.next_event()? {
            MarkupEvent::Eof => break,
            event => builder.handle(event)?,
        }
    }
    builder.finish().with_context(|| format!("Failed to parse {}", path.display()))
}
