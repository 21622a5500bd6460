//! Pull-based cursor over the streaming XML parser.
//!
//! Wraps `quick_xml::Reader` into the three event kinds the message builder
//! dispatches on: element start (with an attribute map), element end, and
//! text content. Self-closing elements are split into a start event followed
//! by an end event, so the builder sees one uniform shape.
//!
//! Malformed markup, including invalid character references that survive the
//! repair filter, is a fatal error; there is no recovery.

use std::collections::HashMap;
use std::io::BufRead;
use std::str;

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// One structural event of the backup document
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupEvent {
    Start { name: String, attributes: HashMap<String, String> },
    End { name: String },
    Text(String),
    Eof,
}

/// Streaming event reader; feed it any `BufRead` (in the pipeline, a
/// [`RepairingReader`](crate::parsers::repair::RepairingReader)) and pull
/// events until [`MarkupEvent::Eof`].
pub struct EventReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// End event still owed after a self-closing element
    pending_end: Option<String>,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);
        Self { reader, buf: Vec::new(), pending_end: None }
    }

    /// Pull the next structural event
    pub fn next_event(&mut self) -> Result<MarkupEvent> {
        if let Some(name) = self.pending_end.take() {
            return Ok(MarkupEvent::End { name });
        }

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf) {
                Err(e) => bail!(
                    "malformed backup document at byte {}: {}",
                    self.reader.buffer_position(),
                    e
                ),
                Ok(Event::Eof) => return Ok(MarkupEvent::Eof),
                Ok(Event::Start(e)) => {
                    let (name, attributes) = read_start(&e)?;
                    return Ok(MarkupEvent::Start { name, attributes });
                }
                Ok(Event::Empty(e)) => {
                    let (name, attributes) = read_start(&e)?;
                    self.pending_end = Some(name.clone());
                    return Ok(MarkupEvent::Start { name, attributes });
                }
                Ok(Event::End(e)) => {
                    let name = str::from_utf8(e.name().as_ref())
                        .context("element name is not valid UTF-8")?
                        .to_string();
                    return Ok(MarkupEvent::End { name });
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().context("invalid text content")?;
                    if text.is_empty() {
                        continue;
                    }
                    return Ok(MarkupEvent::Text(text.into_owned()));
                }
                // declaration, comments, processing instructions, doctype
                Ok(_) => continue,
            }
        }
    }
}

fn read_start(e: &BytesStart<'_>) -> Result<(String, HashMap<String, String>)> {
    let name = str::from_utf8(e.name().as_ref())
        .context("element name is not valid UTF-8")?
        .to_string();
    let mut attributes = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.with_context(|| format!("malformed attribute on <{}>", name))?;
        let key = str::from_utf8(attr.key.as_ref())
            .with_context(|| format!("attribute name on <{}> is not valid UTF-8", name))?
            .to_string();
        let value = attr
            .unescape_value()
            .with_context(|| format!("invalid value for '{}' on <{}>", key, name))?
            .into_owned();
        attributes.insert(key, value);
    }
    Ok((name, attributes))
}
