//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fmt::Write as _;
use std::io::Write;

use tempfile::NamedTempFile;

/// Builder for SMS Backup & Restore XML fixture files
pub struct BackupFileBuilder {
    body: String,
}

impl BackupFileBuilder {
    pub fn new() -> Self {
        Self { body: String::new() }
    }

    /// Append an `<sms>` element
    pub fn with_sms(mut self, sms: SmsBuilder) -> Self {
        self.body.push_str(&sms.to_xml());
        self.body.push('\n');
        self
    }

    /// Append an `<mms>` element
    pub fn with_mms(mut self, mms: MmsBuilder) -> Self {
        self.body.push_str(&mms.to_xml());
        self.body.push('\n');
        self
    }

    /// Append raw markup verbatim
    pub fn with_raw(mut self, markup: &str) -> Self {
        self.body.push_str(markup);
        self.body.push('\n');
        self
    }

    /// Write the document to a temp file and return it
    pub fn build(self) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>"#)
            .expect("Failed to write declaration");
        writeln!(file, r#"<smses count="0" backup_set="test">"#).expect("Failed to write root");
        file.write_all(self.body.as_bytes()).expect("Failed to write messages");
        writeln!(file, "</smses>").expect("Failed to close root");
        file.flush().expect("Failed to flush temp file");
        file
    }
}

impl Default for BackupFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `<sms>` elements
pub struct SmsBuilder {
    address: String,
    date: i64,
    direction_code: u8,
    body: String,
    contact_name: String,
    readable_date: Option<String>,
}

impl SmsBuilder {
    pub fn new() -> Self {
        Self {
            address: "+4915112345678".to_string(),
            date: 1586681351000,
            direction_code: 1,
            body: "Test message".to_string(),
            contact_name: "Alice".to_string(),
            readable_date: Some("12.04.2020 10:09:11".to_string()),
        }
    }

    pub fn address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn date(mut self, date: i64) -> Self {
        self.date = date;
        self
    }

    pub fn direction_code(mut self, code: u8) -> Self {
        self.direction_code = code;
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn contact(mut self, contact_name: &str) -> Self {
        self.contact_name = contact_name.to_string();
        self
    }

    pub fn no_readable_date(mut self) -> Self {
        self.readable_date = None;
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<sms protocol="0" address="{}" date="{}" type="{}" subject="null" body="{}" read="1" status="-1""#,
            self.address, self.date, self.direction_code, self.body
        );
        if let Some(readable) = &self.readable_date {
            write!(xml, r#" readable_date="{}""#, readable).unwrap();
        }
        write!(xml, r#" contact_name="{}" />"#, self.contact_name).unwrap();
        xml
    }
}

impl Default for SmsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `<mms>` elements with nested parts and addrs
pub struct MmsBuilder {
    address: String,
    date: i64,
    msg_box: u8,
    contact_name: String,
    parts: Vec<String>,
    addrs: Vec<String>,
}

impl MmsBuilder {
    pub fn new() -> Self {
        Self {
            address: "+4915112345678".to_string(),
            date: 1586681351000,
            msg_box: 1,
            contact_name: "Alice".to_string(),
            parts: Vec::new(),
            addrs: Vec::new(),
        }
    }

    pub fn address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn date(mut self, date: i64) -> Self {
        self.date = date;
        self
    }

    pub fn msg_box(mut self, msg_box: u8) -> Self {
        self.msg_box = msg_box;
        self
    }

    pub fn contact(mut self, contact_name: &str) -> Self {
        self.contact_name = contact_name.to_string();
        self
    }

    /// Add the smil header part real backups put first
    pub fn with_smil_part(mut self) -> Self {
        self.parts.push(
            r#"<part seq="-1" ct="application/smil" name="smil.xml" text="&lt;smil&gt;&lt;/smil&gt;" />"#
                .to_string(),
        );
        self
    }

    pub fn with_text_part(mut self, text: &str) -> Self {
        self.parts.push(format!(r#"<part seq="0" ct="text/plain" name="null" text="{}" />"#, text));
        self
    }

    pub fn with_data_part(mut self, content_type: &str, name: &str, data: &str) -> Self {
        self.parts.push(format!(
            r#"<part seq="1" ct="{}" name="{}" text="null" data="{}" />"#,
            content_type, name, data
        ));
        self
    }

    pub fn with_addr(mut self, address: &str, role_code: u16) -> Self {
        self.addrs.push(format!(
            r#"<addr address="{}" type="{}" charset="106" />"#,
            address, role_code
        ));
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<mms date="{}" msg_box="{}" address="{}" contact_name="{}">"#,
            self.date, self.msg_box, self.address, self.contact_name
        );
        xml.push_str("<parts>");
        for part in &self.parts {
            xml.push_str(part);
        }
        xml.push_str("</parts>");
        if !self.addrs.is_empty() {
            xml.push_str("<addrs>");
            for addr in &self.addrs {
                xml.push_str(addr);
            }
            xml.push_str("</addrs>");
        }
        xml.push_str("</mms>");
        xml
    }
}

impl Default for MmsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
