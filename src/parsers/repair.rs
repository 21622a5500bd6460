//! Repair of split surrogate pairs in backup exports.
//!
//! The backup app writes characters outside the Basic Multilingual Plane
//! (emoji, mostly) as two consecutive decimal character references carrying
//! the raw UTF-16 surrogate halves, e.g. `&#55357;&#56832;` for U+1F600.
//! XML forbids surrogate code points, so any conformant parser rejects the
//! document. This filter rewrites each such pair into the single character
//! it encodes, line by line, before the XML parser ever sees the text.
//!
//! Only pairs whose members actually fall in the UTF-16 high/low surrogate
//! ranges are combined; any other pair of adjacent 5-digit references is
//! legitimate content and passes through untouched.

use std::io::{self, BufRead, Read};

const HIGH_SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u32> = 0xDC00..=0xDFFF;

/// Replace every split surrogate pair in `line` with the character it
/// encodes. All other content, including lone or out-of-range references,
/// is passed through unchanged. Single pass, idempotent on clean input.
pub fn repair_line(line: &str) -> String {
    if !line.contains("&#") {
        return line.to_string();
    }

    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'&' {
            if let Some((high, after_high)) = parse_reference(bytes, i) {
                if HIGH_SURROGATES.contains(&high) {
                    if let Some((low, after_low)) = parse_reference(bytes, after_high) {
                        if LOW_SURROGATES.contains(&low) {
                            out.push(combine_surrogates(high, low));
                            i = after_low;
                            continue;
                        }
                    }
                }
                // a reference, but not the start of a surrogate pair
                out.push_str(&line[i..after_high]);
                i = after_high;
                continue;
            }
        }
        match line[i..].chars().next() {
            Some(c) => {
                out.push(c);
                i += c.len_utf8();
            }
            None => break,
        }
    }
    out
}

/// Match `&#NNNNN;` (exactly five decimal digits) at `start`. Returns the
/// numeric value and the offset just past the `;`.
fn parse_reference(bytes: &[u8], start: usize) -> Option<(u32, usize)> {
    // "&#" + 5 digits + ";"
    let end = start + 8;
    if end > bytes.len() || bytes[start] != b'&' || bytes[start + 1] != b'#' {
        return None;
    }
    let digits = &bytes[start + 2..start + 7];
    if !digits.iter().all(u8::is_ascii_digit) || bytes[start + 7] != b';' {
        return None;
    }
    let mut value: u32 = 0;
    for d in digits {
        value = value * 10 + u32::from(d - b'0');
    }
    Some((value, end))
}

fn combine_surrogates(high: u32, low: u32) -> char {
    let scalar = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
    // both halves are range-checked, so the scalar is a valid char
    char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// `BufRead` adapter that serves an underlying stream line by line with
/// [`repair_line`] applied, so a streaming XML parser can read repaired
/// text without the whole document ever being buffered.
pub struct RepairingReader<R> {
    inner: R,
    line: String,
    buf: Vec<u8>,
    pos: usize,
}

impl<R: BufRead> RepairingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, line: String::new(), buf: Vec::new(), pos: 0 }
    }

    fn refill(&mut self) -> io::Result<()> {
        self.line.clear();
        self.buf.clear();
        self.pos = 0;
        if self.inner.read_line(&mut self.line)? > 0 {
            self.buf.extend_from_slice(repair_line(&self.line).as_bytes());
        }
        Ok(())
    }
}

impl<R: BufRead> Read for RepairingReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let n = {
            let available = self.fill_buf()?;
            let n = available.len().min(out.len());
            out[..n].copy_from_slice(&available[..n]);
            n
        };
        self.consume(n);
        Ok(n)
    }
}

impl<R: BufRead> BufRead for RepairingReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.buf.len() {
            self.refill()?;
        }
        Ok(&self.buf[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buf.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pair_becomes_one_character() {
        // U+1F600 GRINNING FACE = D83D DC00 + 0x200 -> 55357/56832
        let line = r#"<sms body="&#55357;&#56832;" />"#;
        let repaired = repair_line(line);
        assert_eq!(repaired, "<sms body=\"\u{1F600}\" />");
        // sixteen reference characters collapse into one scalar
        assert_eq!(repaired.chars().count(), line.chars().count() - 15);
    }

    #[test]
    fn test_multiple_pairs_in_one_line() {
        let line = "a &#55357;&#56832; b &#55356;&#57167; c";
        assert_eq!(repair_line(line), "a \u{1F600} b \u{1F34F} c");
    }

    #[test]
    fn test_clean_input_is_unchanged() {
        let line = r#"<sms body="plain text, no escapes" date="1586681351000" />"#;
        assert_eq!(repair_line(line), line);
    }

    #[test]
    fn test_idempotent() {
        let line = "before &#55357;&#56834; after";
        let once = repair_line(line);
        assert_eq!(repair_line(&once), once);
    }

    #[test]
    fn test_non_surrogate_pair_passes_through() {
        // both five digits, neither in a surrogate range
        let line = "&#12345;&#23456;";
        assert_eq!(repair_line(line), line);
    }

    #[test]
    fn test_pair_after_non_surrogate_reference_still_matches() {
        let line = "&#12345;&#55357;&#56832;";
        assert_eq!(repair_line(line), "&#12345;\u{1F600}");
    }

    #[test]
    fn test_lone_high_surrogate_is_untouched() {
        let line = "&#55357; and nothing after";
        assert_eq!(repair_line(line), line);
    }

    #[test]
    fn test_short_references_are_untouched() {
        // four-digit and six-digit references never match
        assert_eq!(repair_line("&#1234;&#5678;"), "&#1234;&#5678;");
        assert_eq!(repair_line("&#123456;&#56832;"), "&#123456;&#56832;");
    }

    #[test]
    fn test_truncated_reference_at_end_of_line() {
        assert_eq!(repair_line("tail &#5535"), "tail &#5535");
        assert_eq!(repair_line("tail &#"), "tail &#");
    }

    #[test]
    fn test_multibyte_content_is_preserved() {
        let line = "Grüße aus München &#55357;&#56842;";
        assert_eq!(repair_line(line), "Grüße aus München \u{1F60A}");
    }

    #[test]
    fn test_repairing_reader_streams_repaired_lines() {
        let input = "line one\n<x a=\"&#55357;&#56832;\"/>\nline three";
        let mut reader = RepairingReader::new(input.as_bytes());
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "line one\n<x a=\"\u{1F600}\"/>\nline three");
    }

    #[test]
    fn test_repairing_reader_small_reads() {
        let input = "ab&#55357;&#56832;cd";
        let mut reader = RepairingReader::new(input.as_bytes());
        let mut out = Vec::new();
        let mut chunk = [0u8; 3];
        loop {
            let n = reader.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(String::from_utf8(out).unwrap(), "ab\u{1F600}cd");
    }
}
