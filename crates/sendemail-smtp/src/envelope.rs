//! Outgoing message model and RFC 5322 rendering.

use std::fmt::Write as _;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, FixedOffset};

use crate::error::Result;
use crate::types::Address;

/// Longest line SMTP guarantees to carry, CRLF excluded (RFC 5321 §4.5.3.1.6).
const MAX_LINE_OCTETS: usize = 998;

/// Base64 body lines are wrapped at this width (RFC 2045 §6.8).
const BASE64_LINE_WIDTH: usize = 76;

/// A single outgoing email: sender, recipients, subject and plain-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    from: Address,
    to: Vec<Address>,
    cc: Vec<Address>,
    bcc: Vec<Address>,
    subject: Option<String>,
    body: String,
}

impl Envelope {
    /// Creates an envelope with no recipients.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is not a valid address.
    pub fn new(from: &str, body: impl Into<String>) -> Result<Self> {
        Ok(Self {
            from: Address::new(from)?,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: None,
            body: body.into(),
        })
    }

    /// Sets the subject line.
    #[must_use]
    pub fn with_subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject;
        self
    }

    /// Appends a `To` recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if `address` is not a valid address.
    pub fn add_to(&mut self, address: &str) -> Result<()> {
        self.to.push(Address::new(address)?);
        Ok(())
    }

    /// Appends a `Cc` recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if `address` is not a valid address.
    pub fn add_cc(&mut self, address: &str) -> Result<()> {
        self.cc.push(Address::new(address)?);
        Ok(())
    }

    /// Appends a `Bcc` recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if `address` is not a valid address.
    pub fn add_bcc(&mut self, address: &str) -> Result<()> {
        self.bcc.push(Address::new(address)?);
        Ok(())
    }

    /// Sender address.
    #[must_use]
    pub const fn from(&self) -> &Address {
        &self.from
    }

    /// `To` recipients in insertion order.
    #[must_use]
    pub fn to(&self) -> &[Address] {
        &self.to
    }

    /// `Cc` recipients in insertion order.
    #[must_use]
    pub fn cc(&self) -> &[Address] {
        &self.cc
    }

    /// `Bcc` recipients in insertion order.
    #[must_use]
    pub fn bcc(&self) -> &[Address] {
        &self.bcc
    }

    /// Subject line, if any.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Plain-text body as supplied.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Every envelope recipient: `To`, then `Cc`, then `Bcc`, duplicates kept.
    pub fn recipients(&self) -> impl Iterator<Item = &Address> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }

    /// Number of envelope recipients.
    #[must_use]
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    /// Whether any envelope address is non-ASCII.
    #[must_use]
    pub fn needs_smtputf8(&self) -> bool {
        !(self.from.is_ascii() && self.recipients().all(Address::is_ascii))
    }

    /// Renders the message as sent after DATA. `Bcc` is never written.
    #[must_use]
    pub fn to_rfc5322(&self, date: DateTime<FixedOffset>) -> String {
        let mut message = String::with_capacity(self.body.len() + 512);

        let _ = write!(message, "Date: {}\r\n", date.to_rfc2822());
        let _ = write!(message, "From: {}\r\n", self.from);
        if !self.to.is_empty() {
            let _ = write!(message, "To: {}\r\n", join(&self.to));
        }
        if !self.cc.is_empty() {
            let _ = write!(message, "Cc: {}\r\n", join(&self.cc));
        }
        if let Some(subject) = &self.subject {
            let _ = write!(message, "Subject: {}\r\n", encode_header(subject));
        }
        let _ = write!(
            message,
            "Message-ID: <{}.{}@{}>\r\n",
            date.timestamp_micros(),
            std::process::id(),
            self.from.domain()
        );
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/plain; charset=utf-8\r\n");

        if is_7bit_safe(&self.body) {
            message.push_str("Content-Transfer-Encoding: 7bit\r\n\r\n");
            message.push_str(&self.body);
        } else {
            message.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
            let encoded = STANDARD.encode(self.body.as_bytes());
            for chunk in encoded.as_bytes().chunks(BASE64_LINE_WIDTH) {
                // base64 output is ASCII, so every chunk is valid UTF-8.
                message.push_str(std::str::from_utf8(chunk).unwrap_or_default());
                message.push_str("\r\n");
            }
        }

        message
    }
}

fn join(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(Address::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_7bit_safe(body: &str) -> bool {
    body.is_ascii() && body.split('\n').all(|line| line.len() <= MAX_LINE_OCTETS)
}

/// RFC 2047 B-encodes header text that is not plain ASCII. Line breaks are
/// flattened so a value can never start a new header.
fn encode_header(value: &str) -> String {
    let flat = value.replace(['\r', '\n'], " ");
    if flat.is_ascii() && !flat.contains("=?") {
        flat
    } else {
        format!("=?utf-8?B?{}?=", STANDARD.encode(flat.as_bytes()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 12, 30, 0)
            .unwrap()
    }

    fn envelope(body: &str) -> Envelope {
        let mut envelope = Envelope::new("a@x.com", body)
            .unwrap()
            .with_subject(Some("Hi".into()));
        envelope.add_to("b@x.com").unwrap();
        envelope
    }

    #[test]
    fn recipients_are_ordered_to_cc_bcc() {
        let mut envelope = envelope("hello");
        envelope.add_bcc("z@x.com").unwrap();
        envelope.add_cc("c@x.com").unwrap();
        envelope.add_to("b@x.com").unwrap();

        let all: Vec<&str> = envelope.recipients().map(Address::as_str).collect();
        assert_eq!(all, vec!["b@x.com", "b@x.com", "c@x.com", "z@x.com"]);
        assert_eq!(envelope.recipient_count(), 4);
    }

    #[test]
    fn non_ascii_address_needs_smtputf8() {
        let mut envelope = envelope("hello");
        assert!(!envelope.needs_smtputf8());
        envelope.add_bcc("jörg@x.com").unwrap();
        assert!(envelope.needs_smtputf8());
    }

    #[test]
    fn add_rejects_bad_address() {
        let mut envelope = envelope("hello");
        assert!(envelope.add_cc("not-an-address").is_err());
        assert!(envelope.cc().is_empty());
    }

    #[test]
    fn renders_headers_and_body() {
        let mut envelope = envelope("hello");
        envelope.add_cc("c@x.com").unwrap();
        envelope.add_bcc("secret@x.com").unwrap();

        let rendered = envelope.to_rfc5322(date());
        assert!(rendered.starts_with(&format!("Date: {}\r\n", date().to_rfc2822())));
        assert!(rendered.contains("From: a@x.com\r\n"));
        assert!(rendered.contains("To: b@x.com\r\n"));
        assert!(rendered.contains("Cc: c@x.com\r\n"));
        assert!(rendered.contains("Subject: Hi\r\n"));
        assert!(rendered.contains("@x.com>\r\n"));
        assert!(rendered.contains("Content-Transfer-Encoding: 7bit\r\n"));
        assert!(!rendered.contains("secret@x.com"));
        assert!(rendered.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn omits_missing_subject() {
        let mut envelope = Envelope::new("a@x.com", "x").unwrap();
        envelope.add_bcc("b@x.com").unwrap();
        let rendered = envelope.to_rfc5322(date());
        assert!(!rendered.contains("Subject:"));
        assert!(!rendered.contains("To:"));
    }

    #[test]
    fn non_ascii_is_encoded() {
        let envelope = envelope("grüße").with_subject(Some("Grüße".into()));
        let rendered = envelope.to_rfc5322(date());
        assert!(rendered.contains("Subject: =?utf-8?B?R3LDvMOfZQ==?=\r\n"));
        assert!(rendered.contains("Content-Transfer-Encoding: base64\r\n"));
        assert!(rendered.ends_with("\r\n\r\nZ3LDvMOfZQ==\r\n"));
    }

    #[test]
    fn long_lines_force_base64() {
        let rendered = envelope(&"x".repeat(1200)).to_rfc5322(date());
        assert!(rendered.contains("Content-Transfer-Encoding: base64\r\n"));
        assert!(rendered.lines().all(|line| line.len() <= 78));
    }

    #[test]
    fn subject_cannot_inject_headers() {
        let envelope = envelope("x").with_subject(Some("Hi\r\nBcc: evil@x.com".into()));
        let rendered = envelope.to_rfc5322(date());
        assert!(rendered.contains("Subject: Hi  Bcc: evil@x.com\r\n"));
        assert!(!rendered.contains("\r\nBcc:"));
    }
}
