//! SMTP command builder.

use std::fmt::{self, Write as _};

use crate::types::{Address, AuthMechanism};

/// SMTP command issued by the client.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - Extended greeting
    Ehlo {
        /// Client hostname
        hostname: String,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// AUTH - Begin authentication
    Auth {
        /// Authentication mechanism
        mechanism: AuthMechanism,
        /// Initial response (SASL-IR), already base64-encoded
        initial_response: Option<String>,
    },
    /// Answer to a 334 challenge, already base64-encoded
    AuthResponse(String),
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address
        from: Address,
        /// SIZE parameter, sent only when the server advertises SIZE
        size: Option<usize>,
        /// Announce non-ASCII addresses (RFC 6531)
        smtputf8: bool,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address
        to: Address,
    },
    /// DATA - Begin message data
    Data,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Serializes the command, CRLF included.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        format!("{}\r\n", self.line(false)).into_bytes()
    }

    fn line(&self, redact: bool) -> String {
        let secret = |s: &str| if redact { "<redacted>".to_string() } else { s.to_string() };
        match self {
            Self::Ehlo { hostname } => format!("EHLO {hostname}"),
            Self::StartTls => "STARTTLS".to_string(),
            Self::Auth {
                mechanism,
                initial_response: Some(resp),
            } => format!("AUTH {} {}", mechanism.as_str(), secret(resp)),
            Self::Auth {
                mechanism,
                initial_response: None,
            } => format!("AUTH {}", mechanism.as_str()),
            Self::AuthResponse(resp) => secret(resp),
            Self::MailFrom {
                from,
                size,
                smtputf8,
            } => {
                let mut line = format!("MAIL FROM:<{from}>");
                if let Some(size) = size {
                    let _ = write!(line, " SIZE={size}");
                }
                if *smtputf8 {
                    line.push_str(" SMTPUTF8");
                }
                line
            }
            Self::RcptTo { to } => format!("RCPT TO:<{to}>"),
            Self::Data => "DATA".to_string(),
            Self::Quit => "QUIT".to_string(),
        }
    }
}

/// Logs and debug output never carry credentials.
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line(true))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line(true))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ehlo_command() {
        let cmd = Command::Ehlo {
            hostname: "client.example.com".to_string(),
        };
        assert_eq!(cmd.serialize(), b"EHLO client.example.com\r\n");
    }

    #[test]
    fn test_auth_plain() {
        let cmd = Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some("AHVzZXIAcGFzcw==".to_string()),
        };
        assert_eq!(cmd.serialize(), b"AUTH PLAIN AHVzZXIAcGFzcw==\r\n");
        assert_eq!(cmd.to_string(), "AUTH PLAIN <redacted>");
    }

    #[test]
    fn test_auth_login_exchange() {
        let start = Command::Auth {
            mechanism: AuthMechanism::Login,
            initial_response: None,
        };
        assert_eq!(start.serialize(), b"AUTH LOGIN\r\n");

        let answer = Command::AuthResponse("dXNlcg==".to_string());
        assert_eq!(answer.serialize(), b"dXNlcg==\r\n");
        assert_eq!(format!("{answer:?}"), "<redacted>");
    }

    #[test]
    fn test_mail_from() {
        let from = Address::new("sender@example.com").unwrap();
        let plain = Command::MailFrom {
            from: from.clone(),
            size: None,
            smtputf8: false,
        };
        assert_eq!(plain.serialize(), b"MAIL FROM:<sender@example.com>\r\n");

        let sized = Command::MailFrom {
            from: from.clone(),
            size: Some(12345),
            smtputf8: false,
        };
        assert_eq!(
            sized.serialize(),
            b"MAIL FROM:<sender@example.com> SIZE=12345\r\n"
        );

        let utf8 = Command::MailFrom {
            from,
            size: Some(7),
            smtputf8: true,
        };
        assert_eq!(
            utf8.serialize(),
            b"MAIL FROM:<sender@example.com> SIZE=7 SMTPUTF8\r\n"
        );
    }

    #[test]
    fn test_simple_commands() {
        let to = Address::new("recipient@example.com").unwrap();
        assert_eq!(
            Command::RcptTo { to }.serialize(),
            b"RCPT TO:<recipient@example.com>\r\n"
        );
        assert_eq!(Command::StartTls.serialize(), b"STARTTLS\r\n");
        assert_eq!(Command::Data.serialize(), b"DATA\r\n");
        assert_eq!(Command::Quit.serialize(), b"QUIT\r\n");
    }
}
