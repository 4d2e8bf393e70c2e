//! SMTP connection management with type-state pattern.

mod client;
mod stream;

pub use client::{
    Authenticated, Client, Connected, Data, MailTransaction, Ready, RecipientAdded,
};
pub use stream::{SmtpStream, connect};

use crate::types::{AuthMechanism, Extension};
use std::collections::HashSet;

/// Server capabilities from the greeting and EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from greeting.
    pub hostname: String,
    /// Supported extensions.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.extensions.contains(&Extension::StartTls)
    }

    /// Checks if SMTPUTF8 is supported.
    #[must_use]
    pub fn supports_smtputf8(&self) -> bool {
        self.extensions.contains(&Extension::SmtpUtf8)
    }

    /// Returns the maximum message size, if advertised with a value.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }

    /// Returns the advertised authentication mechanisms the client understands.
    #[must_use]
    pub fn auth_mechanisms(&self) -> &[AuthMechanism] {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Picks PLAIN when offered, LOGIN otherwise.
    #[must_use]
    pub fn preferred_auth(&self) -> Option<AuthMechanism> {
        let offered = self.auth_mechanisms();
        [AuthMechanism::Plain, AuthMechanism::Login]
            .into_iter()
            .find(|mechanism| offered.contains(mechanism))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(lines: &[&str]) -> ServerInfo {
        ServerInfo {
            hostname: "mx.example.com".into(),
            extensions: lines.iter().map(|l| Extension::parse(l)).collect(),
        }
    }

    #[test]
    fn prefers_plain_over_login() {
        assert_eq!(
            info(&["AUTH LOGIN PLAIN"]).preferred_auth(),
            Some(AuthMechanism::Plain)
        );
        assert_eq!(
            info(&["AUTH LOGIN CRAM-MD5"]).preferred_auth(),
            Some(AuthMechanism::Login)
        );
        assert_eq!(info(&["AUTH GSSAPI"]).preferred_auth(), None);
        assert_eq!(info(&["8BITMIME"]).preferred_auth(), None);
    }

    #[test]
    fn size_and_starttls() {
        let server = info(&["STARTTLS", "SIZE 1000"]);
        assert!(server.supports_starttls());
        assert_eq!(server.max_message_size(), Some(1000));
        assert_eq!(info(&["SIZE"]).max_message_size(), None);
        assert!(!server.supports_smtputf8());
        assert!(info(&["SMTPUTF8"]).supports_smtputf8());
    }
}
