//! Field validation of parsed arguments.

use std::fmt;
use std::time::Duration;

use sendemail_smtp::{Credentials, TransportConfig};

use crate::cli::Args;
use crate::trace::TraceLevel;

/// Validated invocation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Sender address.
    pub from: String,
    /// `To` recipients, in input order.
    pub to: Vec<String>,
    /// `Cc` recipients, in input order.
    pub cc: Vec<String>,
    /// `Bcc` recipients, in input order.
    pub bcc: Vec<String>,
    /// Subject line.
    pub subject: Option<String>,
    /// Explicit message body.
    pub message: Option<String>,
    /// SMTP server host.
    pub host: String,
    /// SMTP server port, never zero.
    pub port: u16,
    /// Login name; blank means anonymous.
    pub username: Option<String>,
    /// Secret paired with `username`.
    pub password: Option<String>,
    /// Trace threshold, if tracing was requested.
    pub trace: Option<TraceLevel>,
    /// Skip STARTTLS.
    pub disable_ssl: bool,
    /// Bound on the SMTP exchange.
    pub timeout: Duration,
}

impl Options {
    /// Whether any of To, Cc or Bcc is non-empty.
    #[must_use]
    pub fn has_receiver(&self) -> bool {
        !(self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty())
    }

    /// Credentials to authenticate with, present only for a non-blank username.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        let username = self.username.as_deref().filter(|u| !u.trim().is_empty())?;
        Some(Credentials::new(
            username,
            self.password.as_deref().unwrap_or_default(),
        ))
    }

    /// Transport settings derived from host, port, TLS flag, credentials and timeout.
    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(self.host.clone(), self.port)
            .with_tls(!self.disable_ssl)
            .with_credentials(self.credentials())
            .with_timeout(self.timeout)
    }
}

/// A rejected option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// `--from` is absent or blank.
    MissingSender,
    /// An address option does not look like an email address.
    InvalidAddress {
        /// Long option name without dashes.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
    /// `--port` is zero.
    InvalidPort,
    /// `--timeout` is zero.
    InvalidTimeout,
}

impl FieldError {
    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MissingSender => "The --from field is required.".to_string(),
            Self::InvalidAddress { field, value } => {
                format!("The --{field} field is not a valid e-mail address: '{value}'.")
            }
            Self::InvalidPort => "The --port field must be between 1 and 65535.".to_string(),
            Self::InvalidTimeout => "The --timeout field must be at least 1 second.".to_string(),
        }
    }

    /// Option this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingSender => "from",
            Self::InvalidAddress { field, .. } => *field,
            Self::InvalidPort => "port",
            Self::InvalidTimeout => "timeout",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for FieldError {}

impl Args {
    /// Checks every field and collects all failures.
    ///
    /// # Errors
    ///
    /// Returns every [`FieldError`] found, in option order.
    pub fn validate(self) -> Result<Options, Vec<FieldError>> {
        let mut errors = Vec::new();

        match self.from.as_deref() {
            None => errors.push(FieldError::MissingSender),
            Some(from) if from.trim().is_empty() => errors.push(FieldError::MissingSender),
            Some(from) => check_address(&mut errors, "from", from),
        }
        for (field, values) in [("to", &self.to), ("cc", &self.cc), ("bcc", &self.bcc)] {
            for value in values {
                check_address(&mut errors, field, value);
            }
        }
        if self.port == 0 {
            errors.push(FieldError::InvalidPort);
        }
        if self.timeout == 0 {
            errors.push(FieldError::InvalidTimeout);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Options {
            from: self.from.unwrap_or_default(),
            to: self.to,
            cc: self.cc,
            bcc: self.bcc,
            subject: self.subject,
            message: self.message,
            host: self.host,
            port: self.port,
            username: self.username,
            password: self.password,
            trace: self.trace,
            disable_ssl: self.disable_ssl,
            timeout: Duration::from_secs(self.timeout),
        })
    }
}

fn check_address(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if !looks_like_email(value) {
        errors.push(FieldError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// Lax syntactic check: exactly one `@`, with something on either side.
///
/// Stricter checks happen when the envelope is built.
fn looks_like_email(value: &str) -> bool {
    let mut parts = value.split('@');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
    )
}
