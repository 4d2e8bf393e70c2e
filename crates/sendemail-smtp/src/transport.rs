//! One-shot message submission over SMTP.

use std::fmt;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::connection::{Client, Ready, connect};
use crate::envelope::Envelope;
use crate::error::{Error, Result};

/// How long a whole exchange may take before it is abandoned.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Name announced in EHLO unless configured otherwise.
pub const DEFAULT_CLIENT_NAME: &str = "localhost";

/// Username/password pair for SMTP AUTH.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The secret.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where and how to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Server host name or IP literal.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Require STARTTLS before anything else is sent.
    pub enable_tls: bool,
    /// Authenticate when present.
    pub credentials: Option<Credentials>,
    /// Upper bound on the whole exchange.
    pub timeout: Duration,
    /// Name announced in EHLO.
    pub client_name: String,
}

impl TransportConfig {
    /// TLS on, no credentials, default timeout.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            enable_tls: true,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }

    /// Enables or disables STARTTLS.
    #[must_use]
    pub const fn with_tls(mut self, enable_tls: bool) -> Self {
        self.enable_tls = enable_tls;
        self
    }

    /// Sets or clears the credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the exchange timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Sends envelopes to a single server, one connection per message.
#[derive(Debug, Clone)]
pub struct Transport {
    config: TransportConfig,
}

impl Transport {
    /// Creates a transport; nothing is connected until [`Transport::send`].
    #[must_use]
    pub const fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Connects, submits `envelope` and disconnects.
    ///
    /// # Errors
    ///
    /// Returns an error on connection, TLS, authentication or SMTP failure, and
    /// [`Error::Timeout`] when the exchange outlives the configured bound.
    pub async fn send(&self, envelope: &Envelope) -> Result<()> {
        let limit = self.config.timeout;
        tokio::time::timeout(limit, self.exchange(envelope))
            .await
            .map_err(|_| Error::Timeout(limit))?
    }

    async fn exchange(&self, envelope: &Envelope) -> Result<()> {
        if envelope.recipient_count() == 0 {
            return Err(Error::NoRecipients);
        }

        let TransportConfig {
            host,
            port,
            enable_tls,
            client_name,
            ..
        } = &self.config;

        info!(%host, port, tls = enable_tls, "connecting to SMTP server");
        let stream = connect(host, *port).await?;
        let client = Client::from_stream(stream).await?;
        debug!(server = %client.server_info().hostname, "greeting received");

        let mut client = client.ehlo(client_name).await?;
        if *enable_tls {
            client = client.starttls(host, client_name).await?;
        }

        let message = envelope.to_rfc5322(Local::now().fixed_offset());
        let size = match client.server_info().max_message_size() {
            // SIZE 0 means the server declares no fixed maximum.
            Some(limit) if limit > 0 && message.len() > limit => {
                return Err(Error::MessageTooLarge {
                    size: message.len(),
                    limit,
                });
            }
            Some(_) => Some(message.len()),
            None => None,
        };

        let smtputf8 = envelope.needs_smtputf8();
        if smtputf8 && !client.server_info().supports_smtputf8() {
            return Err(Error::NotSupported("SMTPUTF8".into()));
        }

        match &self.config.credentials {
            Some(credentials) => {
                let mechanism = client
                    .server_info()
                    .preferred_auth()
                    .ok_or_else(|| Error::NotSupported("AUTH PLAIN or AUTH LOGIN".into()))?;
                debug!(mechanism = mechanism.as_str(), "authenticating");
                let client = client
                    .authenticate(mechanism, credentials.username(), credentials.password())
                    .await?;
                deliver(client, envelope, &message, size, smtputf8).await
            }
            None => deliver(client, envelope, &message, size, smtputf8).await,
        }
    }
}

async fn deliver<S: Ready>(
    client: Client<S>,
    envelope: &Envelope,
    message: &str,
    size: Option<usize>,
    smtputf8: bool,
) -> Result<()> {
    let client = client
        .mail_from(envelope.from().clone(), size, smtputf8)
        .await?;

    let mut recipients = envelope.recipients().cloned();
    let first = recipients.next().ok_or(Error::NoRecipients)?;
    let mut client = client.rcpt_to(first).await?;
    for recipient in recipients {
        client = client.rcpt_to(recipient).await?;
    }

    let client = client.data().await?.send_message(message.as_bytes()).await?;
    info!(
        recipients = envelope.recipient_count(),
        bytes = message.len(),
        "message accepted"
    );

    // The server already took responsibility for the message.
    if let Err(err) = client.quit().await {
        warn!(error = %err, "QUIT failed after delivery");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TransportConfig::new("localhost", 25);
        assert!(config.enable_tls);
        assert!(config.credentials.is_none());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.client_name, "localhost");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials::new("me", "hunter2");
        let printed = format!("{credentials:?}");
        assert!(printed.contains("me"));
        assert!(!printed.contains("hunter2"));
    }
}
