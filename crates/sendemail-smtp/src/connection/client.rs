//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Type-state marker for connected state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker for mail transaction started.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker for recipient added.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker for data mode.
#[derive(Debug)]
pub struct Data;

/// States from which `MAIL FROM` may be issued.
pub trait Ready {}

impl Ready for Connected {}
impl Ready for Authenticated {}

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

impl<S> Client<S> {
    /// Returns what the server advertised in its last EHLO reply.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    fn into_state<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        }
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        debug!(command = %cmd, "smtp >>");
        self.stream.write_all(&cmd.serialize()).await?;
        read_reply(&mut self.stream).await
    }

    /// Sends `cmd` and requires a 2xx reply.
    async fn expect_success(&mut self, cmd: Command) -> Result<Reply> {
        let reply = self.send_command(cmd).await?;
        if reply.is_success() {
            Ok(reply)
        } else {
            Err(Error::smtp_error(reply.code.as_u16(), reply.text()))
        }
    }

    /// Sends `cmd` and requires exactly `expected` (used for 334 and 354).
    async fn expect_code(&mut self, cmd: Command, expected: ReplyCode) -> Result<Reply> {
        let reply = self.send_command(cmd).await?;
        if reply.code == expected {
            Ok(reply)
        } else {
            Err(Error::smtp_error(reply.code.as_u16(), reply.text()))
        }
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        self.expect_success(Command::Quit).await.map(|_| ())
    }
}

impl Client<Connected> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if the server refuses service.
    pub async fn from_stream(mut stream: SmtpStream) -> Result<Self> {
        let greeting = read_reply(&mut stream).await?;
        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(Error::smtp_error(greeting.code.as_u16(), greeting.text()));
        }

        let hostname = greeting
            .lines
            .first()
            .and_then(|line| line.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                ..ServerInfo::default()
            },
            _state: PhantomData,
        })
    }

    /// Sends EHLO and records the advertised extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let reply = self
            .expect_success(Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?;

        // First line is the server's greeting, the rest are keywords.
        self.server_info.extensions = reply
            .lines
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS and repeats EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not advertised or if the upgrade fails.
    pub async fn starttls(mut self, server_hostname: &str, client_hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.expect_success(Command::StartTls).await?;
        self.stream = self.stream.upgrade_to_tls(server_hostname).await?;
        debug!(server = server_hostname, "TLS established");

        // Capabilities from before the handshake must not be trusted.
        self.server_info.extensions.clear();
        self.ehlo(client_hostname).await
    }

    /// Authenticates with the given mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the credentials.
    pub async fn authenticate(
        mut self,
        mechanism: AuthMechanism,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        match mechanism {
            AuthMechanism::Plain => {
                let token = STANDARD.encode(format!("\0{username}\0{password}"));
                self.expect_success(Command::Auth {
                    mechanism,
                    initial_response: Some(token),
                })
                .await?;
            }
            AuthMechanism::Login => {
                let start = Command::Auth {
                    mechanism,
                    initial_response: None,
                };
                self.expect_code(start, ReplyCode::AUTH_CONTINUE).await?;
                self.expect_code(
                    Command::AuthResponse(STANDARD.encode(username)),
                    ReplyCode::AUTH_CONTINUE,
                )
                .await?;
                self.expect_success(Command::AuthResponse(STANDARD.encode(password)))
                    .await?;
            }
        }

        Ok(self.into_state())
    }
}

impl<S: Ready> Client<S> {
    /// Starts a mail transaction.
    ///
    /// `smtputf8` must only be set when the server advertised SMTPUTF8.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(
        mut self,
        from: Address,
        size: Option<usize>,
        smtputf8: bool,
    ) -> Result<Client<MailTransaction>> {
        self.expect_success(Command::MailFrom {
            from,
            size,
            smtputf8,
        })
        .await?;
        Ok(self.into_state())
    }
}

impl Client<MailTransaction> {
    /// Adds the first recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Client<RecipientAdded>> {
        self.expect_success(Command::RcptTo { to }).await?;
        Ok(self.into_state())
    }
}

impl Client<RecipientAdded> {
    /// Adds another recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Self> {
        self.expect_success(Command::RcptTo { to }).await?;
        Ok(self)
    }

    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not answer DATA with 354.
    pub async fn data(mut self) -> Result<Client<Data>> {
        self.expect_code(Command::Data, ReplyCode::START_DATA).await?;
        Ok(self.into_state())
    }
}

impl Client<Data> {
    /// Sends the message content and completes the transaction.
    ///
    /// Line endings are normalized to CRLF, lines starting with `.` are
    /// dot-stuffed and the terminating `.` line is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if sending the message fails or the server rejects it.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Connected>> {
        self.stream.write_all(&encode_data(message)).await?;

        let reply = read_reply(&mut self.stream).await?;
        if !reply.is_success() {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.text()));
        }

        Ok(self.into_state())
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        let is_last = is_last_reply_line(&line);
        lines.push(line);
        if is_last {
            break;
        }
    }

    let reply = parse_reply(&lines)?;
    trace!(code = %reply.code, "smtp <<");
    Ok(reply)
}

/// Encodes a message for the DATA phase, terminator included.
pub(crate) fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + message.len() / 64 + 5);

    if !message.is_empty() {
        // A trailing newline ends the last line rather than starting an empty one.
        let body = message.strip_suffix(b"\n").unwrap_or(message);
        for line in body.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.first() == Some(&b'.') {
                out.push(b'.');
            }
            out.extend_from_slice(line);
            out.extend_from_slice(b"\r\n");
        }
    }

    out.extend_from_slice(b".\r\n");
    out
}
