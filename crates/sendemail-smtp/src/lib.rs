//! # sendemail-smtp
//!
//! The SMTP submission side of `sendemail`: an envelope model, RFC 5322
//! rendering and a small type-state client that drives one message through
//! EHLO, STARTTLS, AUTH, MAIL/RCPT/DATA and QUIT.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sendemail_smtp::{Envelope, Transport, TransportConfig};
//!
//! # async fn run() -> sendemail_smtp::Result<()> {
//! let mut envelope = Envelope::new("sender@example.com", "Hello, World!")?
//!     .with_subject(Some("Test".into()));
//! envelope.add_to("recipient@example.com")?;
//!
//! let transport = Transport::new(TransportConfig::new("smtp.example.com", 587));
//! transport.send(&envelope).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌──────────────┐
//! │  Connected   │ ─── authenticate() ───→ Authenticated
//! └──────────────┘                                │
//!        │                                        │
//!        └──────────── mail_from() ←──────────────┘
//!                          │
//!                          ↓
//!         MailTransaction ───→ RecipientAdded ───→ Data
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod envelope;
mod error;
pub mod parser;
mod transport;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, Ready, RecipientAdded, ServerInfo,
};
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use transport::{Credentials, DEFAULT_CLIENT_NAME, DEFAULT_TIMEOUT, Transport, TransportConfig};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
