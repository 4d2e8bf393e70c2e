//! # sendemail
//!
//! A simple command line SMTP email client: validates its arguments, takes
//! the message body from `--message` or piped standard input, and submits one
//! message through [`sendemail_smtp`].
//!
//! The pipeline is exposed as a library so it can be driven with in-memory
//! streams and a substitute [`Mailer`]:
//!
//! ```no_run
//! use sendemail::{Console, Exit, SmtpMailer, StdinSource, run};
//!
//! # async fn demo() -> sendemail::Result<()> {
//! let mut console = Console::new(StdinSource, std::io::stdout());
//! let args = ["sendemail", "--from", "a@x.com", "--to", "b@x.com", "-m", "hi"];
//! let exit = run(args, &mut console, &SmtpMailer).await?;
//! assert_eq!(exit, Exit::Success);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cli;
mod console;
mod dispatch;
mod error;
mod options;
pub mod trace;

pub use cli::Args;
pub use console::{Console, MessageSource, StdinSource};
pub use dispatch::{EXIT_FATAL, Exit, Mailer, SmtpMailer, execute, run};
pub use error::{Error, Result};
pub use options::{FieldError, Options};
pub use trace::{TraceLevel, Tracer};
