//! Fatal errors of a `sendemail` run.

use std::io;

/// Result type alias for the command.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that end the run with a fatal exit code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading standard input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Building the envelope or talking to the server failed.
    #[error(transparent)]
    Smtp(#[from] sendemail_smtp::Error),
}
