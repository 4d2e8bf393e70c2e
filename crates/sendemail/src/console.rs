//! Standard streams as injectable values.

use std::io::{self, IsTerminal, Read};

/// Where a message body comes from when `--message` is not given.
pub trait MessageSource {
    /// Whether input is piped or redirected rather than a terminal.
    fn is_redirected(&self) -> bool;

    /// Reads everything up to end-of-stream.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    fn read_to_end(&mut self) -> io::Result<String>;
}

/// The process's standard input.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinSource;

impl MessageSource for StdinSource {
    fn is_redirected(&self) -> bool {
        !io::stdin().is_terminal()
    }

    fn read_to_end(&mut self) -> io::Result<String> {
        // Invalid UTF-8 is replaced rather than refused.
        let mut bytes = Vec::new();
        io::stdin().lock().read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Input and output handed to the command.
#[derive(Debug)]
pub struct Console<I, O> {
    /// Body source.
    pub input: I,
    /// Sink for usage messages, help text and trace lines.
    pub output: O,
}

impl<I, O> Console<I, O> {
    /// Bundles the two streams.
    pub const fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}
