//! User-facing `--trace` lines.
//!
//! These are part of the command's output, not diagnostics: they go to the
//! same sink as usage messages, formatted as `<LEVEL>: <message>` with the
//! level right-aligned to seven columns.

use std::fmt;
use std::io::{self, Write};

use clap::ValueEnum;

/// Verbosity of trace lines, ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum TraceLevel {
    /// Milestones only.
    Info,
    /// Every step.
    Verbose,
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Info => "Info",
            Self::Verbose => "Verbose",
        })
    }
}

/// Writes trace lines at or below the configured threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tracer {
    threshold: Option<TraceLevel>,
}

impl Tracer {
    /// `None` disables tracing entirely.
    #[must_use]
    pub const fn new(threshold: Option<TraceLevel>) -> Self {
        Self { threshold }
    }

    /// Whether a line tagged `level` would be written.
    #[must_use]
    pub fn enabled(&self, level: TraceLevel) -> bool {
        self.threshold.is_some_and(|threshold| threshold >= level)
    }

    /// Writes `message` if `level` passes the threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn emit<W: Write>(
        &self,
        out: &mut W,
        level: TraceLevel,
        message: fmt::Arguments<'_>,
    ) -> io::Result<()> {
        if self.enabled(level) {
            writeln!(out, "{level:>7}: {message}")?;
        }
        Ok(())
    }
}
