//! Validation, body resolution and submission of one message.

use std::ffi::OsString;
use std::future::Future;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use sendemail_smtp::{Envelope, Transport, TransportConfig};
use tracing::debug;

use crate::cli::{self, Args};
use crate::console::{Console, MessageSource};
use crate::error::Result;
use crate::options::Options;
use crate::trace::{TraceLevel, Tracer};

/// Exit code for failures that are not the caller's fault.
pub const EXIT_FATAL: u8 = 2;

/// How a run ended without a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The message was sent, or help/version was shown.
    Success,
    /// The invocation was rejected.
    Usage,
}

impl Exit {
    /// Process exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Usage => 1,
        }
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        Self::from(exit.code())
    }
}

/// Submits a finished envelope.
pub trait Mailer {
    /// Sends `envelope` using `config`.
    fn send(
        &self,
        config: &TransportConfig,
        envelope: &Envelope,
    ) -> impl Future<Output = sendemail_smtp::Result<()>>;
}

/// Sends over a fresh SMTP connection per message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpMailer;

impl Mailer for SmtpMailer {
    async fn send(
        &self,
        config: &TransportConfig,
        envelope: &Envelope,
    ) -> sendemail_smtp::Result<()> {
        Transport::new(config.clone()).send(envelope).await
    }
}

/// Parses `args`, validates them and runs [`execute`].
///
/// Help, version, parse errors and field errors are written to the console
/// output and reported through [`Exit`].
///
/// # Errors
///
/// Returns an error if writing output fails or [`execute`] fails.
pub async fn run<A, T, I, O, M>(args: A, console: &mut Console<I, O>, mailer: &M) -> Result<Exit>
where
    A: IntoIterator<Item = T>,
    T: Into<OsString>,
    I: MessageSource,
    O: Write,
    M: Mailer,
{
    let args = match Args::try_parse_from(cli::normalize_args(args)) {
        Ok(args) => args,
        Err(err) => {
            write!(console.output, "{}", err.render())?;
            return Ok(match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Exit::Success,
                _ => Exit::Usage,
            });
        }
    };

    let options = match args.validate() {
        Ok(options) => options,
        Err(errors) => {
            for error in &errors {
                writeln!(console.output, "{error}")?;
            }
            writeln!(
                console.output,
                "Specify --help for a list of available options and commands."
            )?;
            return Ok(Exit::Usage);
        }
    };

    execute(&options, console, mailer).await
}

/// Resolves the body, builds the envelope and hands it to `mailer`.
///
/// # Errors
///
/// Returns an error if standard input cannot be read, an address is rejected
/// while building the envelope, or sending fails.
pub async fn execute<I, O, M>(
    options: &Options,
    console: &mut Console<I, O>,
    mailer: &M,
) -> Result<Exit>
where
    I: MessageSource,
    O: Write,
    M: Mailer,
{
    let tracer = Tracer::new(options.trace);
    let out = &mut console.output;
    let input = &mut console.input;

    tracer.emit(
        out,
        TraceLevel::Verbose,
        format_args!("Starting sendemail. Validating receiver..."),
    )?;
    if !options.has_receiver() {
        writeln!(out, "Specify at least one receiver using --to, --cc, or --bcc.")?;
        show_help(out)?;
        return Ok(Exit::Usage);
    }

    let mut body = options.message.clone().unwrap_or_default();
    let mut source = "--message";
    if body.is_empty() && input.is_redirected() {
        source = "stdin";
        tracer.emit(
            out,
            TraceLevel::Info,
            format_args!("Message sourced from STDIN pipeline."),
        )?;
        tracer.emit(
            out,
            TraceLevel::Verbose,
            format_args!("Specify --message to supply the message instead. Opening stream..."),
        )?;
        tracer.emit(out, TraceLevel::Verbose, format_args!("Stream opened..."))?;
        body = input.read_to_end()?;
        tracer.emit(out, TraceLevel::Verbose, format_args!("Stream closed."))?;
    }

    debug!(source, bytes = body.len(), "message body resolved");

    tracer.emit(out, TraceLevel::Verbose, format_args!("Validating message..."))?;
    if body.is_empty() {
        writeln!(out, "Message body required from either STDIN or --message.")?;
        show_help(out)?;
        return Ok(Exit::Usage);
    }

    tracer.emit(out, TraceLevel::Verbose, format_args!("Creating SMTP transport..."))?;
    let config = options.transport_config();
    debug!(
        host = %config.host,
        port = config.port,
        tls = config.enable_tls,
        auth = config.credentials.is_some(),
        timeout = ?config.timeout,
        "transport configured"
    );
    if config.credentials.is_some() {
        tracer.emit(out, TraceLevel::Verbose, format_args!("Using network credentials..."))?;
    } else if options.password.is_some() {
        tracer.emit(
            out,
            TraceLevel::Verbose,
            format_args!("Ignoring --password without --username..."),
        )?;
    }

    tracer.emit(out, TraceLevel::Verbose, format_args!("Creating mail message..."))?;
    let mut envelope = Envelope::new(&options.from, body)?.with_subject(options.subject.clone());
    for to in &options.to {
        tracer.emit(out, TraceLevel::Verbose, format_args!("Adding {to} to To..."))?;
        envelope.add_to(to)?;
    }
    for cc in &options.cc {
        tracer.emit(out, TraceLevel::Verbose, format_args!("Adding {cc} to CC..."))?;
        envelope.add_cc(cc)?;
    }
    for bcc in &options.bcc {
        tracer.emit(out, TraceLevel::Verbose, format_args!("Adding {bcc} to BCC..."))?;
        envelope.add_bcc(bcc)?;
    }

    tracer.emit(
        out,
        TraceLevel::Info,
        format_args!(
            "Sending message to {} total recipients...",
            envelope.recipient_count()
        ),
    )?;
    mailer.send(&config, &envelope).await?;
    tracer.emit(out, TraceLevel::Verbose, format_args!("Sent {}", envelope.body()))?;

    Ok(Exit::Success)
}

fn show_help<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", cli::help_text().trim_end())
}
