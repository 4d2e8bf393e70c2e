//! `sendemail` - send one email over SMTP from the command line.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use sendemail::{Console, EXIT_FATAL, Exit, SmtpMailer, StdinSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries usage text and trace lines.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match try_main().await {
        Ok(exit) => exit.into(),
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn try_main() -> anyhow::Result<Exit> {
    let stdout = io::stdout();
    let mut console = Console::new(StdinSource, stdout.lock());

    let exit = sendemail::run(env::args_os(), &mut console, &SmtpMailer)
        .await
        .context("failed to send email")?;
    console
        .output
        .flush()
        .context("failed to flush standard output")?;

    Ok(exit)
}
