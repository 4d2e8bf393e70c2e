//! Command-line surface.

use std::ffi::OsString;

use clap::{ArgAction, CommandFactory, Parser};

use crate::trace::TraceLevel;

/// Multi-letter short options rewritten to their long form before parsing.
const LEGACY_SHORTS: &[(&str, &str)] = &[
    ("-xu", "--username"),
    ("-xp", "--password"),
    ("-cc", "--cc"),
    ("-bcc", "--bcc"),
];

/// Options that consume the following argument as their value.
const TAKES_VALUE: &[&str] = &[
    "-f", "--from", "-t", "--to", "--cc", "--bcc", "-s", "--subject", "-m", "--message", "-h",
    "--host", "-p", "--port", "--username", "--password", "--timeout",
];

/// A simple command line SMTP email client
#[derive(Debug, Parser)]
#[command(
    name = "sendemail",
    version,
    disable_help_flag = true,
    disable_version_flag = true,
    after_help = "The forms -xu, -xp, -cc, -bcc and --option:value are also accepted."
)]
pub struct Args {
    /// The email address of the sender. Required
    #[arg(short = 'f', long)]
    pub from: Option<String>,

    /// The email address of the receiver(s)
    #[arg(short = 't', long)]
    pub to: Vec<String>,

    /// The email address of the cc receiver(s)
    #[arg(long)]
    pub cc: Vec<String>,

    /// The email address of the bcc receiver(s)
    #[arg(long)]
    pub bcc: Vec<String>,

    /// Message subject
    #[arg(short = 's', long)]
    pub subject: Option<String>,

    /// Message body. STDIN could be used instead
    #[arg(short = 'm', long)]
    pub message: Option<String>,

    /// SMTP server host
    #[arg(short = 'h', long, env = "SENDEMAIL_HOST", default_value = "localhost")]
    pub host: String,

    /// SMTP server port
    #[arg(short = 'p', long, env = "SENDEMAIL_PORT", default_value_t = 25)]
    pub port: u16,

    /// Username to use for authentication, like an email address
    #[arg(long, env = "SENDEMAIL_USERNAME")]
    pub username: Option<String>,

    /// Password to use for authentication
    #[arg(long, env = "SENDEMAIL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// See trace messages. --trace shows info messages, --trace:verbose also shows verbose ones
    #[arg(
        short = 'T',
        long,
        value_enum,
        ignore_case = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "info"
    )]
    pub trace: Option<TraceLevel>,

    /// Do not use TLS (STARTTLS) to encrypt the connection
    #[arg(long)]
    pub disable_ssl: bool,

    /// Give up on the SMTP exchange after this many seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 100)]
    pub timeout: u64,

    /// Show help information
    #[arg(short = '?', long, action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,

    /// Show version information
    #[arg(long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

/// Rendered help text, as printed by `--help`.
#[must_use]
pub fn help_text() -> String {
    Args::command().render_help().to_string()
}

/// Rewrites legacy spellings into ones clap understands.
///
/// `-xu`/`-xp`/`-cc`/`-bcc` become long options and `--name:value` (or
/// `-p:value` and the other single-letter forms) becomes `--name=value`. Values of options are left alone, as is
/// everything after `--`. Arguments that are not valid UTF-8 pass through.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut expect_value = false;
    let mut passthrough = false;

    for arg in args {
        let arg: OsString = arg.into();
        let Some(text) = arg.to_str() else {
            out.push(arg);
            expect_value = false;
            continue;
        };

        if passthrough || expect_value || out.is_empty() {
            expect_value = false;
            out.push(arg);
            continue;
        }
        if text == "--" {
            passthrough = true;
            out.push(arg);
            continue;
        }

        let rewritten = rewrite(text);
        expect_value = TAKES_VALUE.contains(&rewritten.as_str());
        out.push(rewritten.into());
    }

    out
}

fn rewrite(arg: &str) -> String {
    let (name, value) = match arg.find([':', '=']) {
        Some(at) => (&arg[..at], Some(&arg[at + 1..])),
        None => (arg, None),
    };

    let name = LEGACY_SHORTS
        .iter()
        .find(|(legacy, _)| *legacy == name)
        .map_or(name, |(_, long)| *long);

    let is_option = name.starts_with("--") || name == "-T" || TAKES_VALUE.contains(&name);
    match value {
        Some(value) if is_option => format!("{name}={value}"),
        Some(_) => arg.to_string(),
        None => name.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn normalized(args: &[&str]) -> Vec<String> {
        normalize_args(args.iter().copied())
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn legacy_shorts_become_long() {
        assert_eq!(
            normalized(&["sendemail", "-xu", "me", "-xp", "pw", "-cc", "c@x.com", "-bcc", "d@x.com"]),
            vec![
                "sendemail", "--username", "me", "--password", "pw", "--cc", "c@x.com", "--bcc",
                "d@x.com"
            ]
        );
    }

    #[test]
    fn colon_separator_becomes_equals() {
        assert_eq!(
            normalized(&["sendemail", "--trace:verbose", "-T:info", "--to:b@x.com", "-xu:me"]),
            vec![
                "sendemail",
                "--trace=verbose",
                "-T=info",
                "--to=b@x.com",
                "--username=me"
            ]
        );
    }

    #[test]
    fn colon_separator_on_single_letter_options() {
        assert_eq!(
            normalized(&["sendemail", "-p:587", "-h:mx.x.com", "-f:a@x.com", "-s:a:b"]),
            vec!["sendemail", "-p=587", "-h=mx.x.com", "-f=a@x.com", "-s=a:b"]
        );

        let args = Args::try_parse_from(normalize_args([
            "sendemail", "-p:587", "-h:mx.x.com", "-t:b@x.com", "-m:hi",
        ]))
        .unwrap();
        assert_eq!(args.port, 587);
        assert_eq!(args.host, "mx.x.com");
        assert_eq!(args.to, vec!["b@x.com"]);
        assert_eq!(args.message.as_deref(), Some("hi"));
    }

    #[test]
    fn option_values_are_untouched() {
        assert_eq!(
            normalized(&["sendemail", "--message", "-cc", "-s", "a:b", "--host", "--to:x"]),
            vec!["sendemail", "--message", "-cc", "-s", "a:b", "--host", "--to:x"]
        );
    }

    #[test]
    fn program_name_and_after_double_dash_are_untouched() {
        assert_eq!(
            normalized(&["-xu", "--", "-xu"]),
            vec!["-xu", "--", "-xu"]
        );
    }

    #[test]
    fn parses_trace_forms() {
        let parse = |extra: &[&str]| {
            let mut args = vec!["sendemail", "--from", "a@x.com"];
            args.extend_from_slice(extra);
            Args::try_parse_from(normalize_args(args)).unwrap().trace
        };
        assert_eq!(parse(&[]), None);
        assert_eq!(parse(&["--trace"]), Some(TraceLevel::Info));
        assert_eq!(parse(&["-T"]), Some(TraceLevel::Info));
        assert_eq!(parse(&["--trace:verbose"]), Some(TraceLevel::Verbose));
        assert_eq!(parse(&["--trace=Verbose"]), Some(TraceLevel::Verbose));
        assert_eq!(parse(&["-T:verbose"]), Some(TraceLevel::Verbose));
    }

    #[test]
    fn trace_does_not_swallow_next_argument() {
        let args = Args::try_parse_from(normalize_args([
            "sendemail", "--trace", "--to", "b@x.com",
        ]))
        .unwrap();
        assert_eq!(args.trace, Some(TraceLevel::Info));
        assert_eq!(args.to, vec!["b@x.com"]);
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["sendemail"]).unwrap();
        assert_eq!(args.host, "localhost");
        assert_eq!(args.port, 25);
        assert_eq!(args.timeout, 100);
        assert!(!args.disable_ssl);
        assert!(args.to.is_empty());
    }

    #[test]
    fn help_lists_receiver_options() {
        let help = help_text();
        assert!(help.contains("--to"));
        assert!(help.contains("--cc"));
        assert!(help.contains("--bcc"));
        assert!(help.contains("--disable-ssl"));
    }

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }
}
