//! Output formatting utilities
//!
//! Results go to stdout. Status lines and errors go to the log stream
//! picked with `--log-stream`.

use console::{style, Style};
use keychain_core::CodeSigningCertificate;

use crate::cli::{Cli, LogStream};

fn paint(stream: LogStream, style: Style, text: &str) -> String {
    let style = match stream {
        LogStream::Stderr => style.for_stderr(),
        LogStream::Stdout => style.for_stdout(),
    };
    style.apply_to(text).to_string()
}

/// Write a raw line to the log stream
fn write_line(stream: LogStream, line: &str) {
    match stream {
        LogStream::Stderr => eprintln!("{}", line),
        LogStream::Stdout => println!("{}", line),
    }
}

/// Styled error line. Errors are shown even in silent mode, so callers
/// write it regardless of `--silent`.
pub fn error_line(stream: LogStream, message: &str) -> String {
    format!(
        "{} {}",
        paint(stream, Style::new().red().bold(), "✗"),
        paint(stream, Style::new().red(), message)
    )
}

/// Print a success message
pub fn success(cli: &Cli, message: &str) {
    if !cli.silent {
        write_line(
            cli.log_stream,
            &format!("{} {}", paint(cli.log_stream, Style::new().green().bold(), "✓"), message),
        );
    }
}

/// Print a warning message
pub fn warning(cli: &Cli, message: &str) {
    if !cli.silent {
        write_line(
            cli.log_stream,
            &format!("{} {}", paint(cli.log_stream, Style::new().yellow().bold(), "!"), message),
        );
    }
}

/// Print a dimmed note
pub fn note(cli: &Cli, message: &str) {
    if !cli.silent {
        write_line(cli.log_stream, &paint(cli.log_stream, Style::new().dim(), message));
    }
}

/// Style for keychain paths
pub fn path_style() -> Style {
    Style::new().cyan()
}

/// Styled certificate line for stdout
pub fn certificate_line(certificate: &CodeSigningCertificate) -> String {
    format!(
        "{} {} {}",
        style(&certificate.fingerprint).dim(),
        style(&certificate.name).cyan(),
        style(format!("[{}]", certificate.kind)).dim()
    )
}
