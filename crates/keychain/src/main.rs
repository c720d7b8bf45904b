//! keychain - Manage macOS code signing keychains and certificates

mod cli;
mod exit_codes;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::{output, Cli, Invocation, LogStream};

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();

    let code = run(
        &args,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
        |cli| {
            if cli.no_color {
                console::set_colors_enabled(false);
                console::set_colors_enabled_stderr(false);
            }

            let _guard = init_tracing(cli);
            cli.execute()
        },
    );

    ExitCode::from(code)
}

/// Parse `args`, run the command through `execute` and report the outcome.
///
/// Help and version text go to `stdout`. Usage errors and command errors go
/// to the requested log stream, also under `--silent`. Returns the process
/// exit code.
fn run<'a, F>(
    args: &[OsString],
    stdout: &'a mut dyn Write,
    stderr: &'a mut dyn Write,
    execute: F,
) -> u8
where
    F: FnOnce(&Cli) -> anyhow::Result<()>,
{
    let cli = match cli::parse_args(args.iter().cloned()) {
        Ok(Invocation::Run(cli)) => cli,
        Ok(Invocation::Display(text)) => {
            let _ = write!(stdout, "{}", text);
            return exit_codes::SUCCESS;
        }
        Err(err) => {
            let out = match cli::requested_log_stream(args) {
                LogStream::Stdout => stdout,
                LogStream::Stderr => stderr,
            };
            let _ = writeln!(out, "{}", err.to_string().trim_end());
            return exit_codes::USAGE_ERROR;
        }
    };

    match execute(&cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let out = match cli.log_stream {
                LogStream::Stdout => stdout,
                LogStream::Stderr => stderr,
            };
            let _ = writeln!(
                out,
                "{}",
                output::error_line(cli.log_stream, &format!("{:#}", err))
            );
            exit_codes::for_error(&err)
        }
    }
}

fn log_writer(stream: LogStream) -> BoxMakeWriter {
    match stream {
        LogStream::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogStream::Stdout => BoxMakeWriter::new(std::io::stdout),
    }
}

/// Set up tracing with two layers:
/// - Console: on the chosen log stream, info (debug with -v), off with -s.
///   RUST_LOG overrides the level.
/// - File: always debug-level JSON to ~/.keychain/logs/
fn init_tracing(cli: &Cli) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let level = if cli.verbose { "debug" } else { "info" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = (!cli.silent).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(!cli.no_color)
            .with_writer(log_writer(cli.log_stream))
            .with_filter(console_filter)
    });

    if let Some(log_dir) = log_directory() {
        let file_appender = tracing_appender::rolling::daily(&log_dir, "keychain.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(console_layer)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_filter(EnvFilter::new("debug")),
            )
            .init();

        return Some(guard);
    }

    // Fallback: console only
    tracing_subscriber::registry().with(console_layer).init();

    None
}

/// Returns the log directory path, creating it if needed.
fn log_directory() -> Option<std::path::PathBuf> {
    let log_dir = dirs::home_dir()?.join(".keychain").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    Some(log_dir)
}
