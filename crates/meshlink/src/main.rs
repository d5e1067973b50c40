mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "meshlink", version, about = "Meshtastic serial bridge CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::EncodeKind;

    #[test]
    fn parses_encode_text() {
        let cli = Cli::try_parse_from([
            "meshlink", "encode", "text", "hello", "--to", "!a1b2c3d4", "--channel", "2",
        ])
        .expect("encode args should parse");

        let Command::Encode(args) = cli.command else {
            panic!("expected encode command");
        };
        let EncodeKind::Text { message, to, channel } = args.kind else {
            panic!("expected text encoding");
        };
        assert_eq!(message, "hello");
        assert_eq!(to, Some(0xA1B2_C3D4));
        assert_eq!(channel, Some(2));
    }

    #[test]
    fn parses_send_with_config() {
        let cli = Cli::try_parse_from([
            "meshlink",
            "send",
            "/dev/ttyUSB0",
            "--config",
            "radio.json",
            "--message",
            "hi",
            "--format",
            "json",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn rejects_conflicting_decode_inputs() {
        let err = Cli::try_parse_from([
            "meshlink", "decode", "94c3", "--file", "capture.hex",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_bad_node_number() {
        let err = Cli::try_parse_from(["meshlink", "encode", "text", "x", "--to", "!zz"])
            .expect_err("invalid node should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_listen_with_count() {
        let cli = Cli::try_parse_from([
            "meshlink",
            "listen",
            "/dev/ttyACM0",
            "--count",
            "3",
            "--log-level",
            "debug",
        ])
        .expect("listen args should parse");
        assert!(matches!(cli.log_level, LogLevel::Debug));
        assert!(matches!(cli.command, Command::Listen(_)));
    }
}
