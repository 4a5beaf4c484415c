//! RSON command-line tool for checking and transcoding RSON documents.
//!
//! Usage: rson [OPTIONS] [FILE]
//!
//! Reads FILE (or stdin when FILE is absent or `-`), parses it as RSON and
//! writes it in the requested output format. Errors go to stderr as
//! `FILE: message` with exit status 1.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use librson::{encode, parse_document, try_encode, Format, ParseOptions, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod transcode;

/// Output formats for `--to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Canonical single-line RSON
    Rson,
    /// Pretty-printed JSON
    Json,
    Yaml,
    Toml,
    /// Binary CBOR
    Cbor,
    /// CBOR diagnostic notation
    Diag,
}

/// Parse, check and transcode RSON documents.
#[derive(Parser)]
#[command(name = "rson", version, about = "RSON command-line tool")]
struct Cli {
    /// Input file (stdin when omitted or `-`)
    file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    to: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only check that the input parses
    #[arg(long)]
    check: bool,

    /// Read non-integer numbers as exact decimals
    #[arg(long)]
    decimal: bool,

    /// Reject a comma before a closing bracket
    #[arg(long)]
    no_trailing_commas: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Name used in diagnostics.
    fn display_name(&self) -> String {
        match &self.file {
            Some(path) if path != Path::new("-") => path.display().to_string(),
            _ => "<stdin>".to_string(),
        }
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .use_decimal(self.decimal)
            .allow_trailing_commas(!self.no_trailing_commas)
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let name = cli.display_name();
    if let Err(message) = run(&cli, &name) {
        eprintln!("{}: {}", name, message);
        process::exit(1);
    }
}

fn run(cli: &Cli, name: &str) -> Result<(), String> {
    let input = read_input(cli.file.as_deref())?;
    let filename = cli
        .file
        .as_deref()
        .filter(|p| *p != Path::new("-"))
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string());

    let value = parse_document(&input, filename.as_deref(), &cli.parse_options())
        .map_err(|e| e.to_string())?;

    if cli.check {
        println!("{}: ok", name);
        return Ok(());
    }

    info!("writing {:?}", cli.to);
    let output = render(&value, cli.to)?;
    write_output(&output, cli.output.as_deref())
}

fn read_input(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(p) if p != Path::new("-") => {
            debug!("reading {}", p.display());
            fs::read_to_string(p).map_err(|e| format!("Error reading file: {}", e))
        }
        _ => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .map_err(|e| format!("Error reading stdin: {}", e))?;
            Ok(input)
        }
    }
}

/// Encoded output, text formats ending in a newline.
fn render(value: &Value, format: OutputFormat) -> Result<Vec<u8>, String> {
    let text = match format {
        OutputFormat::Rson => encode(value, Format::Rson),
        OutputFormat::Json => try_encode(value, Format::Json)
            .map_err(|e| format!("Cannot convert to JSON: {}", e))?,
        OutputFormat::Yaml => transcode::yaml::encode(value)
            .map_err(|e| format!("Cannot convert to YAML: {}", e))?,
        OutputFormat::Toml => transcode::toml::encode(value)
            .map_err(|e| format!("Cannot convert to TOML: {}", e))?,
        OutputFormat::Cbor => {
            return transcode::cbor::encode(value)
                .map_err(|e| format!("Cannot convert to CBOR: {}", e));
        }
        OutputFormat::Diag => {
            let bytes = transcode::cbor::encode(value)
                .map_err(|e| format!("Cannot convert to CBOR: {}", e))?;
            transcode::cbor::diagnostic(&bytes)
                .map_err(|e| format!("Cannot render CBOR diagnostic notation: {}", e))?
        }
    };
    let mut bytes = text.into_bytes();
    if bytes.last() != Some(&b'\n') {
        bytes.push(b'\n');
    }
    Ok(bytes)
}

fn write_output(output: &[u8], path: Option<&Path>) -> Result<(), String> {
    match path {
        Some(p) => fs::write(p, output).map_err(|e| format!("Error writing {}: {}", p.display(), e)),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output)
                .and_then(|_| handle.flush())
                .map_err(|e| format!("Error writing to stdout: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_options_from_flags() {
        let cli = Cli::parse_from(["rson", "--decimal", "--no-trailing-commas", "-t", "rson"]);
        assert_eq!(cli.to, OutputFormat::Rson);
        assert_eq!(cli.display_name(), "<stdin>");
        let options = cli.parse_options();
        assert!(librson::parse_with_options("[1,]", &options).is_err());
    }

    #[test]
    fn test_render_json_rejects_colliding_keys() {
        let value = librson::parse("1: a\n\"1\": c").unwrap();
        let err = render(&value, OutputFormat::Json).unwrap_err();
        assert_eq!(err, "Cannot convert to JSON: Keys collide as string key \"1\"");
        assert!(render(&value, OutputFormat::Rson).is_ok());
    }

    #[test]
    fn test_render_appends_newline() {
        let value = librson::parse("a: 1").unwrap();
        assert_eq!(render(&value, OutputFormat::Rson).unwrap(), b"{\"a\": 1}\n");
    }
}
