//! Graft CLI entry point.

use graft_runtime::{RuntimeConfig, inspect, load_from_file, logging};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    command: Option<String>,
    files: Vec<PathBuf>,
    show_help: bool,
    show_version: bool,
    verbose: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    for arg in args.into_iter().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-v" | "--verbose" => config.verbose = true,
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option: {flag}").into());
            }
            _ if config.command.is_none() => config.command = Some(arg),
            _ => config.files.push(PathBuf::from(arg)),
        }
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_args(args)?;

    if cli.show_help {
        print_help();
        return Ok(());
    }

    if cli.show_version {
        println!("graft {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut runtime = RuntimeConfig::from_env()?;
    if cli.verbose {
        runtime = runtime.with_log_filter("debug");
    }
    logging::init(&runtime)?;

    match cli.command.as_deref() {
        Some("inspect") => {
            if cli.files.is_empty() {
                return Err("inspect requires at least one file".into());
            }
            for (i, file) in cli.files.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                let payload = load_from_file(file)?;
                println!("\x1b[1;36m=== {} ===\x1b[0m", file.display());
                print!("{}", inspect(&payload)?);
            }
            Ok(())
        }
        Some(other) => Err(format!("unknown command: {other}").into()),
        None => {
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!(
        "\x1b[1mGraft\x1b[0m - Object-graph serialization

\x1b[1mUSAGE:\x1b[0m
    graft [OPTIONS] <COMMAND> [FILES...]

\x1b[1mCOMMANDS:\x1b[0m
    inspect <FILES...>   Print header, tables, object counts, and nested instances

\x1b[1mOPTIONS:\x1b[0m
    -h, --help         Print help information
    -V, --version      Print version information
    -v, --verbose      Log at debug level

\x1b[1mENVIRONMENT:\x1b[0m
    GRAFT_LOG            Log filter (e.g. graft_serializer=debug)
    GRAFT_LOG_LOAD_TIME  Report load durations
    GRAFT_GUID_SEED      Seed GUID generation

\x1b[1mEXAMPLES:\x1b[0m
    graft inspect level.grft
    graft -v inspect a.grft b.grft"
    );
}
