//! js2py - JavaScript to Python translator
//!
//! CLI driver: parses JavaScript, reports scope issues and writes the
//! lowered Python module.

mod commands;
mod config;
mod frontend;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;

/// JavaScript to Python translator
#[derive(Parser, Debug)]
#[command(name = "js2py")]
#[command(author, version, about = "Translate JavaScript to Python")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Project file (defaults to ./js2py.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a JavaScript file to Python
    Convert(commands::convert::ConvertArgs),

    /// Parse, analyze and transform files without writing output
    Check(commands::check::CheckArgs),

    /// Print the scope tree of a JavaScript file
    Scopes(commands::scopes::ScopesArgs),

    /// Explain a diagnostic code
    Explain(commands::explain::ExplainArgs),
}

/// Default log filter when `RUST_LOG` is unset.
fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(cli.verbose)))
        .init();

    // Determine if colors should be used
    let use_color = !cli.no_color && !cli.quiet && atty::is(atty::Stream::Stdout);

    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load(cli.config.as_deref())?;

    let context = commands::Context {
        config,
        format: cli.format,
        use_color,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let success = match command {
        Commands::Convert(args) => commands::convert::run(args, &context)?,
        Commands::Check(args) => commands::check::run(args, &context)?,
        Commands::Scopes(args) => commands::scopes::run(args, &context)?,
        Commands::Explain(args) => commands::explain::run(args, &context)?,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "js2py", "-vv", "--format", "json", "convert", "app.js", "--out", "out/app.py", "--module",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Json);
        let Some(Commands::Convert(args)) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.input, PathBuf::from("app.js"));
        assert_eq!(args.out, Some(PathBuf::from("out/app.py")));
        assert!(args.module);
        assert!(!args.strict);
    }

    #[test]
    fn test_explain_code_is_optional() {
        let cli = Cli::try_parse_from(["js2py", "explain"]).unwrap();
        let Some(Commands::Explain(args)) = cli.command else {
            panic!("expected explain");
        };
        assert!(args.code.is_none());
    }

    #[test]
    fn test_verbosity_raises_log_filter() {
        assert_eq!(log_filter(0), "warn");
        assert_eq!(log_filter(1), "info");
        assert_eq!(log_filter(5), "trace");
    }
}
