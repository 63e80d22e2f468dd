mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{compile, import, init, recover, CompileArgs, ImportArgs, InitArgs, RecoverArgs};

/// Mailcraft CLI - work with email documents from the command line
#[derive(Parser, Debug)]
#[command(name = "mailcraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a starter document payload
    Init(InitArgs),

    /// Compile a document payload to markup
    Compile(CompileArgs),

    /// Import markup into a document payload
    Import(ImportArgs),

    /// Recover a document from a raw model response
    Recover(RecoverArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let cwd = std::env::current_dir()
        .expect("Cannot get current directory")
        .display()
        .to_string();

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Compile(args) => compile(args, &cwd),
        Command::Import(args) => import(args, &cwd),
        Command::Recover(args) => recover(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
