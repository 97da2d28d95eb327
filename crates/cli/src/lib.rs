pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "bookstore",
    about = "Bookstore agent CLI",
    long_about = "Chat with the bookstore agent, call its tools directly, and inspect its configuration.",
    after_help = "Examples:\n  bookstore chat\n  bookstore tool check_stock --input '{\"title\":\"Dune\"}'\n  bookstore doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Talk to the agent over stdin/stdout until EOF or `exit`")]
    Chat,
    #[command(about = "Show the agent's glossary, journeys and guidelines")]
    Describe {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Invoke one bookstore tool and print its output")]
    Tool {
        #[arg(help = "Tool name, e.g. list_available_books or check_stock")]
        name: String,
        #[arg(long, help = "JSON object passed as tool input")]
        input: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, the journey graph, the tool registry and the LLM endpoint")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Diagnostics go to stderr so command output on stdout stays parseable.
/// `BOOKSTORE_CLI_LOG` takes an env-filter directive, `warn` by default.
fn init_logging() {
    let filter = EnvFilter::try_from_env("BOOKSTORE_CLI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .compact()
        .try_init();
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Chat => commands::chat::run(),
        Command::Describe { json } => commands::describe::run(json),
        Command::Tool { name, input } => commands::tool::run(&name, input.as_deref()),
        Command::Config => commands::CommandResult::text(commands::config::run()),
        Command::Doctor { json } => commands::CommandResult::text(commands::doctor::run(json)),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
