//! Command-line tools for scene documents.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "scene",
    about = "Load, check and convert scene description documents",
    version,
    propagate_version = true
)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a scene document
    Check {
        /// Scene document
        file: PathBuf,

        /// Also check tree references and relation cycles
        #[arg(long)]
        strict: bool,
    },

    /// Rewrite a scene document in canonical form
    Fmt {
        /// Scene document
        file: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a scene to another format
    Export {
        /// Scene document
        file: PathBuf,

        /// Output format: text, json, wire
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Write wire names as dotted ancestor paths
        #[arg(long)]
        full_paths: bool,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List entities
    List {
        /// Scene document
        file: PathBuf,

        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show detailed information about an entity
    Show {
        /// Scene document
        file: PathBuf,

        /// Entity name
        name: String,
    },

    /// Print the entity hierarchy
    Tree {
        /// Scene document
        file: PathBuf,
    },

    /// Send a scene through the wire format and read it back
    Roundtrip {
        /// Scene document
        file: PathBuf,

        /// Deepest nesting read back from the runtime
        #[arg(long, default_value = "64")]
        max_depth: usize,

        /// Write wire names as dotted ancestor paths
        #[arg(long)]
        full_paths: bool,
    },
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { file, strict } => commands::check::run(&file, strict),
        Commands::Fmt { file, output } => commands::fmt::run(&file, output.as_deref()),
        Commands::Export {
            file,
            format,
            full_paths,
            output,
        } => commands::export::run(&file, &format, full_paths, output.as_deref()),
        Commands::List { file, tag } => commands::list::run(&file, tag.as_deref()),
        Commands::Show { file, name } => commands::show::run(&file, &name),
        Commands::Tree { file } => commands::tree::run(&file),
        Commands::Roundtrip {
            file,
            max_depth,
            full_paths,
        } => commands::roundtrip::run(&file, max_depth, full_paths),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
