//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// YAML Doctor - YAML health checks with a score
#[derive(Parser)]
#[command(name = "ydoc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the configured analyzer backend
    #[arg(long, value_enum, global = true)]
    pub analyzer: Option<AnalyzerArg>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a file or directory
    Analyze {
        /// File or directory to analyze
        target: PathBuf,

        /// Workspace root a single file must belong to (repeatable)
        #[arg(long = "root", value_name = "DIR")]
        roots: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Analyze the primary workspace root
    Workspace {
        /// Workspace roots, primary first
        #[arg(default_value = ".")]
        roots: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Start the LSP server
    Lsp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalyzerArg {
    Embedded,
    Container,
}
