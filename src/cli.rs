//! Command-line interface for voxsense
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Voice analysis service: transcription, emotion, audio events and translation
#[derive(Parser, Debug)]
#[command(
    name = "voxsense",
    version,
    about = "Voice analysis service: transcription, emotion, audio events and translation"
)]
pub struct Cli {
    /// Subcommand to execute (default: serve)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose logging (-v: debug, -vv: trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Bind address (overrides config)
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Port (overrides config)
        #[arg(long, short, value_name = "PORT")]
        port: Option<u16>,
    },

    /// Analyze one audio file and print the result as JSON
    Analyze {
        /// Audio file to analyze
        file: PathBuf,

        /// Language hint: auto, en, zh, ja, ko, yue
        #[arg(long, short, value_name = "LANG", default_value = "auto")]
        language: String,

        /// Comma-separated translation targets, e.g. es,fr
        #[arg(long, short, value_name = "LANGS")]
        translate_to: Option<String>,
    },

    /// List translation languages
    Languages,

    /// List emotions with their display metadata
    Emotions,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}
