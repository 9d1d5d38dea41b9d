//! Command-line interface definition for AskVerse
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot questions, history
//! management, image generation, and the theme preference.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// AskVerse - conversational assistant in the terminal
///
/// Ask questions, keep a pinned history of answers, and generate images
/// from prompts.
#[derive(Parser, Debug, Clone)]
#[command(name = "askverse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the storage directory
    #[arg(long, global = true)]
    pub storage_path: Option<PathBuf>,

    /// Keep history and images in memory only for this run
    #[arg(long, global = true, conflicts_with = "storage_path")]
    pub ephemeral: bool,

    /// Override the provider from config (gemini, ollama)
    #[arg(short, long, global = true)]
    pub provider: Option<String>,

    /// Show answers at once instead of typing them out
    #[arg(long, global = true)]
    pub no_typing: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for AskVerse
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question to send
        question: String,
    },

    /// Browse and manage saved chats
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Generate and manage images
    Image {
        /// Image subcommand
        #[command(subcommand)]
        command: ImageCommand,
    },

    /// Show or set the colour theme
    Theme {
        /// Theme to switch to; prints the current theme when omitted
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
}

/// History subcommands
///
/// Positions are 1-based, as printed by `history list`.
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved chats
    List {
        /// List pinned chats instead of the full history
        #[arg(long)]
        pinned: bool,
    },

    /// Show a saved chat in full
    Show {
        /// Position in the history list
        index: usize,

        /// Look the position up in the pinned list
        #[arg(long)]
        pinned: bool,
    },

    /// Pin or unpin a chat from the history
    Pin {
        /// Position in the history list
        index: usize,

        /// Look the position up in the pinned list, which unpins it
        #[arg(long)]
        pinned: bool,
    },

    /// Delete a chat from the history
    Delete {
        /// Position in the history list
        index: usize,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Image subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ImageCommand {
    /// Generate an image from a prompt
    Generate {
        /// Description of the image
        prompt: String,
    },

    /// List generated images, newest first
    List,

    /// Show an image's prompt and full-size URL
    Show {
        /// Position in the gallery
        index: usize,
    },

    /// Remove an image from the gallery
    Delete {
        /// Position in the gallery
        index: usize,
    },
}

/// Colour theme
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    /// Dark palette
    Dark,
    /// Light palette
    Light,
}

impl ThemeMode {
    /// Whether this is the dark palette
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            verbose: false,
            storage_path: None,
            ephemeral: false,
            provider: None,
            no_typing: false,
            command: Commands::Chat,
        }
    }
}
