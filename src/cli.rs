//! CLI interface for the application assistant

use crate::output::writer::OutputFormat;
use crate::processing::document::ResumeVariant;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apply-copilot")]
#[command(about = "Resume-grounded cover letters and application answers")]
#[command(long_about = "Index a resume variant, then draft cover letters or answer employer questions in the candidate's voice using retrieved resume context")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load or build the vector store for a resume variant
    Index {
        #[arg(value_enum)]
        variant: ResumeVariant,

        /// Discard the stored index and rebuild it
        #[arg(long)]
        rebuild: bool,
    },

    /// Generate and save a cover letter
    CoverLetter {
        #[arg(long, value_enum)]
        variant: ResumeVariant,

        #[arg(long)]
        company: String,

        /// Job title
        #[arg(short, long)]
        title: String,

        /// Job description text
        #[arg(short, long, conflicts_with = "description_file")]
        description: Option<String>,

        /// Read the job description from a file (TXT, MD, PDF)
        #[arg(long)]
        description_file: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "txt")]
        format: OutputFormat,

        /// Print the letter after saving it
        #[arg(long)]
        print: bool,
    },

    /// Answer employer questions interactively
    Chat {
        #[arg(long, value_enum)]
        variant: ResumeVariant,

        /// Position as "Title at Company"
        #[arg(short, long)]
        position: Option<String>,

        /// Job description text
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Show the resume chunks retrieved for a query
    Search {
        #[arg(long, value_enum)]
        variant: ResumeVariant,

        query: String,
    },

    /// List resume variants and whether they are indexed
    Variants,

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// A line typed in the chat loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Question(String),
    /// `/job Title at Company [| description]`; empty clears the context
    Job { position: String, description: String },
    History,
    Clear,
    Help,
    Quit,
    Empty,
}

pub fn parse_chat_input(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if !line.starts_with('/') {
        return ChatInput::Question(line.to_string());
    }

    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    match command {
        "/quit" | "/exit" => ChatInput::Quit,
        "/clear" => ChatInput::Clear,
        "/history" => ChatInput::History,
        "/job" => {
            let (position, description) = rest.split_once('|').unwrap_or((rest, ""));
            ChatInput::Job {
                position: position.trim().to_string(),
                description: description.trim().to_string(),
            }
        }
        _ => ChatInput::Help,
    }
}
