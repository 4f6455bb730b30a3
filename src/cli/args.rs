//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::position::Position;

/// Inspect and edit question outlines as ordered trees
#[derive(Parser, Debug)]
#[command(name = "formtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file, layered over the global one
    #[arg(long, global = true, value_hint = ValueHint::FilePath, env = "FORMTREE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the question tree
    Show {
        /// Outline file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        outline: PathBuf,
    },

    /// Print the absolute path of every question
    Paths {
        /// Outline file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        outline: PathBuf,
    },

    /// Check every question id
    Validate {
        /// Outline file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        outline: PathBuf,
    },

    /// Delete questions (with their children), optionally undoing afterwards
    Delete {
        /// Outline file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        outline: PathBuf,
        /// Absolute paths of the questions to delete
        #[arg(required = true, num_args = 1..)]
        paths: Vec<String>,
        /// Undo the deletion and print the restored tree
        #[arg(long)]
        undo: bool,
    },

    /// Move a question relative to another one
    Move {
        /// Outline file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        outline: PathBuf,
        /// Absolute path of the question to move
        path: String,
        /// before, after, into, first or last
        position: Position,
        /// Absolute path of the reference question (default: root)
        reference: Option<String>,
    },

    /// Show effective settings
    Config,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
