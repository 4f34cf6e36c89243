//! CLI module for FM Fact Label
//!
//! Provides subcommands:
//! - `serve`: web server with the upload page and JSON API
//! - `characterize`: print the report of a local feature model file

pub mod characterize;
pub mod serve;

use clap::{Parser, Subcommand};

/// FM Fact Label - characterization reports for feature models
#[derive(Parser)]
#[command(name = "fm-fact-label")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the web server
    Serve,

    /// Characterize a local .uvl or .xml file
    Characterize(characterize::CharacterizeArgs),
}
