//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. With no
//! arguments the tool generates the build file for the embedded manifest and
//! writes it to standard output.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate Ninja build files for isolated slices of a monolithic native tree.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Manifest to read instead of the one embedded in the binary.
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Resolve the manifest path relative to this directory; requires
    /// `--file`.
    #[arg(short = 'C', long, value_name = "DIR", requires = "file")]
    pub directory: Option<PathBuf>,

    /// Write the build file here instead of standard output; `-` means
    /// standard output.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output on standard error.
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional subcommand to execute; defaults to `generate` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Parse command-line arguments, providing `generate` as the default
    /// command.
    #[must_use]
    pub fn parse_with_default() -> Self {
        Self::parse().with_default_command()
    }

    /// Parse the provided arguments, applying the default command when needed.
    ///
    /// # Errors
    ///
    /// Returns the clap error if the arguments are invalid.
    pub fn try_parse_from_with_default<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?.with_default_command())
    }

    /// Apply the default command if none was specified.
    #[must_use]
    fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Generate);
        }
        self
    }

    /// Path of the manifest to load, if one was given.
    #[must_use]
    pub fn manifest_path(&self) -> Option<PathBuf> {
        let file = self.file.as_ref()?;
        Some(
            self.directory
                .as_ref()
                .map_or_else(|| file.clone(), |dir| dir.join(file)),
        )
    }
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone, Copy)]
pub enum Commands {
    /// Write the complete build file.
    Generate,

    /// Write only the global variables and rule declarations.
    Rules,
}
