//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the manifest, assembles the graph and writes the result.

use crate::ast::BuildManifest;
use crate::cli::{Cli, Commands};
use crate::{ir::BuildGraph, manifest, ninja_gen};
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// Execute the parsed [`Cli`] command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, the graph cannot be
/// assembled, or the output cannot be written. Nothing is written on error.
pub fn run(cli: &Cli) -> Result<()> {
    let text = match cli.command.unwrap_or(Commands::Generate) {
        Commands::Generate => generate_ninja(cli)?,
        Commands::Rules => {
            let manifest = load_manifest(cli)?;
            let graph = BuildGraph::preamble(&manifest.vars).context("declaring rules")?;
            ninja_gen::generate_rules(&graph)
        }
    };
    write_output(cli.output.as_deref(), &text)
}

/// Generate the Ninja build file for the manifest selected by `cli`.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or translated.
pub fn generate_ninja(cli: &Cli) -> Result<String> {
    let manifest = load_manifest(cli)?;
    let graph = BuildGraph::from_manifest(&manifest).context("building graph")?;
    debug!(
        rules = graph.rules().count(),
        statements = graph.statements().len(),
        "assembled build graph"
    );
    Ok(ninja_gen::generate(&graph))
}

fn load_manifest(cli: &Cli) -> Result<BuildManifest> {
    match cli.manifest_path() {
        Some(path) => manifest::from_path(&path)
            .with_context(|| format!("loading manifest at {}", path.display())),
        None => {
            debug!("using embedded manifest");
            manifest::embedded().context("loading embedded manifest")
        }
    }
}

/// Write `content` to `path`, or to standard output when `path` is absent
/// or `-`.
fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(p) if p != Path::new("-") => {
            fs::write(p, content).with_context(|| format!("writing {}", p.display()))?;
            info!("Generated Ninja file at {}", p.display());
        }
        _ => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.flush())
                .context("writing to standard output")?;
        }
    }
    Ok(())
}
