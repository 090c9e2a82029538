//! Ninja file generator.
//!
//! This module converts a [`crate::ir::BuildGraph`] into the textual
//! representation expected by the Ninja build system. Statements are written
//! in the order they were emitted so identical graphs always produce
//! identical text.

use crate::ir::{BuildEdge, BuildGraph, RuleTemplate, Statement};
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

/// First line of every generated file.
const BANNER: &str = "# This file is generated by carve. Do not edit.";

/// Generate a Ninja build file as a string.
#[must_use]
pub fn generate(graph: &BuildGraph) -> String {
    NinjaFile(graph).to_string()
}

/// Render only the global variables and rule declarations of `graph`.
#[must_use]
pub fn generate_rules(graph: &BuildGraph) -> String {
    Preamble(graph).to_string()
}

/// Escape a path for use in a `build` line.
///
/// Ninja treats `$`, spaces and colons specially in paths; each is prefixed
/// with `$`. Characters Ninja cannot escape are rejected when the edge is
/// emitted.
fn escape_path(path: &Utf8Path) -> String {
    let mut escaped = String::with_capacity(path.as_str().len());
    for ch in path.as_str().chars() {
        if matches!(ch, '$' | ' ' | ':') {
            escaped.push('$');
        }
        escaped.push(ch);
    }
    escaped
}

/// Convert a slice of paths into a space-separated string.
fn join(paths: &[Utf8PathBuf]) -> String {
    paths.iter().map(|p| escape_path(p)).join(" ")
}

struct NinjaFile<'a>(&'a BuildGraph);

impl Display for NinjaFile<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Preamble(self.0))?;
        for stmt in self.0.statements() {
            match stmt {
                Statement::Build(edge) => write!(f, "{}", DisplayEdge(edge))?,
                Statement::Subninja(path) => writeln!(f, "subninja {}\n", escape_path(path))?,
            }
        }
        Ok(())
    }
}

/// Banner, global variables and rules.
struct Preamble<'a>(&'a BuildGraph);

impl Display for Preamble<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BANNER}\n")?;
        if !self.0.vars().is_empty() {
            for (name, value) in self.0.vars() {
                writeln!(f, "{name} = {value}")?;
            }
            writeln!(f)?;
        }
        for rule in self.0.rules() {
            write!(f, "{}", DisplayRule(rule))?;
        }
        Ok(())
    }
}

/// Wrapper struct to display a rule declaration.
struct DisplayRule<'a>(&'a RuleTemplate);

impl Display for DisplayRule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "rule {}", self.0.name)?;
        writeln!(f, "  command = {}", self.0.command)?;
        writeln!(f)
    }
}

/// Wrapper struct to display a build edge.
struct DisplayEdge<'a>(&'a BuildEdge);

impl Display for DisplayEdge<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let edge = self.0;
        write!(f, "build {}", join(&edge.outputs))?;
        if !edge.implicit_outputs.is_empty() {
            write!(f, " | {}", join(&edge.implicit_outputs))?;
        }
        write!(f, ": {} {}", edge.rule, join(&edge.inputs))?;
        if !edge.order_only_deps.is_empty() {
            write!(f, " || {}", join(&edge.order_only_deps))?;
        }
        writeln!(f)?;
        for (name, value) in &edge.vars {
            writeln!(f, "  {name} = {value}")?;
        }
        writeln!(f)
    }
}
