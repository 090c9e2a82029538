//! Tests for loading the bundled manifests from disk.

use anyhow::{Context, Result, ensure};
use camino::Utf8Path;
use carve::{ast::TargetKind, ir::BuildGraph, manifest};
use miette::Diagnostic;
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

#[rstest]
fn dexdump_manifest_links_both_components() -> Result<()> {
    let manifest = manifest::from_path("manifests/dexdump.yml")?;
    let target = manifest.targets.first().context("dexdump target")?;
    ensure!(target.kind == TargetKind::Executable, "dexdump is an executable");

    let graph = BuildGraph::from_manifest(&manifest)?;
    let exe = graph
        .edge_for(Utf8Path::new("dexdump"))
        .context("dexdump link edge")?;
    ensure!(exe.rule == "link", "unexpected rule {}", exe.rule);
    ensure!(exe.inputs.len() == 18, "expected 18 objects, got {}", exe.inputs.len());
    ensure!(
        exe.inputs.last().map(|p| p.as_str()) == Some("dalvik/dexdump/DexDump.cpp.o"),
        "tool object should be linked last"
    );
    ensure!(
        exe.vars.get("ldflags").is_some_and(|f| f.starts_with("-lz ")),
        "link flags missing"
    );
    Ok(())
}

#[rstest]
fn base_manifest_on_disk_matches_embedded() -> Result<()> {
    let on_disk = manifest::from_path("manifests/base.yml")?;
    let embedded = manifest::embedded()?;
    ensure!(on_disk == embedded, "embedded manifest is stale");
    Ok(())
}

#[rstest]
fn base_manifest_builds_one_library_per_component() -> Result<()> {
    let manifest = manifest::embedded()?;
    let graph = BuildGraph::from_manifest(&manifest)?;
    let libs: Vec<_> = graph.edges().filter(|e| e.rule == "lib").collect();
    ensure!(libs.len() == manifest.components.len(), "library count mismatch");
    ensure!(
        graph.edge_for(Utf8Path::new("libbase.so")).is_some(),
        "libbase.so missing"
    );
    Ok(())
}

#[rstest]
fn missing_file_reports_the_path() -> Result<()> {
    let temp = tempdir()?;
    let path = temp.path().join("absent.yml");
    let Err(err) = manifest::from_path(&path) else {
        anyhow::bail!("loading a missing manifest should fail");
    };
    ensure!(
        format!("{err:#}").contains("absent.yml"),
        "error should name the file: {err:#}"
    );
    Ok(())
}

#[rstest]
fn parse_errors_carry_a_diagnostic_code() -> Result<()> {
    let temp = tempdir()?;
    let path = temp.path().join("broken.yml");
    fs::write(&path, "carve_version: \"1.0.0\"\nrules: []\n")?;
    let Err(err) = manifest::from_path(&path) else {
        anyhow::bail!("unknown section should fail");
    };
    let diag = err
        .downcast_ref::<manifest::ManifestError>()
        .context("manifest error")?;
    let code = diag.code().map(|c| c.to_string());
    ensure!(
        code.as_deref() == Some("carve::manifest::parse"),
        "unexpected code {code:?}"
    );
    Ok(())
}
