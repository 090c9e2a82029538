//! Manifest loading helpers.
//!
//! A manifest is plain YAML describing headers, nested build files,
//! components and link targets. No templating is applied: values are taken
//! verbatim, and placeholder tokens such as `@CC@` pass through untouched.
//! The binary embeds a default manifest so it can run without arguments.

use crate::ast::BuildManifest;
use anyhow::{Context, Result};
use std::{fs, path::Path};

mod diagnostics;

pub use diagnostics::{ManifestError, map_yaml_error};

/// Major version of the manifest format understood by this release.
pub const SUPPORTED_MAJOR: u64 = 1;

/// The manifest compiled into the binary: the base host libraries.
pub const EMBEDDED_MANIFEST: &str = include_str!("../../manifests/base.yml");

/// Label used in diagnostics for [`EMBEDDED_MANIFEST`].
pub const EMBEDDED_NAME: &str = "<embedded>";

/// Parse a manifest string labelled `name` in diagnostics.
///
/// # Errors
///
/// Returns [`ManifestError::Parse`] for malformed YAML or unknown keys and
/// [`ManifestError::UnsupportedVersion`] for an unsupported format version.
pub fn from_str_named(yaml: &str, name: &str) -> Result<BuildManifest, ManifestError> {
    let manifest: BuildManifest =
        serde_saphyr::from_str(yaml).map_err(|e| ManifestError::Parse {
            name: name.to_owned(),
            source: map_yaml_error(e, yaml, name),
        })?;
    if manifest.carve_version.major != SUPPORTED_MAJOR {
        return Err(ManifestError::UnsupportedVersion {
            name: name.to_owned(),
            found: manifest.carve_version,
            expected_major: SUPPORTED_MAJOR,
        });
    }
    Ok(manifest)
}

/// Parse a manifest string.
///
/// # Errors
///
/// See [`from_str_named`].
pub fn from_str(yaml: &str) -> Result<BuildManifest, ManifestError> {
    from_str_named(yaml, "manifest")
}

/// Parse the manifest compiled into the binary.
///
/// # Errors
///
/// See [`from_str_named`].
pub fn embedded() -> Result<BuildManifest, ManifestError> {
    from_str_named(EMBEDDED_MANIFEST, EMBEDDED_NAME)
}

/// Load a [`BuildManifest`] from the given file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to parse.
pub fn from_path(path: impl AsRef<Path>) -> Result<BuildManifest> {
    let path_ref = path.as_ref();
    let data = fs::read_to_string(path_ref)
        .with_context(|| format!("failed to read {}", path_ref.display()))?;
    Ok(from_str_named(&data, &path_ref.display().to_string())?)
}
