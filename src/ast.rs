//! Build manifest structures.
//!
//! This module defines the data structures used to represent a parsed build
//! manifest. They mirror the YAML schema and are deserialised with
//! `serde-saphyr`.
//!
//! ```rust
//! use carve::ast::BuildManifest;
//!
//! let yaml = "carve_version: \"1.0.0\"\ncomponents:\n  - name: x\n    sources: [m.c]";
//! let manifest: BuildManifest = serde_saphyr::from_str(yaml).expect("parse");
//! assert_eq!(manifest.components[0].name, "x");
//! ```

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};

/// Global variables in declaration order.
pub type Vars = IndexMap<String, String>;

/// Placeholder variables emitted when a manifest declares none. The tokens
/// are substituted by a later configuration step.
const DEFAULT_VARS: [(&str, &str); 7] = [
    ("CC", "@CC@"),
    ("CXX", "@CXX@"),
    ("CFLAGS", "@CFLAGS@"),
    ("CPPFLAGS", "@CPPFLAGS@"),
    ("CXXFLAGS", "@CXXFLAGS@"),
    ("LDFLAGS", "@LDFLAGS@"),
    ("PLATFORM_TOOLS_VERSION", "@PV@"),
];

/// The default global variables.
#[must_use]
pub fn default_vars() -> Vars {
    DEFAULT_VARS
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// Top-level manifest structure.
///
/// Sections are processed in a fixed order regardless of their position in
/// the file: headers, subninjas, components, targets.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildManifest {
    /// Semantic version of the manifest format.
    pub carve_version: Version,

    /// Global variables written ahead of the rules.
    #[serde(default = "default_vars")]
    pub vars: Vars,

    /// Binary blobs embedded as C headers.
    #[serde(default)]
    pub headers: Vec<HeaderSpec>,

    /// Nested build files whose artifacts may be linked.
    #[serde(default)]
    pub subninjas: Vec<SubninjaSpec>,

    /// Groups of sources compiled with shared flags.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,

    /// Libraries and executables assembled from components.
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
}

/// A binary blob turned into a C header.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HeaderSpec {
    /// The blob to embed.
    pub input: Utf8PathBuf,
    /// C identifier of the generated array.
    pub symbol: String,
    /// Path of the generated header.
    pub output: Utf8PathBuf,
}

/// A nested build file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SubninjaSpec {
    /// Name used by targets to reference this subninja.
    pub name: String,
    /// Directory containing the nested `build.ninja`.
    pub dir: Utf8PathBuf,
    /// Artifacts relative to `dir`.
    #[serde(default)]
    pub artifacts: Vec<Utf8PathBuf>,
}

/// A named group of sources.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    /// Name used by targets to reference this component.
    pub name: String,
    /// Directory prefix joined onto every source.
    #[serde(default)]
    pub dir: Option<Utf8PathBuf>,
    /// Sources in compile order.
    #[serde(default)]
    pub sources: Vec<Utf8PathBuf>,
    /// Compile flags shared by every source.
    #[serde(default)]
    pub cflags: String,
    /// Paths that must exist before any source compiles.
    #[serde(default)]
    pub order_deps: Option<Vec<Utf8PathBuf>>,
}

/// Kind of linked artifact.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A shared library.
    Library,
    /// An executable.
    Executable,
}

/// A library or executable.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TargetSpec {
    /// Path of the produced artifact.
    pub output: Utf8PathBuf,
    /// Library or executable.
    pub kind: TargetKind,
    /// Components whose objects are linked, in order.
    #[serde(default)]
    pub components: Vec<String>,
    /// Subninjas whose artifacts are linked after the components.
    #[serde(default)]
    pub subninjas: Vec<String>,
    /// Extra object paths linked last.
    #[serde(default)]
    pub objects: Vec<Utf8PathBuf>,
    /// Linker flags.
    #[serde(default)]
    pub ldflags: String,
}
