//! Intermediate Representation structures.
//!
//! This module defines the build graph synthesised from a manifest. The
//! graph records rule templates, build edges and nested build inclusions as
//! structured data; [`crate::ninja_gen`] turns it into text.
//!
//! # Examples
//!
//! ```
//! use camino::Utf8PathBuf;
//! use carve::ir::{BuildGraph, Component, LinkTarget, rules::standard_rules};
//!
//! let mut graph = BuildGraph::new();
//! for rule in standard_rules() {
//!     graph.declare_rule(rule).unwrap();
//! }
//! let component = Component::new("x", vec!["m.c".into(), "n.cpp".into()], "-O2");
//! let objects = graph.compile(&component).unwrap();
//! graph.link(&LinkTarget::library("libx.so", objects, "")).unwrap();
//! assert_eq!(graph.edges().count(), 3);
//! ```

pub mod codegen;
mod component;
mod from_manifest;
mod graph;
mod link;
pub mod rules;
mod subninja;
mod tool;

pub use codegen::{Generated, Generator};
pub use component::{CompileOptions, Component};
pub use graph::{BuildEdge, BuildGraph, IrGenError, RuleTemplate, Statement};
pub use link::{LinkKind, LinkTarget};
pub use tool::CompileTool;
