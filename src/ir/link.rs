//! Library and executable aggregation.

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};

use super::{BuildEdge, BuildGraph, IrGenError};

/// Kind of artifact produced by a [`LinkTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// A shared library, rule `lib`.
    SharedLibrary,
    /// An executable, rule `link`.
    Executable,
}

impl LinkKind {
    /// Name of the rule template producing this kind of artifact.
    #[must_use]
    pub const fn rule(self) -> &'static str {
        match self {
            Self::SharedLibrary => "lib",
            Self::Executable => "link",
        }
    }
}

/// A library or executable assembled from object files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    /// Path of the produced artifact.
    pub output: Utf8PathBuf,
    /// Objects in link order.
    pub objects: Vec<Utf8PathBuf>,
    /// Flags bound to the `ldflags` variable.
    pub ldflags: String,
    /// Library or executable.
    pub kind: LinkKind,
}

impl LinkTarget {
    /// Describe a shared library.
    #[must_use]
    pub fn library(
        output: impl Into<Utf8PathBuf>,
        objects: Vec<Utf8PathBuf>,
        ldflags: impl Into<String>,
    ) -> Self {
        Self {
            output: output.into(),
            objects,
            ldflags: ldflags.into(),
            kind: LinkKind::SharedLibrary,
        }
    }

    /// Describe an executable.
    #[must_use]
    pub fn executable(
        output: impl Into<Utf8PathBuf>,
        objects: Vec<Utf8PathBuf>,
        ldflags: impl Into<String>,
    ) -> Self {
        Self {
            kind: LinkKind::Executable,
            ..Self::library(output, objects, ldflags)
        }
    }

    fn first_duplicate(&self) -> Option<&Utf8PathBuf> {
        let mut seen: HashSet<&Utf8Path> = HashSet::new();
        self.objects.iter().find(|obj| !seen.insert(obj.as_path()))
    }
}

impl BuildGraph {
    /// Emit the `lib` or `link` edge for `target`.
    ///
    /// Objects keep the order given by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError::EmptyLinkTarget`] when there are no objects,
    /// [`IrGenError::DuplicateInput`] when an object is listed twice, and any
    /// error raised while emitting the edge.
    pub fn link(&mut self, target: &LinkTarget) -> Result<(), IrGenError> {
        if target.objects.is_empty() {
            return Err(IrGenError::EmptyLinkTarget {
                output: target.output.clone(),
            });
        }
        if let Some(dup) = target.first_duplicate() {
            return Err(IrGenError::DuplicateInput {
                output: target.output.clone(),
                input: dup.clone(),
            });
        }
        let mut edge = BuildEdge {
            rule: target.kind.rule().to_owned(),
            outputs: vec![target.output.clone()],
            inputs: target.objects.clone(),
            ..BuildEdge::default()
        };
        edge.vars.insert("ldflags".to_owned(), target.ldflags.clone());
        self.emit(edge)
    }
}
