//! Per-component compilation.

use camino::{Utf8Path, Utf8PathBuf};

use super::codegen::Generator;
use super::{BuildEdge, BuildGraph, CompileTool, IrGenError};

/// Options shared by every compile edge of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Paths that must exist before any source of the component compiles,
    /// such as embedded-blob headers. `None` and an empty list behave alike.
    pub order_deps: Option<Vec<Utf8PathBuf>>,
}

/// A named group of sources compiled with the same flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Name used to reference the component from link targets.
    pub name: String,
    /// Sources in compile order.
    pub sources: Vec<Utf8PathBuf>,
    /// Flags bound to the `cflags` variable of each compile edge.
    pub cflags: String,
    /// Additional compile options.
    pub options: CompileOptions,
}

impl Component {
    /// Create a component without order-only prerequisites.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        sources: Vec<Utf8PathBuf>,
        cflags: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sources,
            cflags: cflags.into(),
            options: CompileOptions::default(),
        }
    }

    /// Build a component whose sources live under `dir`.
    ///
    /// ```
    /// use carve::ir::Component;
    ///
    /// let c = Component::in_dir("libbase", "system/core/base", &["file.cpp"], "-fPIC");
    /// assert_eq!(c.sources[0], "system/core/base/file.cpp");
    /// ```
    #[must_use]
    pub fn in_dir(
        name: impl Into<String>,
        dir: impl AsRef<Utf8Path>,
        files: &[&str],
        cflags: impl Into<String>,
    ) -> Self {
        let sources = files.iter().map(|f| dir.as_ref().join(f)).collect();
        Self::new(name, sources, cflags)
    }

    /// Require `deps` to exist before any source of this component compiles.
    #[must_use]
    pub fn with_order_deps(mut self, deps: Vec<Utf8PathBuf>) -> Self {
        self.options.order_deps = Some(deps);
        self
    }

    fn order_deps(&self) -> &[Utf8PathBuf] {
        self.options.order_deps.as_deref().unwrap_or_default()
    }
}

/// Object file produced by compiling `source`.
pub(crate) fn object_path(source: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{source}.o"))
}

pub(crate) fn compile_edge(
    tool: CompileTool,
    source: &Utf8Path,
    cflags: String,
    order_deps: &[Utf8PathBuf],
) -> BuildEdge {
    BuildEdge::new(tool.rule(), object_path(source), source)
        .with_order_only(order_deps)
        .with_var("cflags", cflags)
}

impl BuildGraph {
    /// Emit compile edges for every source of `component`.
    ///
    /// Sources with a generator extension go through the matching adapter;
    /// all others are compiled directly. Returns one object per source in
    /// source order.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError::EmptyComponent`] for a component without sources,
    /// [`IrGenError::UnsupportedExtension`] for unknown source types, and any
    /// error raised while emitting edges.
    pub fn compile(&mut self, component: &Component) -> Result<Vec<Utf8PathBuf>, IrGenError> {
        if component.sources.is_empty() {
            return Err(IrGenError::EmptyComponent {
                name: component.name.clone(),
            });
        }
        tracing::debug!(
            component = %component.name,
            sources = component.sources.len(),
            "compile component"
        );
        component
            .sources
            .iter()
            .map(|source| self.compile_source(source, &component.cflags, component.order_deps()))
            .collect()
    }

    fn compile_source(
        &mut self,
        source: &Utf8Path,
        cflags: &str,
        order_deps: &[Utf8PathBuf],
    ) -> Result<Utf8PathBuf, IrGenError> {
        if let Some(generator) = Generator::for_source(source) {
            return Ok(self.generate(generator, source, cflags, order_deps)?.object);
        }
        let tool = CompileTool::for_source(source)?;
        self.emit(compile_edge(tool, source, cflags.to_owned(), order_deps))?;
        Ok(object_path(source))
    }
}
