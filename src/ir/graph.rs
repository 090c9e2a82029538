//! Build graph records and the edge emitter.
//!
//! [`BuildGraph`] accumulates rule templates, build edges and `subninja`
//! statements in the order they are produced. Every edge-producing operation
//! goes through [`BuildGraph::emit`], which consults a registry of claimed
//! output paths so that no two edges can ever produce the same file.

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use miette::Diagnostic;
use thiserror::Error;

/// A named command template referenced by build edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTemplate {
    /// Identifier used by edges to reference this rule.
    pub name: String,
    /// Command line with Ninja placeholders such as `$in` and `$out`.
    pub command: String,
}

impl RuleTemplate {
    /// Create a rule template from a name and command.
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }
}

/// A single build statement: one rule applied to specific inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEdge {
    /// Name of the [`RuleTemplate`] executed by this edge.
    pub rule: String,
    /// Primary outputs, available to the rule as `$out`.
    pub outputs: Vec<Utf8PathBuf>,
    /// Side outputs the rule produces without naming them in `$out`.
    pub implicit_outputs: Vec<Utf8PathBuf>,
    /// Explicit inputs, available to the rule as `$in`.
    pub inputs: Vec<Utf8PathBuf>,
    /// Paths that must exist before the edge runs but never trigger a rebuild.
    pub order_only_deps: Vec<Utf8PathBuf>,
    /// Edge-scoped variable bindings.
    pub vars: IndexMap<String, String>,
}

impl BuildEdge {
    /// Start an edge for `rule` producing `output` from `input`.
    #[must_use]
    pub fn new(rule: &str, output: impl Into<Utf8PathBuf>, input: impl Into<Utf8PathBuf>) -> Self {
        Self {
            rule: rule.to_owned(),
            outputs: vec![output.into()],
            inputs: vec![input.into()],
            ..Self::default()
        }
    }

    /// Bind an edge-scoped variable.
    #[must_use]
    pub fn with_var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.insert(name.to_owned(), value.into());
        self
    }

    /// Attach order-only prerequisites.
    #[must_use]
    pub fn with_order_only(mut self, deps: &[Utf8PathBuf]) -> Self {
        self.order_only_deps.extend_from_slice(deps);
        self
    }

    /// Iterate over every path this edge claims, explicit and implicit.
    pub fn all_outputs(&self) -> impl Iterator<Item = &Utf8PathBuf> {
        self.outputs.iter().chain(&self.implicit_outputs)
    }

    fn display_name(&self) -> String {
        self.outputs
            .first()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// One top-level statement of the generated build file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// A `build` edge.
    Build(BuildEdge),
    /// A `subninja` inclusion of a nested build file.
    Subninja(Utf8PathBuf),
}

/// The complete build graph produced by one assembly run.
#[derive(Debug, Default, Clone)]
pub struct BuildGraph {
    pub(crate) vars: IndexMap<String, String>,
    pub(crate) rules: IndexMap<String, RuleTemplate>,
    pub(crate) statements: Vec<Statement>,
    claimed: HashSet<Utf8PathBuf>,
    pub(crate) subninja_dirs: HashSet<Utf8PathBuf>,
}

/// Errors produced while synthesising the build graph.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum IrGenError {
    /// A source file has no compile tool or generator for its extension.
    #[error("no compile tool for '{path}'")]
    #[diagnostic(
        code(carve::ir::unsupported_extension),
        help("supported extensions are .c, .cc, .cpp, .proto, .yy and .ll")
    )]
    UnsupportedExtension {
        /// The offending source path.
        path: Utf8PathBuf,
    },

    /// An edge names a rule that was never declared.
    #[error("build edge for '{output}' references undeclared rule '{rule}'")]
    #[diagnostic(code(carve::ir::unknown_rule))]
    UnknownRule {
        /// The missing rule name.
        rule: String,
        /// First output of the offending edge.
        output: String,
    },

    /// The same rule name was declared twice.
    #[error("rule '{name}' is declared more than once")]
    #[diagnostic(code(carve::ir::duplicate_rule))]
    DuplicateRule {
        /// The repeated rule name.
        name: String,
    },

    /// An edge has no explicit inputs.
    #[error("build edge for '{output}' using rule '{rule}' has no inputs")]
    #[diagnostic(code(carve::ir::empty_inputs))]
    EmptyInputs {
        /// Rule of the offending edge.
        rule: String,
        /// First output of the offending edge.
        output: String,
    },

    /// An edge has no outputs.
    #[error("build edge using rule '{rule}' has no outputs")]
    #[diagnostic(code(carve::ir::empty_outputs))]
    EmptyOutputs {
        /// Rule of the offending edge.
        rule: String,
    },

    /// A path appears both as an explicit input and an order-only prerequisite.
    #[error("'{path}' is both an input and an order-only prerequisite of '{output}'")]
    #[diagnostic(code(carve::ir::overlapping_order_only))]
    OverlappingOrderOnly {
        /// The repeated path.
        path: Utf8PathBuf,
        /// First output of the offending edge.
        output: String,
    },

    /// Two edges claim the same output path.
    #[error("output '{output}' is produced by more than one build edge")]
    #[diagnostic(
        code(carve::ir::duplicate_output),
        help("each output path may be produced by exactly one edge")
    )]
    DuplicateOutput {
        /// The contested output path.
        output: Utf8PathBuf,
    },

    /// An object is listed twice as input of one link target.
    #[error("'{input}' is listed more than once as an input of '{output}'")]
    #[diagnostic(code(carve::ir::duplicate_input))]
    DuplicateInput {
        /// The link target.
        output: Utf8PathBuf,
        /// The repeated object path.
        input: Utf8PathBuf,
    },

    /// A component was configured without sources.
    #[error("component '{name}' has no sources")]
    #[diagnostic(code(carve::ir::empty_component))]
    EmptyComponent {
        /// The component name.
        name: String,
    },

    /// A link target has nothing to link.
    #[error("link target '{output}' has no object inputs")]
    #[diagnostic(code(carve::ir::empty_link_target))]
    EmptyLinkTarget {
        /// The link target.
        output: Utf8PathBuf,
    },

    /// The same nested build directory was included twice.
    #[error("subninja '{dir}' is included more than once")]
    #[diagnostic(code(carve::ir::duplicate_subninja))]
    DuplicateSubninja {
        /// The nested build directory.
        dir: Utf8PathBuf,
    },

    /// Two configuration entries of the same kind share a name.
    #[error("{kind} '{name}' is defined more than once")]
    #[diagnostic(code(carve::ir::duplicate_name))]
    DuplicateName {
        /// Kind of entry, such as `component`.
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// A link target references an unknown component.
    #[error("target '{target}' references unknown component '{component}'")]
    #[diagnostic(code(carve::ir::unknown_component))]
    UnknownComponent {
        /// The link target.
        target: Utf8PathBuf,
        /// The missing component.
        component: String,
    },

    /// A link target references an unknown subninja.
    #[error("target '{target}' references unknown subninja '{subninja}'")]
    #[diagnostic(code(carve::ir::unknown_subninja))]
    UnknownSubninja {
        /// The link target.
        target: Utf8PathBuf,
        /// The missing subninja name.
        subninja: String,
    },

    /// A path cannot be written to a build file unambiguously.
    #[error("path {path:?} {problem}")]
    #[diagnostic(
        code(carve::ir::unrepresentable_path),
        help("build file paths must be non-empty and free of '|', NUL and line breaks")
    )]
    UnrepresentablePath {
        /// The rejected path.
        path: String,
        /// What makes the path unusable.
        problem: &'static str,
    },

    /// A variable value would spill onto a new line of the build file.
    #[error("value of '{name}' contains a line break")]
    #[diagnostic(code(carve::ir::multiline_value))]
    MultilineValue {
        /// The variable name.
        name: String,
    },

    /// An embedded blob symbol is not a valid C identifier.
    #[error("'{symbol}' is not a valid C identifier")]
    #[diagnostic(code(carve::ir::invalid_symbol))]
    InvalidSymbol {
        /// The rejected symbol.
        symbol: String,
    },
}

impl IrGenError {
    /// Whether the error stems from bad configuration data rather than an
    /// unsupported file type.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        !matches!(self, Self::UnsupportedExtension { .. })
    }
}

/// Reject paths Ninja would split or misread.
///
/// Ninja has no escape for `|` or line breaks in paths, and an empty path
/// leaves a dangling separator.
pub(crate) fn check_path(path: &Utf8Path) -> Result<(), IrGenError> {
    let problem = if path.as_str().is_empty() {
        "is empty"
    } else if path.as_str().contains(['\n', '\r']) {
        "contains a line break"
    } else if path.as_str().contains('|') {
        "contains '|'"
    } else if path.as_str().contains('\0') {
        "contains a NUL byte"
    } else {
        return Ok(());
    };
    Err(IrGenError::UnrepresentablePath {
        path: path.to_string(),
        problem,
    })
}

/// Reject variable values that would break out of their binding line.
pub(crate) fn check_value(name: &str, value: &str) -> Result<(), IrGenError> {
    if value.contains(['\n', '\r']) {
        return Err(IrGenError::MultilineValue {
            name: name.to_owned(),
        });
    }
    Ok(())
}

impl BuildGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a global variable emitted ahead of the rule declarations.
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Declare a rule template.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError::DuplicateRule`] if the name is already declared.
    pub fn declare_rule(&mut self, rule: RuleTemplate) -> Result<(), IrGenError> {
        if self.rules.contains_key(&rule.name) {
            return Err(IrGenError::DuplicateRule { name: rule.name });
        }
        self.rules.insert(rule.name.clone(), rule);
        Ok(())
    }

    /// Append a build edge after validating it against the graph.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError`] when the rule is undeclared, inputs or outputs
    /// are empty, a path or binding cannot be written to a build file, a path
    /// is both an input and an order-only prerequisite, or an output is
    /// already claimed. The graph is left untouched on error.
    pub fn emit(&mut self, edge: BuildEdge) -> Result<(), IrGenError> {
        if !self.rules.contains_key(&edge.rule) {
            return Err(IrGenError::UnknownRule {
                output: edge.display_name(),
                rule: edge.rule,
            });
        }
        if edge.outputs.is_empty() {
            return Err(IrGenError::EmptyOutputs { rule: edge.rule });
        }
        if edge.inputs.is_empty() {
            return Err(IrGenError::EmptyInputs {
                output: edge.display_name(),
                rule: edge.rule,
            });
        }
        for path in edge
            .all_outputs()
            .chain(&edge.inputs)
            .chain(&edge.order_only_deps)
        {
            check_path(path)?;
        }
        for (name, value) in &edge.vars {
            check_value(name, value)?;
        }
        if let Some(path) = edge
            .order_only_deps
            .iter()
            .find(|dep| edge.inputs.contains(dep))
        {
            return Err(IrGenError::OverlappingOrderOnly {
                path: path.clone(),
                output: edge.display_name(),
            });
        }
        self.check_unclaimed(edge.all_outputs())?;

        self.claimed.extend(edge.all_outputs().cloned());
        tracing::debug!(rule = %edge.rule, output = %edge.display_name(), "emit build edge");
        self.statements.push(Statement::Build(edge));
        Ok(())
    }

    /// Record paths produced outside this graph so local edges cannot claim
    /// them again.
    pub(crate) fn claim_external<'a>(
        &mut self,
        paths: impl IntoIterator<Item = &'a Utf8PathBuf> + Clone,
    ) -> Result<(), IrGenError> {
        for path in paths.clone() {
            check_path(path)?;
        }
        self.check_unclaimed(paths.clone())?;
        self.claimed.extend(paths.into_iter().cloned());
        Ok(())
    }

    fn check_unclaimed<'a>(
        &self,
        paths: impl IntoIterator<Item = &'a Utf8PathBuf>,
    ) -> Result<(), IrGenError> {
        let mut local: HashSet<&Utf8Path> = HashSet::new();
        for path in paths {
            if self.claimed.contains(path) || !local.insert(path.as_path()) {
                return Err(IrGenError::DuplicateOutput {
                    output: path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Whether `path` is already produced by some edge or nested graph.
    #[must_use]
    pub fn is_claimed(&self, path: &Utf8Path) -> bool {
        self.claimed.contains(path)
    }

    /// Global variables in declaration order.
    #[must_use]
    pub const fn vars(&self) -> &IndexMap<String, String> {
        &self.vars
    }

    /// Declared rule templates in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &RuleTemplate> {
        self.rules.values()
    }

    /// All statements in emission order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Build edges in emission order.
    pub fn edges(&self) -> impl Iterator<Item = &BuildEdge> {
        self.statements.iter().filter_map(|stmt| match stmt {
            Statement::Build(edge) => Some(edge),
            Statement::Subninja(_) => None,
        })
    }

    /// Find the edge producing `output`, explicit or implicit.
    #[must_use]
    pub fn edge_for(&self, output: &Utf8Path) -> Option<&BuildEdge> {
        self.edges()
            .find(|edge| edge.all_outputs().any(|out| out == output))
    }
}
