//! Source extension dispatch.

use camino::Utf8Path;

use super::IrGenError;

/// Compiler used to turn a single source file into an object file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileTool {
    /// The C compiler, rule `cc`.
    C,
    /// The C++ compiler, rule `cxx`.
    Cxx,
}

const EXTENSIONS: [(&str, CompileTool); 3] = [
    ("c", CompileTool::C),
    ("cpp", CompileTool::Cxx),
    ("cc", CompileTool::Cxx),
];

impl CompileTool {
    /// Select the compile tool for `path` by its exact, case-sensitive
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError::UnsupportedExtension`] for any extension outside
    /// `.c`, `.cpp` and `.cc`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use carve::ir::CompileTool;
    ///
    /// let tool = CompileTool::for_source(Utf8Path::new("lib/a.cc")).unwrap();
    /// assert_eq!(tool, CompileTool::Cxx);
    /// assert!(CompileTool::for_source(Utf8Path::new("lib/a.C")).is_err());
    /// ```
    pub fn for_source(path: &Utf8Path) -> Result<Self, IrGenError> {
        path.extension()
            .and_then(|ext| {
                EXTENSIONS
                    .iter()
                    .find_map(|(known, tool)| (*known == ext).then_some(*tool))
            })
            .ok_or_else(|| IrGenError::UnsupportedExtension {
                path: path.to_owned(),
            })
    }

    /// Name of the rule template invoking this tool.
    #[must_use]
    pub const fn rule(self) -> &'static str {
        match self {
            Self::C => "cc",
            Self::Cxx => "cxx",
        }
    }
}
