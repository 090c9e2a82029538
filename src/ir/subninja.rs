//! Inclusion of nested build files.

use camino::{Utf8Path, Utf8PathBuf};

use super::{BuildGraph, IrGenError, Statement, graph::check_path};

/// File name of the nested build file inside its directory.
const NESTED_BUILD_FILE: &str = "build.ninja";

impl BuildGraph {
    /// Include the build file in `dir` and return `artifacts` rewritten
    /// relative to the including graph.
    ///
    /// The nested file is neither read nor validated. Its artifacts are
    /// recorded as claimed so no local edge can produce them again.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError::DuplicateSubninja`] when `dir` is already
    /// included, [`IrGenError::UnrepresentablePath`] when `dir` or an
    /// artifact cannot be written to a build file, or
    /// [`IrGenError::DuplicateOutput`] when an artifact path is already
    /// claimed.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::{Utf8Path, Utf8PathBuf};
    /// use carve::ir::BuildGraph;
    ///
    /// let mut graph = BuildGraph::new();
    /// let libs = graph
    ///     .subninja(Utf8Path::new("external/zlib"), &[Utf8PathBuf::from("libz.a")])
    ///     .unwrap();
    /// assert_eq!(libs, [Utf8PathBuf::from("external/zlib/libz.a")]);
    /// ```
    pub fn subninja(
        &mut self,
        dir: &Utf8Path,
        artifacts: &[Utf8PathBuf],
    ) -> Result<Vec<Utf8PathBuf>, IrGenError> {
        check_path(dir)?;
        for artifact in artifacts {
            check_path(artifact)?;
        }
        if self.subninja_dirs.contains(dir) {
            return Err(IrGenError::DuplicateSubninja {
                dir: dir.to_owned(),
            });
        }
        let rewritten: Vec<Utf8PathBuf> = artifacts.iter().map(|a| dir.join(a)).collect();
        self.claim_external(&rewritten)?;

        let build_file = dir.join(NESTED_BUILD_FILE);
        tracing::debug!(file = %build_file, artifacts = rewritten.len(), "include subninja");
        self.subninja_dirs.insert(dir.to_owned());
        self.statements.push(Statement::Subninja(build_file));
        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("external/zlib", "libz.a", "external/zlib/libz.a")]
    #[case("external/zlib/", "libz.a", "external/zlib/libz.a")]
    #[case("../sibling", "out/libfoo.so", "../sibling/out/libfoo.so")]
    fn prefixes_artifacts_with_directory(
        #[case] dir: &str,
        #[case] artifact: &str,
        #[case] expected: &str,
    ) {
        let mut graph = BuildGraph::new();
        let libs = graph
            .subninja(Utf8Path::new(dir), &[Utf8PathBuf::from(artifact)])
            .expect("subninja");
        assert_eq!(libs, [Utf8PathBuf::from(expected)]);
        assert!(graph.is_claimed(Utf8Path::new(expected)));
    }

    #[test]
    fn records_statement_in_order() {
        let mut graph = BuildGraph::new();
        graph
            .subninja(Utf8Path::new("a"), &[])
            .expect("first");
        graph
            .subninja(Utf8Path::new("b"), &[])
            .expect("second");
        assert_eq!(
            graph.statements(),
            [
                Statement::Subninja("a/build.ninja".into()),
                Statement::Subninja("b/build.ninja".into()),
            ]
        );
    }

    #[test]
    fn rejects_repeated_directory() {
        let mut graph = BuildGraph::new();
        graph.subninja(Utf8Path::new("a"), &[]).expect("first");
        let err = graph
            .subninja(Utf8Path::new("a"), &[])
            .expect_err("repeat");
        assert_eq!(err, IrGenError::DuplicateSubninja { dir: "a".into() });
    }

    #[test]
    fn rejects_artifact_claimed_twice() {
        let mut graph = BuildGraph::new();
        graph
            .subninja(Utf8Path::new("a"), &[Utf8PathBuf::from("lib.a"), Utf8PathBuf::from("lib.a")])
            .expect_err("repeat artifact");
        assert!(graph.statements().is_empty());
    }

    #[rstest]
    #[case("", "libz.a")]
    #[case("ext|zlib", "libz.a")]
    #[case("external/zlib", "")]
    #[case("external/zlib", "lib\nz.a")]
    fn rejects_unwritable_paths(#[case] dir: &str, #[case] artifact: &str) {
        let mut graph = BuildGraph::new();
        let err = graph
            .subninja(Utf8Path::new(dir), &[Utf8PathBuf::from(artifact)])
            .expect_err("unwritable path");
        assert!(matches!(err, IrGenError::UnrepresentablePath { .. }), "{err:?}");
        assert!(graph.statements().is_empty());
    }
}
