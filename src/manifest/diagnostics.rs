//! Diagnostics for manifests that fail to parse.
//!
//! Parser failures are classified into the mistakes people actually make in
//! a carve manifest, and the classification picks the help text shown under
//! the highlighted token.

use miette::{Diagnostic, NamedSource, SourceSpan};
use semver::Version;
use serde_saphyr::Error as YamlError;
use thiserror::Error;

/// Error raised when a manifest cannot be loaded.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    /// Parsing or deserialisation failed.
    #[error("failed to parse manifest '{name}'")]
    #[diagnostic(code(carve::manifest::parse))]
    Parse {
        /// Label of the manifest.
        name: String,
        /// Underlying diagnostic reported by the parser.
        #[source]
        #[diagnostic_source]
        source: Box<dyn Diagnostic + Send + Sync + 'static>,
    },

    /// The manifest format version is not supported.
    #[error("manifest '{name}' declares carve_version {found}, expected {expected_major}.x")]
    #[diagnostic(code(carve::manifest::version))]
    UnsupportedVersion {
        /// Label of the manifest.
        name: String,
        /// Version declared by the manifest.
        found: Version,
        /// Supported major version.
        expected_major: u64,
    },
}

/// Kinds of manifest mistake that get a dedicated hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mistake {
    TabIndent,
    UnknownSection,
    UnknownKey,
    UnknownKind,
    MissingVersion,
    BadVersion,
    Syntax,
}

impl Mistake {
    fn classify(message: &str, line: Option<&str>) -> Self {
        let line = line.unwrap_or_default();
        let message = message.to_lowercase();
        if message.contains("unknown variant") {
            Self::UnknownKind
        } else if message.contains("unknown field") {
            if message.contains("`carve_version`") {
                Self::UnknownSection
            } else {
                Self::UnknownKey
            }
        } else if line.trim_start_matches(' ').starts_with('\t') || message.contains("tab character") {
            Self::TabIndent
        } else if message.contains("missing field `carve_version`") {
            Self::MissingVersion
        } else if message.contains("version number") || line.starts_with("carve_version") {
            Self::BadVersion
        } else {
            Self::Syntax
        }
    }

    const fn help(self) -> Option<&'static str> {
        match self {
            Self::TabIndent => Some("Indent with spaces; YAML rejects tabs."),
            Self::UnknownSection => Some(
                "Top-level sections are carve_version, vars, headers, subninjas, components and targets.",
            ),
            Self::UnknownKey => Some("Check the key's spelling against the entries of that section."),
            Self::UnknownKind => Some("A target kind is either 'library' or 'executable'."),
            Self::MissingVersion => Some("Start the manifest with carve_version: \"1.0.0\"."),
            Self::BadVersion => Some("carve_version takes a quoted semantic version such as \"1.0.0\"."),
            Self::Syntax => None,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(carve::yaml::parse))]
struct ParseDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: Option<SourceSpan>,
    #[help]
    help: Option<&'static str>,
    #[source]
    source: YamlError,
    message: String,
}

/// Highlight the token at a one-based `line` and `column`, or the end of the
/// line when the column points past the last character.
fn token_span(yaml: &str, line: u64, column: u64) -> Option<SourceSpan> {
    let line_no = usize::try_from(line).ok()?.checked_sub(1)?;
    let column = usize::try_from(column).ok()?.saturating_sub(1);
    let line_start: usize = yaml.split_inclusive('\n').take(line_no).map(str::len).sum();
    let line = yaml.get(line_start..)?.lines().next().unwrap_or_default();
    let start = line.char_indices().nth(column).map_or(line.len(), |(i, _)| i);
    let token = line.get(start..).unwrap_or_default();
    let len = token.find(char::is_whitespace).unwrap_or(token.len());
    Some(SourceSpan::new((line_start + start).into(), len))
}

/// Map a `serde_saphyr` error for the manifest `name` into a diagnostic.
#[must_use]
pub fn map_yaml_error(
    err: YamlError,
    yaml: &str,
    name: &str,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    let loc = err.location();
    let line = loc
        .and_then(|l| usize::try_from(l.line()).ok())
        .and_then(|n| yaml.lines().nth(n.saturating_sub(1)));
    let text = err.to_string();
    let help = Mistake::classify(&text, line).help();
    let message = match loc {
        Some(l) => format!("{name}:{}:{}: {text}", l.line(), l.column()),
        None => format!("{name}: {text}"),
    };
    Box::new(ParseDiagnostic {
        src: NamedSource::new(name, yaml.to_owned()),
        span: loc.and_then(|l| token_span(yaml, l.line(), l.column())),
        help,
        source: err,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BuildManifest;
    use rstest::rstest;

    fn diagnose(yaml: &str) -> Box<dyn Diagnostic + Send + Sync + 'static> {
        let err = serde_saphyr::from_str::<BuildManifest>(yaml).expect_err("parse error");
        map_yaml_error(err, yaml, "test.yml")
    }

    fn help_of(yaml: &str) -> String {
        diagnose(yaml).help().map(|h| h.to_string()).unwrap_or_default()
    }

    #[rstest]
    #[case("carve_version: \"1.0.0\"\nrule: []\n", "Top-level sections")]
    #[case(
        "carve_version: \"1.0.0\"\ntargets:\n  - output: a\n    kind: archive\n",
        "'library' or 'executable'"
    )]
    #[case(
        "carve_version: \"1.0.0\"\ncomponents:\n  - name: x\n    source: [a.c]\n",
        "spelling"
    )]
    #[case("carve_version: \"one\"\n", "semantic version")]
    #[case("components: []\n", "Start the manifest with carve_version")]
    fn carve_mistakes_get_specific_help(#[case] yaml: &str, #[case] expected: &str) {
        let help = help_of(yaml);
        assert!(help.contains(expected), "help for {yaml:?} was {help:?}");
    }

    #[rstest]
    fn tab_indentation_is_called_out() {
        let help = help_of("carve_version: \"1.0.0\"\ncomponents:\n\t- name: x\n");
        assert!(help.contains("tabs"), "{help}");
    }

    #[rstest]
    fn message_names_the_manifest() {
        let diag = diagnose("carve_version: \"1.0.0\"\nrule: []\n");
        assert!(diag.to_string().starts_with("test.yml:"), "{diag}");
    }

    #[rstest]
    #[case("carve_version: \"1.0.0\"\nrules: []\n", 2, 1, "rules:")]
    #[case("a: b\r\nkind: archive\r\n", 2, 7, "archive")]
    #[case("name: caf\u{e9} x\n", 1, 12, "x")]
    fn span_covers_the_offending_token(
        #[case] yaml: &str,
        #[case] line: u64,
        #[case] column: u64,
        #[case] token: &str,
    ) {
        let span = token_span(yaml, line, column).expect("span");
        assert_eq!(yaml.get(span.offset()..span.offset() + span.len()), Some(token));
    }

    #[rstest]
    fn classification_ignores_plain_syntax_errors() {
        assert_eq!(Mistake::classify("did not find expected key", Some("  a: [")), Mistake::Syntax);
    }
}
