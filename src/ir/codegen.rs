//! Code generator adapters.
//!
//! Each adapter derives its output names from the input path alone, emits a
//! generate edge, and (except for the blob embedder) a compile edge for the
//! generated source. Derived names keep the input's directory and replace its
//! final extension: `a/b.proto` becomes `a/b.pb.cc` and `a/b.pb.h`.

use camino::{Utf8Path, Utf8PathBuf};

use super::component::{compile_edge, object_path};
use super::{BuildEdge, BuildGraph, CompileTool, IrGenError};

/// Include flag passed to every compile of generated code so that generated
/// headers resolve relative to the build root.
const INCLUDE_ROOT: &str = "-I.";

/// Source generators recognised by their input extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generator {
    /// Protocol buffer compiler, `.proto` inputs.
    Protoc,
    /// Parser generator, `.yy` inputs.
    Yacc,
    /// Lexer generator, `.ll` inputs.
    Lex,
}

impl Generator {
    /// Select the generator for `path`, if its extension names one.
    #[must_use]
    pub fn for_source(path: &Utf8Path) -> Option<Self> {
        match path.extension()? {
            "proto" => Some(Self::Protoc),
            "yy" => Some(Self::Yacc),
            "ll" => Some(Self::Lex),
            _ => None,
        }
    }

    /// Name of the rule template running this generator.
    #[must_use]
    pub const fn rule(self) -> &'static str {
        match self {
            Self::Protoc => "protoc",
            Self::Yacc => "yacc",
            Self::Lex => "lex",
        }
    }
}

/// Files produced by a generate-then-compile chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Generated source files.
    pub sources: Vec<Utf8PathBuf>,
    /// Generated headers.
    pub headers: Vec<Utf8PathBuf>,
    /// Object compiled from the generated source.
    pub object: Utf8PathBuf,
}

impl Generated {
    /// Every generated path, headers first, object last.
    pub fn files(&self) -> impl Iterator<Item = &Utf8PathBuf> {
        self.headers
            .iter()
            .chain(&self.sources)
            .chain(std::iter::once(&self.object))
    }
}

/// Replace the final extension of `source` with `suffix`.
fn derive(source: &Utf8Path, suffix: &str) -> Utf8PathBuf {
    let base = source.with_extension("");
    Utf8PathBuf::from(format!("{base}{suffix}"))
}

fn generated_cflags(cflags: &str) -> String {
    if cflags.is_empty() {
        INCLUDE_ROOT.to_owned()
    } else {
        format!("{INCLUDE_ROOT} {cflags}")
    }
}

fn is_c_identifier(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl BuildGraph {
    /// Run `generator` on `source` and compile the result.
    ///
    /// `cflags` is ignored by [`Generator::Protoc`], whose output is always
    /// compiled with the include root only.
    ///
    /// # Errors
    ///
    /// Propagates any [`IrGenError`] raised while emitting the edges.
    pub fn generate(
        &mut self,
        generator: Generator,
        source: &Utf8Path,
        cflags: &str,
        order_deps: &[Utf8PathBuf],
    ) -> Result<Generated, IrGenError> {
        match generator {
            Generator::Protoc => self.protoc(source, order_deps),
            Generator::Yacc => self.yacc(source, cflags, order_deps),
            Generator::Lex => self.lex(source, cflags, order_deps),
        }
    }

    /// Generate `<base>.pb.cc` and `<base>.pb.h` from a `.proto` file and
    /// compile the generated source.
    ///
    /// # Errors
    ///
    /// Propagates any [`IrGenError`] raised while emitting the edges.
    pub fn protoc(
        &mut self,
        source: &Utf8Path,
        order_deps: &[Utf8PathBuf],
    ) -> Result<Generated, IrGenError> {
        let cfile = derive(source, ".pb.cc");
        let hfile = derive(source, ".pb.h");
        let mut generate = BuildEdge::new(Generator::Protoc.rule(), cfile.clone(), source);
        generate.outputs.push(hfile.clone());
        self.emit(generate)?;

        let object = object_path(&cfile);
        self.emit(compile_edge(
            CompileTool::Cxx,
            &cfile,
            INCLUDE_ROOT.to_owned(),
            order_deps,
        ))?;
        Ok(Generated {
            sources: vec![cfile],
            headers: vec![hfile],
            object,
        })
    }

    /// Generate `<base>.cpp` and `<base>.h` from a `.yy` grammar and compile
    /// the parser.
    ///
    /// The header is a side output: it is bound to the rule's `header`
    /// variable and declared as an implicit output of the generate edge.
    ///
    /// # Errors
    ///
    /// Propagates any [`IrGenError`] raised while emitting the edges.
    pub fn yacc(
        &mut self,
        source: &Utf8Path,
        cflags: &str,
        order_deps: &[Utf8PathBuf],
    ) -> Result<Generated, IrGenError> {
        let cfile = derive(source, ".cpp");
        let hfile = derive(source, ".h");
        let mut generate = BuildEdge::new(Generator::Yacc.rule(), cfile.clone(), source)
            .with_var("header", hfile.as_str());
        generate.implicit_outputs.push(hfile.clone());
        self.emit(generate)?;

        let object = self.compile_generated(&cfile, cflags, order_deps)?;
        Ok(Generated {
            sources: vec![cfile],
            headers: vec![hfile],
            object,
        })
    }

    /// Generate `<base>.cpp` from a `.ll` lexer and compile it.
    ///
    /// # Errors
    ///
    /// Propagates any [`IrGenError`] raised while emitting the edges.
    pub fn lex(
        &mut self,
        source: &Utf8Path,
        cflags: &str,
        order_deps: &[Utf8PathBuf],
    ) -> Result<Generated, IrGenError> {
        let cfile = derive(source, ".cpp");
        self.emit(BuildEdge::new(Generator::Lex.rule(), cfile.clone(), source))?;

        let object = self.compile_generated(&cfile, cflags, order_deps)?;
        Ok(Generated {
            sources: vec![cfile],
            headers: Vec::new(),
            object,
        })
    }

    /// Embed the bytes of `input` into `output` as an `unsigned char` array
    /// named `symbol`, returning the header path for use as an order-only
    /// prerequisite.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError::InvalidSymbol`] when `symbol` is not a C
    /// identifier, or any error raised while emitting the edge.
    pub fn genheader(
        &mut self,
        input: &Utf8Path,
        symbol: &str,
        output: &Utf8Path,
    ) -> Result<Utf8PathBuf, IrGenError> {
        if !is_c_identifier(symbol) {
            return Err(IrGenError::InvalidSymbol {
                symbol: symbol.to_owned(),
            });
        }
        self.emit(BuildEdge::new("genheader", output, input).with_var("var", symbol))?;
        Ok(output.to_owned())
    }

    fn compile_generated(
        &mut self,
        cfile: &Utf8Path,
        cflags: &str,
        order_deps: &[Utf8PathBuf],
    ) -> Result<Utf8PathBuf, IrGenError> {
        self.emit(compile_edge(
            CompileTool::Cxx,
            cfile,
            generated_cflags(cflags),
            order_deps,
        ))?;
        Ok(object_path(cfile))
    }
}
