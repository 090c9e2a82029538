//! Unit tests for Ninja file generation.

use camino::{Utf8Path, Utf8PathBuf};
use carve::ir::{BuildEdge, BuildGraph, Component, LinkTarget, RuleTemplate};
use carve::cli::Cli;
use carve::{manifest, ninja_gen::generate, ninja_gen::generate_rules, runner};
use rstest::rstest;

const BANNER: &str = "# This file is generated by carve. Do not edit.\n\n";

fn graph_with_rule(name: &str, command: &str) -> BuildGraph {
    let mut graph = BuildGraph::new();
    graph
        .declare_rule(RuleTemplate::new(name, command))
        .expect("declare rule");
    graph
}

#[rstest]
fn generate_empty_graph() {
    let graph = BuildGraph::default();
    assert_eq!(generate(&graph), BANNER);
}

#[rstest]
fn generate_standard_build() {
    let mut graph = graph_with_rule("lib", "c++ -shared $in -o $out");
    graph.set_var("LDFLAGS", "@LDFLAGS@");
    graph
        .link(&LinkTarget::library(
            "libx.so",
            vec!["m.c.o".into(), "n.cpp.o".into()],
            "-lz",
        ))
        .expect("link");

    let ninja = generate(&graph);
    let expected = concat!(
        "# This file is generated by carve. Do not edit.\n\n",
        "LDFLAGS = @LDFLAGS@\n\n",
        "rule lib\n",
        "  command = c++ -shared $in -o $out\n\n",
        "build libx.so: lib m.c.o n.cpp.o\n",
        "  ldflags = -lz\n\n",
    );
    assert_eq!(ninja, expected);
}

#[rstest]
fn generate_complex_dependencies() {
    let mut graph = graph_with_rule("yacc", "yacc --defines=$header -o $out $in");
    let mut edge = BuildEdge::new("yacc", "x/y.cpp", "x/y.yy").with_var("header", "x/y.h");
    edge.implicit_outputs.push("x/y.h".into());
    edge.order_only_deps.push("stamp".into());
    graph.emit(edge).expect("emit");

    let ninja = generate(&graph);
    assert!(
        ninja.contains("build x/y.cpp | x/y.h: yacc x/y.yy || stamp\n  header = x/y.h\n\n"),
        "unexpected output:\n{ninja}"
    );
}

#[rstest]
fn order_only_prerequisites_follow_separator() {
    let mut graph = graph_with_rule("cc", "cc $cflags -c $in -o $out");
    let deps: Vec<Utf8PathBuf> = vec!["gen/a.h".into(), "gen/b.h".into()];
    let component =
        Component::new("x", vec!["a.c".into(), "b.c".into()], "").with_order_deps(deps);
    graph.compile(&component).expect("compile");

    let ninja = generate(&graph);
    for line in ninja.lines().filter(|l| l.starts_with("build ")) {
        let (explicit, order_only) = line.split_once(" || ").expect("order-only section");
        assert_eq!(order_only, "gen/a.h gen/b.h");
        assert!(!explicit.contains("gen/"), "prerequisite leaked into inputs: {line}");
    }
}

#[rstest]
fn subninja_statements_keep_their_position() {
    let mut graph = graph_with_rule("cc", "cc -c $in -o $out");
    graph
        .emit(BuildEdge::new("cc", "a.c.o", "a.c"))
        .expect("first");
    graph
        .subninja(Utf8Path::new("external/zlib"), &[])
        .expect("subninja");
    graph
        .emit(BuildEdge::new("cc", "b.c.o", "b.c"))
        .expect("second");

    let ninja = generate(&graph);
    let a = ninja.find("build a.c.o").expect("a");
    let sub = ninja.find("subninja external/zlib/build.ninja\n\n").expect("subninja");
    let b = ninja.find("build b.c.o").expect("b");
    assert!(a < sub && sub < b, "unexpected ordering:\n{ninja}");
}

#[rstest]
fn paths_with_spaces_are_escaped() {
    let mut graph = graph_with_rule("cc", "cc -c $in -o $out");
    graph
        .emit(BuildEdge::new("cc", "my dir/a.c.o", "my dir/a.c"))
        .expect("emit");
    assert!(generate(&graph).contains("build my$ dir/a.c.o: cc my$ dir/a.c\n"));
}

#[rstest]
fn generation_is_idempotent() {
    let build = || {
        let manifest = manifest::embedded().expect("manifest");
        let graph = BuildGraph::from_manifest(&manifest).expect("graph");
        generate(&graph)
    };
    assert_eq!(build(), build());
}

#[rstest]
fn runner_output_is_reproducible() {
    let cli = Cli::try_parse_from_with_default(["carve", "-f", "manifests/dexdump.yml"])
        .expect("parse args");
    let first = runner::generate_ninja(&cli).expect("first run");
    let second = runner::generate_ninja(&cli).expect("second run");
    assert_eq!(first, second);
    assert!(first.contains("build dalvik/dexdump/DexDump.cpp.o: cxx dalvik/dexdump/DexDump.cpp\n"));
}

#[rstest]
fn rules_output_is_a_prefix_of_the_full_file() {
    let manifest = manifest::embedded().expect("manifest");
    let graph = BuildGraph::from_manifest(&manifest).expect("graph");
    let rules = generate_rules(&graph);
    assert!(generate(&graph).starts_with(&rules));
    assert!(!rules.contains("\nbuild "));
}

#[rstest]
fn full_manifest_renders_every_edge_kind() {
    let yaml = r#"
carve_version: "1.0.0"
vars:
  CC: "@CC@"
  CXX: "@CXX@"
headers:
  - input: res/font.bin
    symbol: font_data
    output: gen/font.h
subninjas:
  - name: zlib
    dir: external/zlib
    artifacts: [libz.a]
components:
  - name: core
    dir: src
    sources: [m.c, n.cpp, msg.proto, parse.yy, scan.ll]
    cflags: "-O2"
    order_deps: [gen/font.h]
targets:
  - output: libcore.so
    kind: library
    components: [core]
    subninjas: [zlib]
    ldflags: "-lz"
"#;
    let manifest = manifest::from_str(yaml).expect("parse");
    let graph = BuildGraph::from_manifest(&manifest).expect("graph");
    let ninja = generate(&graph);

    let expected = concat!(
        "# This file is generated by carve. Do not edit.\n\n",
        "CC = @CC@\n",
        "CXX = @CXX@\n\n",
        "rule cc\n",
        "  command = $CC -std=gnu11 $CFLAGS $CPPFLAGS $cflags -c $in -o $out\n\n",
        "rule cxx\n",
        "  command = $CXX -std=gnu++2a $CXXFLAGS $CPPFLAGS $cflags -c $in -o $out\n\n",
        "rule lib\n",
        "  command = $CXX -shared -Wl,-soname,$out $ldflags $LDFLAGS $in -o $out\n\n",
        "rule link\n",
        "  command = $CXX $ldflags $LDFLAGS $in -o $out\n\n",
        "rule protoc\n",
        "  command = protoc --cpp_out=. $in\n\n",
        "rule lex\n",
        "  command = lex -o $out $in\n\n",
        "rule yacc\n",
        "  command = yacc --defines=$header -o $out $in\n\n",
        "rule genheader\n",
        "  command = (echo 'unsigned char $var[] = {' && xxd -i <$in && echo '};') > $out\n\n",
        "build gen/font.h: genheader res/font.bin\n",
        "  var = font_data\n\n",
        "subninja external/zlib/build.ninja\n\n",
        "build src/m.c.o: cc src/m.c || gen/font.h\n",
        "  cflags = -O2\n\n",
        "build src/n.cpp.o: cxx src/n.cpp || gen/font.h\n",
        "  cflags = -O2\n\n",
        "build src/msg.pb.cc src/msg.pb.h: protoc src/msg.proto\n\n",
        "build src/msg.pb.cc.o: cxx src/msg.pb.cc || gen/font.h\n",
        "  cflags = -I.\n\n",
        "build src/parse.cpp | src/parse.h: yacc src/parse.yy\n",
        "  header = src/parse.h\n\n",
        "build src/parse.cpp.o: cxx src/parse.cpp || gen/font.h\n",
        "  cflags = -I. -O2\n\n",
        "build src/scan.cpp: lex src/scan.ll\n\n",
        "build src/scan.cpp.o: cxx src/scan.cpp || gen/font.h\n",
        "  cflags = -I. -O2\n\n",
        "build libcore.so: lib src/m.c.o src/n.cpp.o src/msg.pb.cc.o src/parse.cpp.o ",
        "src/scan.cpp.o external/zlib/libz.a\n",
        "  ldflags = -lz\n\n",
    );
    assert_eq!(ninja, expected);
}
