//! The shared rule preamble.
//!
//! Every generated file declares the same rule set. Commands reference global
//! variables such as `$CC` and `$CXXFLAGS` whose values are placeholder tokens
//! substituted by a later configuration step.

use super::RuleTemplate;

/// Rule names in declaration order paired with their command templates.
const STANDARD_RULES: [(&str, &str); 8] = [
    (
        "cc",
        "$CC -std=gnu11 $CFLAGS $CPPFLAGS $cflags -c $in -o $out",
    ),
    (
        "cxx",
        "$CXX -std=gnu++2a $CXXFLAGS $CPPFLAGS $cflags -c $in -o $out",
    ),
    (
        "lib",
        "$CXX -shared -Wl,-soname,$out $ldflags $LDFLAGS $in -o $out",
    ),
    ("link", "$CXX $ldflags $LDFLAGS $in -o $out"),
    ("protoc", "protoc --cpp_out=. $in"),
    ("lex", "lex -o $out $in"),
    ("yacc", "yacc --defines=$header -o $out $in"),
    (
        "genheader",
        "(echo 'unsigned char $var[] = {' && xxd -i <$in && echo '};') > $out",
    ),
];

/// The standard rule templates in declaration order.
#[must_use]
pub fn standard_rules() -> Vec<RuleTemplate> {
    STANDARD_RULES
        .iter()
        .map(|(name, command)| RuleTemplate::new(*name, *command))
        .collect()
}
