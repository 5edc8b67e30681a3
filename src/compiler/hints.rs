//! Hint whitelist.
//!
//! Hints are never executed. Validation only decides whether the compiler accepts them.

/// Hints accepted even with validation enabled, compared with whitespace collapsed.
const WHITELIST: &[&str] = &[
    "memory[ap] = segments.add()",
    "memory[ap] = to_felt_or_relocatable(segments.add())",
    "from starkware.cairo.common.math_utils import assert_integer\nassert_integer(ids.a)",
];

fn normalize(code: &str) -> String {
    code.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_whitelisted(code: &str) -> bool {
    let code = normalize(code);
    WHITELIST.iter().any(|allowed| normalize(allowed) == code)
}
