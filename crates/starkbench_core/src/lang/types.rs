//! Builtin type vocabulary.
//!
//! Contract values are either a field element (`felt`) or a pointer to a felt array (`felt*`). Builtin pointer
//! structs such as `HashBuiltin*` only appear in implicit arguments, which the compiler accepts and ignores.

use serde::{Deserialize, Serialize};

/// Spelling of the field element type.
pub const FELT: &str = "felt";

/// Struct names exported by `starkware.cairo.common.cairo_builtins`.
pub const BUILTIN_STRUCTS: &[&str] = &["HashBuiltin", "SignatureBuiltin", "BitwiseBuiltin", "EcOpBuiltin"];

/// Type of a parameter, return value or local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    #[serde(rename = "felt")]
    Felt,
    #[serde(rename = "felt*")]
    FeltPtr,
}

impl ValueType {
    /// Spelling used in source and in the ABI.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Felt => "felt",
            ValueType::FeltPtr => "felt*",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `name` is a builtin struct usable in implicit argument types.
pub fn is_builtin_struct(name: &str) -> bool {
    BUILTIN_STRUCTS.contains(&name)
}
