//! Operator vocabulary.
//!
//! Arithmetic is over the field, so there is no ordering comparison: the only comparisons are `==` and `!=`, and they
//! are only legal as the condition of an `if`.
//!
//! ## Examples
//! ```rust
//! use starkbench_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("!="), Some(OperatorId::NotEq));
//! assert_eq!(operators::info_for(OperatorId::Star).precedence, 60);
//! ```

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,

    // Comparison
    EqEq,
    NotEq,

    // Binding / assertion
    Eq,
}

/// Metadata for an operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spelling: &'static str,
    /// Binding power for infix use; higher binds tighter. Zero for non-expression operators.
    pub precedence: u8,
}

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    op(OperatorId::Plus, "+", 50),
    op(OperatorId::Minus, "-", 50),
    op(OperatorId::Star, "*", 60),
    op(OperatorId::Slash, "/", 60),
    op(OperatorId::EqEq, "==", 0),
    op(OperatorId::NotEq, "!=", 0),
    op(OperatorId::Eq, "=", 0),
];

/// Return the full metadata entry for an operator.
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    match id {
        OperatorId::Plus => &OPERATORS[0],
        OperatorId::Minus => &OPERATORS[1],
        OperatorId::Star => &OPERATORS[2],
        OperatorId::Slash => &OPERATORS[3],
        OperatorId::EqEq => &OPERATORS[4],
        OperatorId::NotEq => &OPERATORS[5],
        OperatorId::Eq => &OPERATORS[6],
    }
}

/// Resolve an operator spelling to its identifier.
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS.iter().find(|o| o.spelling == spelling).map(|o| o.id)
}

/// Canonical spelling of an operator.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spelling
}

const fn op(id: OperatorId, spelling: &'static str, precedence: u8) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        precedence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_for_matches_table() {
        for o in OPERATORS {
            assert_eq!(info_for(o.id).id, o.id);
            assert_eq!(from_str(o.spelling), Some(o.id));
        }
    }
}
