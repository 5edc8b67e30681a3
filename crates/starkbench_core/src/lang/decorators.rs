//! Decorator vocabulary registry.
//!
//! This module centralizes recognized decorator spellings so downstream code doesn't need stringly-typed
//! comparisons.

use super::registry::{self, LangItemInfo};

/// Stable identifier for supported decorators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorId {
    External,
    View,
    Constructor,
    StorageVar,
}

impl DecoratorId {
    /// Whether the decorated function becomes an externally callable entry point.
    pub fn is_entry_point(self) -> bool {
        matches!(self, DecoratorId::External | DecoratorId::View)
    }
}

/// Metadata entry for a decorator.
pub type DecoratorInfo = LangItemInfo<DecoratorId>;

/// Registry of supported decorators.
pub const DECORATORS: &[DecoratorInfo] = &[
    LangItemInfo {
        id: DecoratorId::External,
        canonical: "external",
        aliases: &[],
        description: "Expose the function as a state-changing entry point.",
    },
    LangItemInfo {
        id: DecoratorId::View,
        canonical: "view",
        aliases: &[],
        description: "Expose the function as a read-only entry point.",
    },
    LangItemInfo {
        id: DecoratorId::Constructor,
        canonical: "constructor",
        aliases: &[],
        description: "Run the function once, at deployment.",
    },
    LangItemInfo {
        id: DecoratorId::StorageVar,
        canonical: "storage_var",
        aliases: &[],
        description: "Declare a storage variable with `read`/`write`/`addr` accessors.",
    },
];

/// Resolve a decorator name to its stable id.
pub fn from_str(name: &str) -> Option<DecoratorId> {
    registry::lookup(DECORATORS, name)
}

/// Return the canonical spelling for a decorator.
pub fn as_str(id: DecoratorId) -> &'static str {
    match id {
        DecoratorId::External => "external",
        DecoratorId::View => "view",
        DecoratorId::Constructor => "constructor",
        DecoratorId::StorageVar => "storage_var",
    }
}
