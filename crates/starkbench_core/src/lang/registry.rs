//! Shareable metadata for `starkbench_core::lang` registries.
//!
//! ## Notes
//! - These types are intentionally lightweight and `Copy`-friendly so registries can live in `const` tables.
//! - Metadata is meant for tooling and diagnostics; enforcement of syntax rules still lives in the lexer/parser.

/// Metadata entry shared by simple registries (keywords, decorators).
#[derive(Debug, Clone, Copy)]
pub struct LangItemInfo<Id: 'static> {
    pub id: Id,
    /// Preferred spelling in source and diagnostics.
    pub canonical: &'static str,
    /// Additional accepted spellings.
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

/// Find an id by canonical spelling or alias.
pub fn lookup<Id: Copy>(table: &'static [LangItemInfo<Id>], spelling: &str) -> Option<Id> {
    table
        .iter()
        .find(|item| item.canonical == spelling || item.aliases.contains(&spelling))
        .map(|item| item.id)
}
