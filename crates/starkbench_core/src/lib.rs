//! Shared semantic core for the starkbench compiler and simulated runtime.
//!
//! This crate is intentionally small and dependency-light. It contains deterministic helpers that both:
//! - the compiler uses for constant folding, selector assignment and storage layout, and
//! - the runtime uses to execute contracts and derive addresses with the same rules.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no global mutable state, and no compiler-specific types.
//! - Current scope: the STARK field element ([`Felt`]), Keccak-based hashing (selectors, storage addresses,
//!   contract addresses), and the canonical language vocabulary ([`lang`]).
//!
//! ## Examples
//! ```rust
//! use starkbench_core::{Felt, hash::get_selector_from_name};
//!
//! let a = get_selector_from_name("forever_one");
//! let b = get_selector_from_name("forever_one");
//! assert_eq!(a, b);
//! assert_eq!(Felt::from(2u64) + Felt::from(3u64), Felt::from(5u64));
//! ```

pub mod errors;
pub mod felt;
pub mod hash;
pub mod lang;

pub use felt::{Felt, FeltParseError};
