//! Shared user-facing error messages used across compiler and runtime.
//!
//! Keeping these in one place makes the checker's diagnostics and the VM's runtime failures read the
//! same way for the same condition.

/// Raised when an `assert a = b` (or a write to an already-set memory cell) sees two different values.
pub const ASSERT_EQ_FAILED_MSG: &str = "An ASSERT_EQ instruction failed";

/// Raised by field division when the divisor is zero.
pub const DIVISION_BY_ZERO_MSG: &str = "Division by zero";

/// Raised when reading a memory cell that was never written.
pub const UNKNOWN_MEMORY_VALUE_MSG: &str = "Unknown value for memory cell";

/// Raised by `assert_not_zero`.
pub const ASSERT_NOT_ZERO_MSG: &str = "assert_not_zero failed: value is zero";

/// Raised by `assert_not_equal`.
pub const ASSERT_NOT_EQUAL_MSG: &str = "assert_not_equal failed: both values are equal";

/// Raised by `assert_nn` / `assert_le` when the range check does not hold.
pub const RANGE_CHECK_MSG: &str = "Value is out of range";

/// Raised when a hint reaches the compiler with validation enabled.
pub const HINT_NOT_WHITELISTED_MSG: &str = "Hint is not whitelisted";
