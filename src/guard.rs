//! # Fail-fast invariant checks.
//!
//! Condition-to-error helpers for internal-invariant violations: each
//! returns `Ok(())` when the condition holds and a distinguishable error
//! when it does not, so call sites stay on the `?` path instead of
//! panicking.
//!
//! Reserved for invariants that should never fail in correct code; use
//! ordinary validation errors for external input.
//!
//! ## Example
//! ```
//! use gracevisor::{ensure_msg, InvariantError};
//!
//! fn advance(cursor: usize, len: usize) -> Result<usize, InvariantError> {
//!     ensure_msg(cursor < len, "cursor past end of buffer")?;
//!     Ok(cursor + 1)
//! }
//!
//! assert!(advance(0, 4).is_ok());
//! assert_eq!(
//!     advance(4, 4),
//!     Err(InvariantError::ViolatedWith { detail: "cursor past end of buffer".into() }),
//! );
//! ```

use crate::error::InvariantError;

/// Returns an error if the condition is false.
pub fn ensure(condition: bool) -> Result<(), InvariantError> {
    if condition {
        Ok(())
    } else {
        Err(InvariantError::Violated)
    }
}

/// Returns an error carrying `detail` if the condition is false.
pub fn ensure_msg(condition: bool, detail: impl Into<String>) -> Result<(), InvariantError> {
    if condition {
        Ok(())
    } else {
        Err(InvariantError::ViolatedWith { detail: detail.into() })
    }
}

/// Returns an error if the predicate returns false.
pub fn ensure_with(predicate: impl FnOnce() -> bool) -> Result<(), InvariantError> {
    ensure(predicate())
}

/// Returns an error carrying `detail` if the predicate returns false.
pub fn ensure_with_msg(
    predicate: impl FnOnce() -> bool,
    detail: impl Into<String>,
) -> Result<(), InvariantError> {
    ensure_msg(predicate(), detail)
}

/// Returns the given error if the condition is false.
pub fn ensure_or<E>(condition: bool, err: E) -> Result<(), E> {
    if condition {
        Ok(())
    } else {
        Err(err)
    }
}

/// Returns the given error if the predicate returns false.
pub fn ensure_with_or<E>(predicate: impl FnOnce() -> bool, err: E) -> Result<(), E> {
    ensure_or(predicate(), err)
}
