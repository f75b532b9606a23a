//! Recursion depth guard.

use crate::error::{Error, Result};

/// Take one step down into a list's elements or a compound's values.
///
/// The returned budget is what the children are walked with. The budget is
/// threaded through every recursive call and is never stored anywhere, so
/// concurrent encode/decode calls cannot observe each other.
pub(crate) fn descend(depth: u32) -> Result<u32> {
    if depth == 0 {
        Err(Error::DepthExceeded)
    } else {
        Ok(depth - 1)
    }
}
