use crate::error::Error as CiberedevErr;

/// Result type returned by every fallible operation of the crate.
pub type Result<T> = std::result::Result<T, CiberedevErr>;
