//! Facade over the `board`, `safety` and `playground` crates.
//!
//! Integration tests depend on this single crate.

pub use board::*;
pub use playground::*;
pub use safety::*;
