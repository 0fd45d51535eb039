// src/copy/mod.rs

//! The copy pass.
//!
//! A pass executes every [`CopyRule`] in order. Each rule enumerates the
//! entries under the project root matching its source glob and mirrors them
//! under the rule's destination root. Failures are recorded per entry in a
//! [`CopyReport`]; one failing entry or rule never stops the rest of the pass.

pub mod pass;
pub mod pattern;
pub mod report;
pub mod rule;

pub use pass::{run_copy, run_copy_rule};
pub use pattern::{MatchedEntry, SourcePattern};
pub use report::{CopyFailure, CopyReport};
pub use rule::CopyRule;
