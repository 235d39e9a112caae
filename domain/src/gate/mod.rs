//! Quality gate domain
//!
//! A gate is a set of named components; it passes only when every component
//! is acceptable. A gate with no components passes trivially.

pub mod entities;
pub mod parsing;

pub use entities::{ComponentResult, GateComponent, GateResult};
pub use parsing::{GateParseError, parse_gate_result};
