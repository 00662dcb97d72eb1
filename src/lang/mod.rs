/*!
# Rust Language Module

This Rust module describes the eight-symbol tape language: its instruction
alphabet, the bracket pairing rule shared by the machine and the transpiler,
the transpiler itself and the diagnostic statistics.

*/

pub type Column = std::ops::Range<usize>;

#[macro_use]
mod error;
mod brackets;
mod instruction;
mod stats;
mod transpile;

pub use brackets::{match_backward, match_bracket, match_forward};
pub use error::Error;
pub use error::ErrorCode;
pub use instruction::{decode, Instruction};
pub use stats::{intermediate, Stats};
pub use transpile::{compile, Transpiler};
