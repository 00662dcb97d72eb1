//! # Tape
//!
//! The eight-symbol tape language with everything needed to keep and run
//! programs written in it:
//!
//! * [`mach`] interprets a program against a wrapping tape of byte cells. It
//!   stops when the program ends, when the step budget runs out, when the
//!   caller cancels, or when `,` needs a byte nobody has typed yet. In the
//!   last case it waits for [`mach::Runtime::provide`].
//! * [`lang`] holds the instruction alphabet, bracket pairing and the
//!   transpiler that lowers a program to C.
//! * [`store`] persists named programs in a flat region with a checksummed
//!   metadata block.
//!
//! ```
//! use std::sync::atomic::AtomicBool;
//! use tape::mach::{run, Buffered, Status};
//! use tape::Config;
//!
//! let mut io = Buffered::new();
//! let report = run(b"++.", &mut io, 100, &AtomicBool::new(false), &Config::default());
//! assert_eq!(report.status, Status::Completed);
//! assert_eq!(io.output_bytes(), &[2]);
//! ```

pub mod config;
pub mod lang;
pub mod mach;
pub mod store;
pub mod term;

pub use config::Config;
