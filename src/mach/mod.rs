/*!
## Rust Machine Module

This Rust module is a resumable virtual machine for the tape language.

*/

pub type Address = usize;

mod io;
mod runtime;
mod tape;

pub use io::Buffered;
pub use io::Io;
pub use runtime::run;
pub use runtime::Report;
pub use runtime::Runtime;
pub use runtime::Status;
pub use tape::Tape;
