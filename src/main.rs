//! # Tape
//!
//! Interactive shell over the tape machine and its program store.
//!

fn main() {
    tape::term::main();
}
