use std::collections::VecDeque;

/// ## Byte I/O capability
///
/// `input` returning `None` means no byte is available yet; the machine
/// suspends and waits for `Runtime::provide`.

pub trait Io {
    fn input(&mut self) -> Option<u8>;
    fn output(&mut self, byte: u8);
}

/// Queued input and collected output.
#[derive(Debug, Default, Clone)]
pub struct Buffered {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl Buffered {
    pub fn new() -> Buffered {
        Buffered::default()
    }

    pub fn with_input(input: &[u8]) -> Buffered {
        Buffered {
            input: input.iter().copied().collect(),
            output: vec![],
        }
    }

    pub fn push_input(&mut self, input: &[u8]) {
        self.input.extend(input.iter().copied());
    }

    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }
}

impl Io for Buffered {
    fn input(&mut self) -> Option<u8> {
        self.input.pop_front()
    }
    fn output(&mut self, byte: u8) {
        self.output.push(byte)
    }
}
