/// ## Tape machine instruction set
///
/// Eight single-byte symbols. Every other byte in a source text is inert.
///
/// For example: `++[->+<]` moves the value two from cell 0 into cell 1.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `>` Move the pointer right, wrapping at the end of the tape.
    Right,
    /// `<` Move the pointer left, wrapping at the start of the tape.
    Left,
    /// `+` Increment the current cell modulo 256.
    Inc,
    /// `-` Decrement the current cell modulo 256.
    Dec,
    /// `.` Emit the current cell.
    Output,
    /// `,` Store one input byte in the current cell. May suspend.
    Input,
    /// `[` Skip past the matching `]` when the current cell is zero.
    Open,
    /// `]` Return to the matching `[` when the current cell is not zero.
    Close,
}

impl Instruction {
    pub const ALL: [Instruction; 8] = [
        Instruction::Right,
        Instruction::Left,
        Instruction::Inc,
        Instruction::Dec,
        Instruction::Output,
        Instruction::Input,
        Instruction::Open,
        Instruction::Close,
    ];

    pub fn from_byte(byte: u8) -> Option<Instruction> {
        use Instruction::*;
        match byte {
            b'>' => Some(Right),
            b'<' => Some(Left),
            b'+' => Some(Inc),
            b'-' => Some(Dec),
            b'.' => Some(Output),
            b',' => Some(Input),
            b'[' => Some(Open),
            b']' => Some(Close),
            _ => None,
        }
    }

    pub fn symbol(self) -> u8 {
        use Instruction::*;
        match self {
            Right => b'>',
            Left => b'<',
            Inc => b'+',
            Dec => b'-',
            Output => b'.',
            Input => b',',
            Open => b'[',
            Close => b']',
        }
    }

    pub fn name(self) -> &'static str {
        use Instruction::*;
        match self {
            Right => "Move Right",
            Left => "Move Left",
            Inc => "Increment",
            Dec => "Decrement",
            Output => "Output",
            Input => "Input",
            Open => "Loop Start",
            Close => "Loop End",
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol() as char)
    }
}

/// Instructions of `source` paired with their byte offsets. Inert bytes are
/// skipped but still advance the offset.
pub fn decode(source: &[u8]) -> impl Iterator<Item = (usize, Instruction)> + '_ {
    source
        .iter()
        .enumerate()
        .filter_map(|(pos, b)| Instruction::from_byte(*b).map(|ins| (pos, ins)))
}
