use super::{decode, Instruction};

/// ## Per-symbol occurrence counts
///
/// Read-only diagnostic pass over a source text. Inert bytes are ignored.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    counts: [usize; 8],
}

impl Stats {
    pub fn of(source: &[u8]) -> Stats {
        let mut stats = Stats::default();
        for (_, ins) in decode(source) {
            stats.counts[Stats::slot(ins)] += 1;
        }
        stats
    }

    fn slot(ins: Instruction) -> usize {
        Instruction::ALL
            .iter()
            .position(|i| *i == ins)
            .unwrap_or_default()
    }

    pub fn count(&self, ins: Instruction) -> usize {
        self.counts[Stats::slot(ins)]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Instruction, usize)> + '_ {
        Instruction::ALL.iter().copied().zip(self.counts.iter().copied())
    }
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (ins, count) in self.iter() {
            writeln!(f, "{} ({}): {}", ins.name(), ins, count)?;
        }
        write!(f, "Total instructions: {}", self.total())
    }
}

/// Numbered listing of every instruction with the statement it stands for,
/// indented by loop depth. Positions are byte offsets into `source`.
pub fn intermediate(source: &[u8]) -> Vec<String> {
    let mut lines = vec![];
    let mut depth = 0usize;
    for (pos, ins) in decode(source) {
        if ins == Instruction::Close {
            depth = depth.saturating_sub(1);
        }
        lines.push(format!(
            "{:indent$}{}: {} = {}",
            "",
            pos,
            ins,
            describe(ins),
            indent = depth * 2
        ));
        if ins == Instruction::Open {
            depth += 1;
        }
    }
    lines
}

fn describe(ins: Instruction) -> &'static str {
    use Instruction::*;
    match ins {
        Right => "ptr++",
        Left => "ptr--",
        Inc => "(*ptr)++",
        Dec => "(*ptr)--",
        Output => "putchar(*ptr)",
        Input => "*ptr = getchar()",
        Open => "while (*ptr) {",
        Close => "}",
    }
}
