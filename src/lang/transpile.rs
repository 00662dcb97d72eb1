use super::{decode, Error, Instruction};
use crate::config::Config;
use crate::error;

type Result<T> = std::result::Result<T, Error>;

const TRAILER: &str = "\n    return 0;\n}\n";

/// ## Tape language to C
///
/// Lowers a source text to an equivalent C program, one statement per
/// instruction. Pointer movement uses index arithmetic so the generated
/// program wraps at the tape ends exactly like the machine does.
///
/// Stripping inert bytes is the only optimization performed.

#[derive(Debug, Clone)]
pub struct Transpiler {
    tape_len: usize,
    max_output_bytes: usize,
}

impl Default for Transpiler {
    fn default() -> Self {
        Transpiler::new(&Config::default())
    }
}

impl Transpiler {
    pub fn new(config: &Config) -> Transpiler {
        Transpiler {
            tape_len: config.tape_len,
            max_output_bytes: config.compile_budget,
        }
    }

    pub fn with_budget(mut self, max_output_bytes: usize) -> Transpiler {
        self.max_output_bytes = max_output_bytes;
        self
    }

    /// Generate into an owned string no longer than the configured budget.
    pub fn compile(&self, source: &[u8]) -> Result<String> {
        let mut em = Emitter::new(self.max_output_bytes, TRAILER.len());
        self.generate(source, &mut em)?;
        String::from_utf8(em.buf).map_err(|_| error!(InternalError; "NON-ASCII OUTPUT"))
    }

    /// Generate into `out`, returning the number of bytes written.
    /// Nothing past the point of failure is ever written.
    pub fn compile_into(&self, source: &[u8], out: &mut [u8]) -> Result<usize> {
        let mut em = Emitter::new(out.len(), TRAILER.len());
        let result = self.generate(source, &mut em);
        out[..em.buf.len()].copy_from_slice(&em.buf);
        result.map(|_| em.buf.len())
    }

    fn generate(&self, source: &[u8], em: &mut Emitter) -> Result<()> {
        em.emit("/* Generated by tape-lang */\n")?;
        em.emit("#include <stdio.h>\n\n")?;
        em.emit("int main(void) {\n")?;
        em.emit(&format!(
            "    static unsigned char tape[{}];\n",
            self.tape_len
        ))?;
        em.emit("    unsigned long ptr = 0;\n")?;
        em.emit("    int c;\n\n")?;

        let mut depth = 0usize;
        for (index, ins) in decode(source) {
            if ins == Instruction::Close {
                if depth == 0 {
                    tracing::debug!(index, "transpile hit stray ]");
                    return Err(error!(UnmatchedBracket, ..&(index..index + 1)));
                }
                depth -= 1;
            }
            em.indent(depth + 1)?;
            match ins {
                Instruction::Right => em.emit(&format!("ptr = (ptr + 1) % {};\n", self.tape_len))?,
                Instruction::Left => em.emit(&format!(
                    "ptr = ptr ? ptr - 1 : {};\n",
                    self.tape_len.saturating_sub(1)
                ))?,
                Instruction::Inc => em.emit("++tape[ptr];\n")?,
                Instruction::Dec => em.emit("--tape[ptr];\n")?,
                Instruction::Output => em.emit("putchar(tape[ptr]);\n")?,
                Instruction::Input => {
                    em.emit("if ((c = getchar()) != EOF) tape[ptr] = (unsigned char)c;\n")?
                }
                Instruction::Open => em.emit("while (tape[ptr]) {\n")?,
                Instruction::Close => em.emit("}\n")?,
            }
            if ins == Instruction::Open {
                depth += 1;
            }
        }
        if depth != 0 {
            tracing::debug!(depth, "transpile ended inside a loop");
            return Err(error!(UnmatchedBracket; "LOOP NOT CLOSED"));
        }
        em.finish(TRAILER)
    }
}

/// Compile with the default tape length and an explicit output budget.
pub fn compile(source: &[u8], max_output_bytes: usize) -> Result<String> {
    Transpiler::default()
        .with_budget(max_output_bytes)
        .compile(source)
}

/// Bounded writer that grows with what it is given, up to `limit`. Every
/// emit keeps `reserve` bytes free for the closing boilerplate.
struct Emitter {
    buf: Vec<u8>,
    limit: usize,
    reserve: usize,
}

impl Emitter {
    fn new(limit: usize, reserve: usize) -> Emitter {
        Emitter {
            buf: vec![],
            limit,
            reserve,
        }
    }

    fn fits(&self, len: usize, reserve: usize) -> bool {
        self.buf
            .len()
            .checked_add(len)
            .and_then(|n| n.checked_add(reserve))
            .map_or(false, |n| n <= self.limit)
    }

    fn emit(&mut self, s: &str) -> Result<()> {
        if !self.fits(s.len(), self.reserve) {
            return Err(error!(BufferBudgetExceeded));
        }
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn indent(&mut self, levels: usize) -> Result<()> {
        for _ in 0..levels {
            self.emit("    ")?;
        }
        Ok(())
    }

    fn finish(&mut self, trailer: &str) -> Result<()> {
        if !self.fits(trailer.len(), 0) {
            return Err(error!(BufferBudgetExceeded));
        }
        self.buf.extend_from_slice(trailer.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: u8 = 0xAA;

    fn header_len() -> usize {
        let mut buf = vec![0u8; 4096];
        Transpiler::default().compile_into(b"", &mut buf).unwrap() - TRAILER.len()
    }

    #[test]
    fn test_statements_and_indent() {
        let c = compile(b"+[->.<]", 4096).unwrap();
        assert!(c.contains("\n    ++tape[ptr];\n    while (tape[ptr]) {\n        --tape[ptr];\n"));
        assert!(c.contains("        ptr = (ptr + 1) % 30000;\n"));
        assert!(c.contains("        putchar(tape[ptr]);\n"));
        assert!(c.contains("        ptr = ptr ? ptr - 1 : 29999;\n    }\n"));
        assert!(c.ends_with(TRAILER));
    }

    #[test]
    fn test_comments_are_stripped() {
        assert_eq!(compile(b"a + b", 4096), compile(b"+", 4096));
    }

    #[test]
    fn test_stray_close_leaves_buffer_past_failure() {
        let mut buf = vec![SENTINEL; 4096];
        let err = Transpiler::default().compile_into(b"]+", &mut buf).unwrap_err();
        assert!(err.is(crate::lang::ErrorCode::UnmatchedBracket));
        let h = header_len();
        assert!(buf[h..].iter().all(|b| *b == SENTINEL));
    }

    #[test]
    fn test_unclosed_loop() {
        let err = compile(b"[[]", 4096).unwrap_err();
        assert!(err.is(crate::lang::ErrorCode::UnmatchedBracket));
    }

    #[test]
    fn test_budget_never_overruns() {
        let source = b"+".repeat(200);
        for size in (0..600).step_by(7) {
            let mut buf = vec![SENTINEL; size + 16];
            let result = Transpiler::default().compile_into(&source, &mut buf[..size]);
            assert!(result.unwrap_err().is(crate::lang::ErrorCode::BufferBudgetExceeded));
            assert!(buf[size..].iter().all(|b| *b == SENTINEL));
        }
    }

    #[test]
    fn test_unbounded_budget() {
        let c = compile(b"+.", usize::MAX).unwrap();
        assert!(c.ends_with(TRAILER));
        assert_eq!(compile(b"+.", 1 << 62).unwrap(), c);
    }

    #[test]
    fn test_stray_close_column_in_source() {
        let err = compile(b"x ]", 4096).unwrap_err();
        assert_eq!(err.column(), 2..3);
        let err = compile(b"+ [ - ] ]", 4096).unwrap_err();
        assert_eq!(err.column(), 8..9);
    }

    #[test]
    fn test_exact_budget_fits() {
        let full = compile(b"+.", 4096).unwrap();
        assert_eq!(compile(b"+.", full.len()).unwrap(), full);
        assert!(compile(b"+.", full.len() - 1)
            .unwrap_err()
            .is(crate::lang::ErrorCode::BufferBudgetExceeded));
    }
}
