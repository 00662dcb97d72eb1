use super::{Address, Io, Tape};
use crate::config::Config;
use crate::error;
use crate::lang::{match_backward, match_forward, Error, ErrorCode, Instruction};
use std::sync::atomic::{AtomicBool, Ordering};

/// ## Machine state
///
/// `Idle` after `load`. Only `run` enters `Running`, and only a running
/// machine reaches the other states. `AwaitingInput` goes back to `Running`
/// through `provide`.

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Running,
    Completed,
    Halted(Error),
    AwaitingInput,
}

impl Status {
    pub fn halted_by(&self) -> Option<ErrorCode> {
        match self {
            Status::Halted(e) => Some(e.code()),
            _ => None,
        }
    }

    /// No further call to `run` can make progress.
    pub fn is_final(&self) -> bool {
        matches!(self, Status::Completed | Status::Halted(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub status: Status,
    pub steps_taken: usize,
}

pub struct Runtime {
    source: Vec<u8>,
    tape: Tape,
    pc: Address,
    steps: usize,
    budget: usize,
    count_inert: bool,
    status: Status,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new(&Config::default())
    }
}

impl Runtime {
    pub fn new(config: &Config) -> Runtime {
        Runtime {
            source: vec![],
            tape: Tape::new(config.tape_len),
            pc: 0,
            steps: 0,
            budget: config.step_budget,
            count_inert: config.count_inert,
            status: Status::Idle,
        }
    }

    /// Install a program with a fresh, all-zero tape.
    pub fn load(&mut self, source: &[u8], step_budget: usize) {
        self.source = source.to_vec();
        self.tape.clear();
        self.pc = 0;
        self.steps = 0;
        self.budget = step_budget;
        self.status = Status::Idle;
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn pc(&self) -> Address {
        self.pc
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn report(&self) -> Report {
        Report {
            status: self.status.clone(),
            steps_taken: self.steps,
        }
    }

    /// Complete the pending `,` with `byte`.
    pub fn provide(&mut self, byte: u8) -> Result<(), Error> {
        if self.status != Status::AwaitingInput {
            return Err(error!(InternalError; "NOT AWAITING INPUT"));
        }
        self.tape.set(byte);
        self.steps += 1;
        self.pc += 1;
        self.status = Status::Running;
        Ok(())
    }

    /// Execute until the program completes, halts, or needs input that
    /// `io` cannot supply. Cancellation is polled once per instruction.
    pub fn run<T: Io + ?Sized>(&mut self, io: &mut T, cancel: &AtomicBool) -> Report {
        match self.status {
            Status::Completed | Status::Halted(_) => return self.report(),
            Status::AwaitingInput => match io.input() {
                Some(byte) => {
                    let _ = self.provide(byte);
                }
                None => return self.report(),
            },
            Status::Idle | Status::Running => {}
        }
        self.status = Status::Running;
        while self.status == Status::Running {
            self.cycle(io, cancel);
        }
        self.report()
    }

    fn halt(&mut self, code: ErrorCode) {
        let col = self.pc..self.pc + 1;
        tracing::debug!(pc = self.pc, steps = self.steps, ?code, "machine halted");
        self.status = Status::Halted(Error::new(code).in_column(&col));
    }

    fn cycle<T: Io + ?Sized>(&mut self, io: &mut T, cancel: &AtomicBool) {
        let byte = match self.source.get(self.pc) {
            Some(byte) => *byte,
            None => {
                self.status = Status::Completed;
                return;
            }
        };
        if cancel.load(Ordering::Relaxed) {
            self.halt(ErrorCode::Aborted);
            return;
        }
        let ins = Instruction::from_byte(byte);
        if ins.is_none() && !self.count_inert {
            self.pc += 1;
            return;
        }
        if self.steps >= self.budget {
            self.halt(ErrorCode::StepLimitExceeded);
            return;
        }
        match ins {
            Some(Instruction::Right) => self.tape.right(),
            Some(Instruction::Left) => self.tape.left(),
            Some(Instruction::Inc) => self.tape.inc(),
            Some(Instruction::Dec) => self.tape.dec(),
            Some(Instruction::Output) => io.output(self.tape.get()),
            Some(Instruction::Input) => match io.input() {
                Some(byte) => self.tape.set(byte),
                None => {
                    self.status = Status::AwaitingInput;
                    return;
                }
            },
            Some(Instruction::Open) => match match_forward(&self.source, self.pc) {
                Some(dest) => {
                    if self.tape.get() == 0 {
                        self.pc = dest;
                    }
                }
                None => {
                    self.steps += 1;
                    self.halt(ErrorCode::UnmatchedBracket);
                    return;
                }
            },
            Some(Instruction::Close) => match match_backward(&self.source, self.pc) {
                Some(dest) => {
                    if self.tape.get() != 0 {
                        self.pc = dest;
                    }
                }
                None => {
                    self.steps += 1;
                    self.halt(ErrorCode::UnmatchedBracket);
                    return;
                }
            },
            None => {}
        }
        self.steps += 1;
        self.pc += 1;
    }
}

/// Run `source` to completion or suspension on a fresh tape sized by `config`.
pub fn run<T: Io + ?Sized>(
    source: &[u8],
    io: &mut T,
    step_budget: usize,
    cancel: &AtomicBool,
    config: &Config,
) -> Report {
    let mut runtime = Runtime::new(config);
    runtime.load(source, step_budget);
    runtime.run(io, cancel)
}
