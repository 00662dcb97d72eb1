extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;

mod disk;

pub use disk::FileRegion;

use crate::config::Config;
use crate::lang::{intermediate, Error, Stats, Transpiler};
use crate::mach::{Buffered, Runtime, Status};
use crate::store::{MemoryRegion, Region, Store};
use ansi_term::Style;
use linefeed::{Interface, ReadResult, Terminal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "> ";

pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    }) {
        eprintln!("Error setting Ctrl-C handler: {}", error);
    }
    if let Err(error) = main_loop(interrupted) {
        eprintln!("{}", error);
    }
}

fn main_loop(interrupted: Arc<AtomicBool>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    let region: Box<dyn Region> = match std::env::args().nth(1) {
        Some(path) => Box::new(FileRegion::open(path, config.region_size)?),
        None => Box::new(MemoryRegion::new(config.region_size)),
    };
    let store = Store::open_seeded(region, &config)?;
    let interface = Interface::new("TAPE")?;
    interface.set_prompt(PROMPT)?;
    let mut shell = Shell {
        interface: &interface,
        store,
        config,
        interrupted,
    };
    shell.println("Tape Shell. Type help for commands.")?;
    loop {
        let line = match interface.read_line()? {
            ReadResult::Input(line) => line,
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        if !line.trim().is_empty() {
            interface.add_history_unique(line.clone());
        }
        if !shell.command(&line)? {
            break;
        }
    }
    Ok(())
}

struct Shell<'a, T: Terminal, R: Region> {
    interface: &'a Interface<T>,
    store: Store<R>,
    config: Config,
    interrupted: Arc<AtomicBool>,
}

impl<'a, T: Terminal, R: Region> Shell<'a, T, R> {
    fn println(&self, s: &str) -> std::io::Result<()> {
        self.interface.write_fmt(format_args!("{}\n", s))
    }

    fn report(&self, error: &Error) -> std::io::Result<()> {
        self.interface
            .write_fmt(format_args!("{}\n", Style::new().bold().paint(error.to_string())))
    }

    /// Run one command line. `false` means leave the shell.
    fn command(&mut self, line: &str) -> std::io::Result<bool> {
        let line = line.trim();
        let (word, rest) = match line.find(' ') {
            Some(at) => (&line[..at], line[at + 1..].trim()),
            None => (line, ""),
        };
        let result: Outcome = match word {
            "" => Ok(()),
            "exit" | "quit" => return Ok(false),
            "help" | "?" => self.help(),
            "ls" | "dir" => self.list(),
            "cat" => self.cat(rest),
            "write" => self.write(rest),
            "rm" => self.store.delete(rest).map_err(Into::into),
            "mv" => self.rename(rest),
            "run" => match self.store.load(rest) {
                Ok(source) => self.execute(&source),
                Err(error) => Err(error.into()),
            },
            "bf" => self.execute(rest.as_bytes()),
            "compile" => self.compile(rest),
            "stats" => self.stats(rest),
            "ir" => self.ir(rest),
            "df" => self.usage(),
            "compact" => match self.store.compact() {
                Ok(n) => self.println(&format!("{} bytes reclaimed", n)).map_err(Into::into),
                Err(error) => Err(error.into()),
            },
            "time" => self
                .println(&chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
                .map_err(Into::into),
            "about" => self
                .println(&format!("tape {}", env!("CARGO_PKG_VERSION")))
                .map_err(Into::into),
            _ => self
                .println(&format!("Unknown command: {}", word))
                .map_err(Into::into),
        };
        match result {
            Ok(()) => Ok(true),
            Err(Failure::Tape(error)) => {
                self.report(&error)?;
                Ok(true)
            }
            Err(Failure::Io(error)) => Err(error),
        }
    }

    fn help(&self) -> Outcome {
        match self.store.load("README.TXT") {
            Ok(text) => self.println(String::from_utf8_lossy(&text).trim_end())?,
            Err(_) => self.println("ls cat write rm mv run bf compile stats ir df compact time about exit")?,
        }
        Ok(())
    }

    fn list(&self) -> Outcome {
        let entries = self.store.list();
        for entry in entries.iter() {
            let flag = if entry.is_read_only() { " [RO]" } else { "" };
            self.println(&format!("{:<12} {:>6}{}", entry.name(), entry.size(), flag))?;
        }
        self.println(&format!("{} files", entries.len()))?;
        Ok(())
    }

    fn cat(&self, name: &str) -> Outcome {
        let text = self.store.load(name)?;
        self.println(String::from_utf8_lossy(&text).trim_end())?;
        Ok(())
    }

    fn write(&mut self, rest: &str) -> Outcome {
        let (name, text) = match rest.find(' ') {
            Some(at) => (&rest[..at], &rest[at + 1..]),
            None => (rest, ""),
        };
        let text = text.replace("\\n", "\n");
        self.store.save(name, text.as_bytes())?;
        Ok(())
    }

    fn rename(&mut self, rest: &str) -> Outcome {
        let mut names = rest.split_whitespace();
        match (names.next(), names.next()) {
            (Some(old), Some(new)) => self.store.rename(old, new)?,
            _ => self.println("Usage: mv <old> <new>")?,
        }
        Ok(())
    }

    fn execute(&mut self, source: &[u8]) -> Outcome {
        let mut runtime = Runtime::new(&self.config);
        runtime.load(source, self.config.step_budget);
        let mut io = Buffered::new();
        self.interrupted.store(false, Ordering::SeqCst);
        loop {
            let report = runtime.run(&mut io, &self.interrupted);
            let out = io.take_output();
            if !out.is_empty() {
                self.interface
                    .write_fmt(format_args!("{}", String::from_utf8_lossy(&out)))?;
            }
            match report.status {
                Status::AwaitingInput => {
                    self.interface.set_prompt("[Input] ")?;
                    let read = self.interface.read_line()?;
                    self.interface.set_prompt(PROMPT)?;
                    match read {
                        ReadResult::Input(line) => {
                            io.push_input(line.as_bytes());
                            io.push_input(b"\n");
                        }
                        ReadResult::Signal(_) | ReadResult::Eof => {
                            self.println("\nInput cancelled")?;
                            break;
                        }
                    }
                }
                Status::Completed => {
                    self.println(&format!("\nProgram finished ({} steps)", report.steps_taken))?;
                    break;
                }
                Status::Halted(error) => {
                    self.println("")?;
                    self.report(&error)?;
                    break;
                }
                Status::Idle | Status::Running => break,
            }
        }
        self.println(&runtime.tape().dump(0, 16))?;
        Ok(())
    }

    fn compile(&self, name: &str) -> Outcome {
        let source = self.store.load(name)?;
        let c = Transpiler::new(&self.config).compile(&source)?;
        self.println(c.trim_end())?;
        Ok(())
    }

    fn stats(&self, name: &str) -> Outcome {
        let source = self.store.load(name)?;
        self.println(&Stats::of(&source).to_string())?;
        Ok(())
    }

    fn ir(&self, name: &str) -> Outcome {
        let source = self.store.load(name)?;
        for line in intermediate(&source) {
            self.println(&line)?;
        }
        Ok(())
    }

    fn usage(&self) -> Outcome {
        let used = self.store.used_bytes();
        let capacity = self.store.capacity();
        self.println(&format!("Files:     {}", self.store.count()))?;
        self.println(&format!("Used:      {} bytes ({}%)", used, used * 100 / capacity.max(1)))?;
        self.println(&format!("Free:      {} bytes", self.store.free_bytes()))?;
        self.println(&format!("Abandoned: {} bytes", self.store.orphaned_bytes()))?;
        Ok(())
    }
}

type Outcome = Result<(), Failure>;

enum Failure {
    Tape(Error),
    Io(std::io::Error),
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        Failure::Tape(error)
    }
}

impl From<std::io::Error> for Failure {
    fn from(error: std::io::Error) -> Self {
        Failure::Io(error)
    }
}
