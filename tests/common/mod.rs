#![allow(dead_code)]

use rand::Rng;
use std::sync::atomic::AtomicBool;
use tape::mach::{Buffered, Report, Runtime};
use tape::store::{MemoryRegion, Store};
use tape::Config;

pub fn exec(source: &str, input: &str) -> (Report, String) {
    exec_n(source, input, 100_000)
}

pub fn exec_n(source: &str, input: &str, budget: usize) -> (Report, String) {
    let mut r = Runtime::default();
    r.load(source.as_bytes(), budget);
    let mut io = Buffered::with_input(input.as_bytes());
    let report = r.run(&mut io, &AtomicBool::new(false));
    (report, String::from_utf8_lossy(io.output_bytes()).into_owned())
}

pub fn store() -> Store<MemoryRegion> {
    let config = Config::default();
    Store::open(MemoryRegion::new(config.region_size), &config).unwrap()
}

pub fn seeded() -> Store<MemoryRegion> {
    let config = Config::default();
    Store::open_seeded(MemoryRegion::new(config.region_size), &config).unwrap()
}

pub fn reopen(store: Store<MemoryRegion>) -> Store<MemoryRegion> {
    Store::open(store.into_region(), &Config::default()).unwrap()
}

/// Random program with balanced brackets, sprinkled with inert bytes.
pub fn balanced<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    const ALPHABET: &[u8] = b"><+-.,[] x";
    let mut out = vec![];
    let mut depth = 0;
    for _ in 0..len {
        let byte = ALPHABET[rng.gen_range(0..ALPHABET.len())];
        match byte {
            b'[' => depth += 1,
            b']' if depth == 0 => continue,
            b']' => depth -= 1,
            _ => {}
        }
        out.push(byte);
    }
    out.extend(std::iter::repeat(b']').take(depth));
    out
}
