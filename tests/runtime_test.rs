mod common;
use common::*;
use std::sync::atomic::{AtomicBool, Ordering};
use tape::lang::ErrorCode;
use tape::mach::{Buffered, Io, Runtime, Status};
use tape::store::SEEDS;

fn seed(name: &str) -> &'static str {
    SEEDS.iter().find(|s| s.0 == name).unwrap().1
}

#[test]
fn test_scenario_a() {
    let (report, out) = exec("++.", "");
    assert_eq!(report.status, Status::Completed);
    assert_eq!(report.steps_taken, 3);
    assert_eq!(out.as_bytes(), &[2]);
}

#[test]
fn test_scenario_b() {
    let (report, out) = exec("+[", "");
    assert_eq!(report.status.halted_by(), Some(ErrorCode::UnmatchedBracket));
    assert_eq!(report.steps_taken, 2);
    assert_eq!(out, "");
}

#[test]
fn test_step_limit_boundary() {
    for budget in 0..40 {
        let (report, _) = exec_n("+[]", "", budget);
        assert_eq!(report.status.halted_by(), Some(ErrorCode::StepLimitExceeded));
        assert_eq!(report.steps_taken, budget);
    }
}

#[test]
fn test_hello_world() {
    let (report, out) = exec(seed("HELLO.BF"), "");
    assert_eq!(report.status, Status::Completed);
    assert_eq!(out, "Hello World!\n");
}

#[test]
fn test_determinism() {
    let mut first = Runtime::default();
    let mut second = Runtime::default();
    let cancel = AtomicBool::new(false);
    let mut io1 = Buffered::with_input(b"tape");
    let mut io2 = Buffered::with_input(b"tape");
    first.load(b",[.>,]<[.<]", 1000);
    second.load(b",[.>,]<[.<]", 1000);
    let r1 = first.run(&mut io1, &cancel);
    let r2 = second.run(&mut io2, &cancel);
    assert_eq!(r1, r2);
    assert_eq!(io1.output_bytes(), io2.output_bytes());
    assert_eq!(first.tape(), second.tape());
    assert_eq!(r1.status, Status::AwaitingInput);
}

#[test]
fn test_suspend_and_provide() {
    let mut r = Runtime::default();
    let cancel = AtomicBool::new(false);
    let mut io = Buffered::new();
    r.load(b",+.", 100);
    let report = r.run(&mut io, &cancel);
    assert_eq!(report.status, Status::AwaitingInput);
    assert_eq!(report.steps_taken, 0);
    r.provide(b'A').unwrap();
    assert_eq!(r.status(), &Status::Running);
    let report = r.run(&mut io, &cancel);
    assert_eq!(report.status, Status::Completed);
    assert_eq!(report.steps_taken, 3);
    assert_eq!(io.output_bytes(), b"B");
}

#[test]
fn test_echo_resumes_from_queued_input() {
    let mut r = Runtime::default();
    let cancel = AtomicBool::new(false);
    let mut io = Buffered::with_input(b"hi");
    r.load(seed("ECHO.BF").as_bytes(), 100);
    assert_eq!(r.run(&mut io, &cancel).status, Status::AwaitingInput);
    assert_eq!(r.steps(), 6);
    io.push_input(b"\0");
    let report = r.run(&mut io, &cancel);
    assert_eq!(report.status, Status::Completed);
    assert_eq!(report.steps_taken, 8);
    assert_eq!(io.output_bytes(), b"hi");
}

struct CancelAfter<'a> {
    flag: &'a AtomicBool,
    left: usize,
    out: Vec<u8>,
}

impl<'a> Io for CancelAfter<'a> {
    fn input(&mut self) -> Option<u8> {
        None
    }
    fn output(&mut self, byte: u8) {
        self.out.push(byte);
        self.left -= 1;
        if self.left == 0 {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

#[test]
fn test_cancel_stops_runaway_loop() {
    let flag = AtomicBool::new(false);
    let mut io = CancelAfter {
        flag: &flag,
        left: 3,
        out: vec![],
    };
    let mut r = Runtime::default();
    r.load(b"+[.]", 1_000_000);
    let report = r.run(&mut io, &flag);
    assert_eq!(report.status.halted_by(), Some(ErrorCode::Aborted));
    assert_eq!(report.steps_taken, 7);
    assert_eq!(io.out, vec![1, 1, 1]);
}

#[test]
fn test_pointer_wraps_left() {
    let mut r = Runtime::default();
    r.load(b"<+++", 100);
    r.run(&mut Buffered::new(), &AtomicBool::new(false));
    assert_eq!(r.tape().pointer(), 29999);
    assert_eq!(r.tape().cells()[29999], 3);
}

#[test]
fn test_cell_wraps() {
    let mut r = Runtime::default();
    let mut io = Buffered::new();
    r.load(b"-.+.", 100);
    let report = r.run(&mut io, &AtomicBool::new(false));
    assert_eq!(report.status, Status::Completed);
    assert_eq!(io.output_bytes(), &[0xFF, 0x00]);
}

#[test]
fn test_skip_loop_when_zero() {
    let (report, out) = exec("[.]+.", "");
    assert_eq!(report.status, Status::Completed);
    assert_eq!(report.steps_taken, 3);
    assert_eq!(out.as_bytes(), &[1]);
}

#[test]
fn test_restart_after_halt() {
    let mut r = Runtime::default();
    let cancel = AtomicBool::new(false);
    r.load(b"+++]", 100);
    assert!(r.run(&mut Buffered::new(), &cancel).status.is_final());
    r.load(b"++.", 100);
    let mut io = Buffered::new();
    assert_eq!(r.status(), &Status::Idle);
    assert_eq!(r.run(&mut io, &cancel).status, Status::Completed);
    assert_eq!(io.output_bytes(), &[2]);
}
