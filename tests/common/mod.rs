#![allow(dead_code)]

use stack_machine::mach::{Hci, Machine, VmError};
use std::collections::VecDeque;

/// Scripted console for tests: input comes from a canned list of lines,
/// every stream is captured for assertions.
pub struct TestConsole {
    input: VecDeque<String>,
    pub out: String,
    pub err: String,
    pub log: String,
    pub verbosity: i32,
    pub debug: bool,
    pub trace: Vec<String>,
}

impl TestConsole {
    pub fn new(input: &[&str]) -> TestConsole {
        TestConsole {
            input: input.iter().map(|s| s.to_string()).collect(),
            out: String::new(),
            err: String::new(),
            log: String::new(),
            verbosity: 0,
            debug: false,
            trace: vec![],
        }
    }
}

impl Hci for TestConsole {
    fn get_line(&mut self) -> Result<String, VmError> {
        self.input.pop_front().ok_or(VmError::InputExhausted)
    }

    fn print(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn error(&mut self, text: &str) {
        self.err.push_str(text);
    }

    fn log(&mut self, text: &str, level: i32) {
        if level <= self.verbosity {
            self.log.push_str(text);
        }
    }

    fn set_debug(&mut self, on: bool) {
        self.debug = on;
    }

    fn debug_enabled(&self) -> bool {
        self.debug
    }

    fn debug(&mut self, stack: &str, op: &str) {
        self.trace.push(format!("{}: {}", stack, op));
    }
}

/// What a whole assemble-and-run came to: the exit code on a clean halt, or
/// the driver-style fatal message, plus everything the program wrote.
pub struct Outcome {
    pub result: Result<i32, String>,
    pub out: String,
    pub err: String,
    pub trace: Vec<String>,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match &self.result {
            Ok(code) => *code,
            Err(e) => panic!("program failed: {}", e),
        }
    }

    pub fn fatal(&self) -> &str {
        match &self.result {
            Ok(code) => panic!("program exited {} but a failure was expected", code),
            Err(e) => e,
        }
    }
}

pub fn run_program(source: &str, input: &[&str]) -> Outcome {
    let mut console = TestConsole::new(input);
    let result = {
        let mut machine = Machine::new(&mut console);
        match machine.assemble_source(source) {
            Err(e) => Err(format!("VMA FATAL: {}", e)),
            Ok(()) => machine.run().map_err(|e| format!("VM FATAL: {}", e)),
        }
    };
    Outcome {
        result,
        out: console.out,
        err: console.err,
        trace: console.trace,
    }
}

/// Runs a program that needs the final stack inspected; the inspection
/// closure sees the machine after a successful run.
pub fn run_with<T>(
    source: &str,
    input: &[&str],
    inspect: impl FnOnce(&Machine) -> T,
) -> Result<T, String> {
    let mut console = TestConsole::new(input);
    let mut machine = Machine::new(&mut console);
    machine
        .assemble_source(source)
        .map_err(|e| format!("VMA FATAL: {}", e))?;
    machine.run().map_err(|e| format!("VM FATAL: {}", e))?;
    Ok(inspect(&machine))
}
