/*!
## Terminal module

Everything between the machine and the operating system: command line
parsing, the four I/O streams with optional ANSI color, and the Ctrl-C
interrupt flag.

*/

use crate::mach::{Hci, Machine, VmError};
use ansi_term::Colour;
use clap::Parser;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "stackm",
    version,
    about = "Assembles and runs stack machine programs."
)]
pub struct MachineArgs {
    /// The source code file you want to run.
    pub source_file: PathBuf,

    /// File to get input from.
    #[arg(short, long)]
    pub input_file: Option<PathBuf>,

    /// File to redirect main output to.
    #[arg(short, long)]
    pub out_file: Option<PathBuf>,

    /// File to redirect error output to.
    #[arg(short, long)]
    pub error_file: Option<PathBuf>,

    /// File to redirect log output to.
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Log verbosity threshold: 0-3 or [Warning|Event|Info|Verbose].
    #[arg(short, long, default_value = "0", value_parser = parse_verbosity)]
    pub verbosity: i32,

    /// Enables the stack-trace debugger.
    #[arg(short, long)]
    pub debug: bool,

    /// Display error, log, and debug messages in color.
    #[arg(short, long)]
    pub color: bool,
}

fn parse_verbosity(value: &str) -> Result<i32, String> {
    if let Ok(level) = value.parse::<i32>() {
        if (0..=3).contains(&level) {
            return Ok(level);
        }
        return Err("level must be between 0 and 3".to_string());
    }
    match value.to_ascii_uppercase().as_str() {
        "WARNING" => Ok(crate::mach::LOG_WARNING),
        "EVENT" => Ok(crate::mach::LOG_EVENT),
        "INFO" => Ok(crate::mach::LOG_INFO),
        "VERBOSE" => Ok(crate::mach::LOG_VERBOSE),
        _ => Err("expected 0-3 or WARNING|EVENT|INFO|VERBOSE".to_string()),
    }
}

/// Production [`Hci`]: wraps stdin/stdout/stderr or file redirections.
/// Color is only applied to streams still attached to the terminal, so
/// redirected files never pick up escape sequences.
pub struct IoHandler {
    input: Box<dyn BufRead>,
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    log: Box<dyn Write>,
    verbosity: i32,
    debug: bool,
    color_err: bool,
    color_log: bool,
}

impl IoHandler {
    pub fn new(args: &MachineArgs) -> std::io::Result<IoHandler> {
        let input: Box<dyn BufRead> = match &args.input_file {
            Some(path) => Box::new(BufReader::new(File::open(path)?)),
            None => Box::new(BufReader::new(std::io::stdin())),
        };
        let out: Box<dyn Write> = match &args.out_file {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(std::io::stdout()),
        };
        let err: Box<dyn Write> = match &args.error_file {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(std::io::stderr()),
        };
        let log: Box<dyn Write> = match &args.log_file {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(std::io::stdout()),
        };
        Ok(IoHandler {
            input,
            out,
            err,
            log,
            verbosity: args.verbosity,
            debug: args.debug,
            color_err: args.color && args.error_file.is_none(),
            color_log: args.color && args.log_file.is_none(),
        })
    }
}

impl Hci for IoHandler {
    fn get_line(&mut self) -> Result<String, VmError> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|_| VmError::InputExhausted)?;
        if read == 0 {
            return Err(VmError::InputExhausted);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    fn print(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn error(&mut self, text: &str) {
        if self.color_err {
            let _ = write!(self.err, "{}", Colour::Red.paint(text));
        } else {
            let _ = self.err.write_all(text.as_bytes());
        }
        let _ = self.err.flush();
    }

    fn log(&mut self, text: &str, level: i32) {
        if level > self.verbosity {
            return;
        }
        if self.color_log {
            let _ = write!(self.log, "{}", Colour::Cyan.paint(text));
        } else {
            let _ = self.log.write_all(text.as_bytes());
        }
        let _ = self.log.flush();
    }

    fn set_debug(&mut self, on: bool) {
        self.debug = on;
    }

    fn debug_enabled(&self) -> bool {
        self.debug
    }

    fn debug(&mut self, stack: &str, op: &str) {
        if self.color_log {
            let _ = writeln!(self.log, "{}: {}", stack, Colour::Yellow.bold().paint(op));
        } else {
            let _ = writeln!(self.log, "{}: {}", stack, op);
        }
        let _ = self.log.flush();
    }
}

impl Drop for IoHandler {
    fn drop(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
        let _ = self.log.flush();
    }
}

/// Parses the command line, wires up the streams, assembles, and runs.
/// Returns the process exit code: the program's own on a clean halt, 1 for
/// any assembly or runtime failure.
pub fn main() -> i32 {
    let args = MachineArgs::parse();

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    if ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)).is_err() {
        eprintln!("General error: could not install the Ctrl-C handler.");
        return 1;
    }

    let mut io = match IoHandler::new(&args) {
        Ok(io) => io,
        Err(e) => {
            eprintln!("General error: {}", e);
            return 1;
        }
    };

    let outcome = {
        let mut machine = Machine::new(&mut io);
        machine.set_interrupt(interrupted);
        match machine.assemble_file(&args.source_file) {
            Err(e) => Err(format!("VMA FATAL: {}\n", e)),
            Ok(()) => match machine.run() {
                Ok(exit_code) => Ok(exit_code),
                Err(e) => Err(format!("VM FATAL: {}\n", e)),
            },
        }
    };

    match outcome {
        Ok(exit_code) => exit_code,
        Err(message) => {
            io.error(&message);
            1
        }
    }
}
