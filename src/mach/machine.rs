use super::hci::{Hci, LOG_EVENT, LOG_INFO};
use super::{
    Address, AsmError, CallStack, CodeSegment, DataStack, Op, Opcode, Val, VirtualDisk, VmError,
};
use crate::asm;
use rand_core::{OsRng, RngCore};
use std::mem;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const MAX_EXEC_DEPTH: usize = 16;

/// Instruction pointer value meaning "no entry point yet". Assembly must
/// replace it before the run loop ever fetches.
const UNSET: Address = Address::MAX;

type Result<T> = std::result::Result<T, VmError>;

/// ## Machine runtime
///
/// Owns every piece of interpreter state and runs the fetch/dispatch loop.
/// The pre-increment discipline matters: by the time an instruction runs,
/// `ip` already names the instruction after it, which is exactly what CALL
/// saves as its return address.
pub struct Machine<'a> {
    io: &'a mut dyn Hci,
    code: CodeSegment,
    calls: CallStack,
    data: DataStack,
    disk: VirtualDisk,
    interrupted: Arc<AtomicBool>,
    exec_depth: usize,
    ip: Address,
    exit_code: i32,
    halt: bool,
}

impl<'a> Machine<'a> {
    pub fn new(io: &'a mut dyn Hci) -> Machine<'a> {
        Machine {
            io,
            code: CodeSegment::new(),
            calls: CallStack::new(),
            data: DataStack::new(),
            disk: VirtualDisk::new(),
            interrupted: Arc::new(AtomicBool::new(false)),
            exec_depth: 0,
            ip: UNSET,
            exit_code: 0,
            halt: false,
        }
    }

    /// Installs the flag a Ctrl-C handler flips. SLEEP polls it and turns an
    /// interrupt into a halt with exit code 1.
    pub fn set_interrupt(&mut self, flag: Arc<AtomicBool>) {
        self.interrupted = flag;
    }

    pub fn stack(&self) -> &DataStack {
        &self.data
    }

    pub fn assemble_file(&mut self, path: &Path) -> std::result::Result<(), AsmError> {
        self.io.log(
            &format!(
                "Stack machine v{}. Assembling {}...\n",
                VERSION,
                path.display()
            ),
            LOG_EVENT,
        );
        let source = std::fs::read_to_string(path).map_err(AsmError::SourceUnreadable)?;
        self.assemble_source(&source)
    }

    pub fn assemble_source(&mut self, source: &str) -> std::result::Result<(), AsmError> {
        let assembly = asm::assemble(source, self.io)?;
        self.code = assembly.code;
        self.ip = assembly.entry;
        Ok(())
    }

    /// Main run loop. Returns the program's exit code, or the first runtime
    /// error annotated with the name of the instruction that raised it.
    pub fn run(&mut self) -> Result<i32> {
        self.io.log(
            &format!(
                "Stack machine v{}. Running assembled program...\n",
                VERSION
            ),
            LOG_EVENT,
        );
        loop {
            let op = self.code.get(self.ip)?.clone();
            self.ip += 1;
            if self.io.debug_enabled() {
                let snapshot = self.data.to_string();
                self.io.debug(&snapshot, &op.to_string());
            }
            if let Err(e) = self.step(&op) {
                return Err(VmError::Faulted {
                    op: op.to_string(),
                    source: Box::new(e),
                });
            }
            if self.halt {
                break;
            }
        }
        self.io.log(
            &format!("Program exited successfully with code {}.\n", self.exit_code),
            LOG_EVENT,
        );
        Ok(self.exit_code)
    }

    fn step(&mut self, op: &Op) -> Result<()> {
        match op {
            Op::Literal(val) => self.data.push(val.clone()),
            Op::Placeholder(_) => Err(VmError::PlaceholderRun),
            Op::Code(opcode) => self.exec(*opcode),
        }
    }

    fn exec(&mut self, op: Opcode) -> Result<()> {
        use Opcode::*;
        match op {
            // *** Stack manipulation
            Pop => {
                self.data.pop()?;
            }
            PopN => {
                let num = self.data.pop_int()?;
                if num < 1 {
                    return Err(VmError::CountNotPositive);
                }
                for _ in 0..num {
                    self.data.pop()?;
                }
            }
            Dup => self.data.dup()?,
            DupN => {
                // Picking at a fixed depth n, n times, copies the top n
                // items in their original order: the stack grows under the
                // picks.
                let num = self.data.pop_int()?;
                if num < 1 {
                    return Err(VmError::CountNotPositive);
                }
                for _ in 0..num {
                    self.data.pick(num)?;
                }
            }
            Swap => self.data.swap()?,
            Rotate => {
                let num = self.data.pop_int()?;
                self.data.rotate(num.unsigned_abs() as usize, num > 0)?;
            }
            Pick => {
                let num = self.data.pop_int()?;
                self.data.pick(num)?;
            }
            Put => {
                let num = self.data.pop_int()?;
                let val = self.data.pop()?;
                self.data.put(val, num)?;
            }
            Depth => self.data.push(Val::Int(self.data.depth() as i32))?,
            Join => self.data.join()?,
            Split => {
                let index = self.data.pop_int()?;
                self.data.split(index)?;
            }

            // *** Control flow
            Exit => {
                self.exit_code = self.data.pop_int()?;
                self.halt = true;
            }
            Abort => return Err(VmError::Abort(self.data.pop_char_range()?)),
            Jump => self.ip = self.data.pop_label()?.pointer(),
            CJump => {
                // Label first, then the condition; both leave the stack even
                // when the jump is not taken.
                let target = self.data.pop_label()?.pointer();
                if self.data.pop_bool()? {
                    self.ip = target;
                }
            }
            Call => {
                self.calls.push(self.ip)?;
                self.ip = self.data.pop_label()?.pointer();
            }
            Return => self.ip = self.calls.pop()?,
            Sleep => self.sleep()?,
            Execute => self.execute_range()?,

            // *** Virtual disk
            Mount => {
                let sector_size = self.data.pop_int()?;
                let num_sectors = self.data.pop_int()?;
                let name = self.data.pop_char_range()?;
                self.disk.mount(&name, sector_size, num_sectors)?;
                self.io
                    .log(&format!("Mounting virtual disk: {}...\n", name), LOG_EVENT);
                self.io.log(
                    &format!(
                        "Size: {}, SectorSize: {}.\n",
                        self.disk.sector_size()? as i64 * self.disk.num_sectors()? as i64,
                        self.disk.sector_size()?
                    ),
                    LOG_INFO,
                );
            }
            Unmount => {
                if self.disk.is_mounted() {
                    self.io.log(
                        &format!("Unmounting virtual disk {}...\n", self.disk.name()),
                        LOG_EVENT,
                    );
                }
                self.disk.unmount()?;
            }
            VdInfo => {
                let sector_size = self.disk.sector_size()?;
                let num_sectors = self.disk.num_sectors()?;
                self.data.push(Val::Int(sector_size))?;
                self.data.push(Val::Int(num_sectors))?;
            }
            VdPos => {
                let pos = self.disk.position()?;
                self.data.push(Val::Int(pos as i32))?;
            }
            Sector => {
                let sector = self.data.pop_int()?;
                let pos = self.disk.sector_position(sector)?;
                self.data.push(Val::Int(pos as i32))?;
            }
            Seek => {
                let pos = self.data.pop_int()?;
                self.disk.seek_to(pos as i64)?;
            }
            ReadB => {
                let b = self.disk.read_bool()?;
                self.data.push(Val::Bool(b))?;
            }
            ReadC => {
                let c = self.disk.read_char()?;
                self.data.push(Val::Char(c))?;
            }
            ReadI => {
                let i = self.disk.read_int()?;
                self.data.push(Val::Int(i))?;
            }
            ReadF => {
                let f = self.disk.read_float()?;
                self.data.push(Val::Float(f))?;
            }
            ReadStr => {
                let range = self.disk.read_char_range()?;
                self.data.push_char_range(&range)?;
            }
            WriteB => {
                let b = self.data.pop_bool()?;
                let pos = self.disk.write_bool(b)?;
                self.log_write(1, pos);
            }
            WriteC => {
                let c = self.data.pop_char()?;
                let pos = self.disk.write_char(c)?;
                self.log_write(1, pos);
            }
            WriteI => {
                let i = self.data.pop_int()?;
                let pos = self.disk.write_int(i)?;
                self.log_write(4, pos);
            }
            WriteF => {
                let f = self.data.pop_float()?;
                let pos = self.disk.write_float(f)?;
                self.log_write(8, pos);
            }
            WriteStr => {
                let range = self.data.pop_char_range()?;
                let pos = self.disk.write_char_range(&range)?;
                self.log_write(4 + range.len() as i64, pos);
            }

            // *** Input/output
            Print => {
                let val = self.data.pop()?;
                self.io.print(&val.to_string());
            }
            Error => {
                let val = self.data.pop()?;
                self.io.error(&val.to_string());
            }
            Log => {
                let level = self.data.pop_int()?;
                if !(0..=3).contains(&level) {
                    return Err(VmError::LogLevel);
                }
                let val = self.data.pop()?;
                self.io.log(&val.to_string(), level);
            }
            PrintStr => {
                let range = self.data.pop_char_range()?;
                self.io.print(&range);
            }
            ErrorStr => {
                let range = self.data.pop_char_range()?;
                self.io.error(&range);
            }
            LogStr => {
                let level = self.data.pop_int()?;
                if !(0..=3).contains(&level) {
                    return Err(VmError::LogLevel);
                }
                let range = self.data.pop_char_range()?;
                self.io.log(&range, level);
            }
            GetLine => {
                let line = self.io.get_line()?;
                self.data.push_char_range(&line)?;
            }
            Debug => {
                let on = self.data.pop_bool()?;
                self.io.set_debug(on);
            }
            Newline => self.data.push(Val::Char('\n'))?,
            Tab => self.data.push(Val::Char('\t'))?,
            Space => self.data.push(Val::Char(' '))?,
            LogWarning => self.data.push(Val::Int(super::hci::LOG_WARNING))?,
            LogEvent => self.data.push(Val::Int(LOG_EVENT))?,
            LogInfo => self.data.push(Val::Int(LOG_INFO))?,
            LogVerbose => self.data.push(Val::Int(super::hci::LOG_VERBOSE))?,

            // *** Conversion
            BToI => {
                let b = self.data.pop_bool()?;
                self.data.push(Val::Int(if b { 1 } else { 0 }))?;
            }
            BToF => {
                let b = self.data.pop_bool()?;
                self.data.push(Val::Float(if b { 1.0 } else { 0.0 }))?;
            }
            IToB => {
                let i = self.data.pop_int()?;
                self.data.push(Val::Bool(i != 0))?;
            }
            IToF => {
                let i = self.data.pop_int()?;
                self.data.push(Val::Float(i as f64))?;
            }
            FToB => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Bool(f != 0.0))?;
            }
            FToI => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Int(f as i32))?;
            }
            StrToB => {
                let range = self.data.pop_char_range()?;
                self.data
                    .push(Val::Bool(range.eq_ignore_ascii_case("true")))?;
            }
            StrToI => {
                let range = self.data.pop_char_range()?;
                let i = range.parse::<i32>().map_err(|_| VmError::NotAnInt)?;
                self.data.push(Val::Int(i))?;
            }
            StrToF => {
                let range = self.data.pop_char_range()?;
                let f = range.parse::<f64>().map_err(|_| VmError::NotAFloat)?;
                self.data.push(Val::Float(f))?;
            }
            HexToI => {
                let range = self.data.pop_char_range()?;
                let digits = range.strip_prefix("0x").unwrap_or(&range);
                let i = u32::from_str_radix(digits, 16).map_err(|_| VmError::NotHex)?;
                self.data.push(Val::Int(i as i32))?;
            }
            IToHex => {
                let i = self.data.pop_int()?;
                self.data.push_char_range(&format!("{:x}", i as u32))?;
            }
            ToString => {
                let val = self.data.pop()?;
                self.data.push_char_range(&val.quoted())?;
            }
            CToIr => {
                let c = self.data.pop_char()?;
                self.data.push(Val::Int(c as i32))?;
            }
            IrToC => {
                let i = self.data.pop_int()?;
                self.data.push(Val::Char(i as u8 as char))?;
            }
            ToUpper => {
                let c = self.data.pop_char()?;
                self.data.push(Val::Char(c.to_ascii_uppercase()))?;
            }
            ToLower => {
                let c = self.data.pop_char()?;
                self.data.push(Val::Char(c.to_ascii_lowercase()))?;
            }

            // *** Logic
            And => {
                let b2 = self.data.pop_bool()?;
                let b1 = self.data.pop_bool()?;
                self.data.push(Val::Bool(b1 & b2))?;
            }
            Or => {
                let b2 = self.data.pop_bool()?;
                let b1 = self.data.pop_bool()?;
                self.data.push(Val::Bool(b1 | b2))?;
            }
            Xor => {
                let b2 = self.data.pop_bool()?;
                let b1 = self.data.pop_bool()?;
                self.data.push(Val::Bool(b1 ^ b2))?;
            }
            Not => {
                let b = self.data.pop_bool()?;
                self.data.push(Val::Bool(!b))?;
            }

            // *** Bitwise
            BitAnd => {
                let i2 = self.data.pop_int()?;
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Int(i1 & i2))?;
            }
            BitOr => {
                let i2 = self.data.pop_int()?;
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Int(i1 | i2))?;
            }
            BitXor => {
                let i2 = self.data.pop_int()?;
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Int(i1 ^ i2))?;
            }
            ShiftL => {
                let shift = self.data.pop_int()?;
                let i = self.data.pop_int()?;
                self.data.push(Val::Int(i.wrapping_shl(shift as u32)))?;
            }
            ShiftR => {
                let shift = self.data.pop_int()?;
                let i = self.data.pop_int()?;
                self.data.push(Val::Int(i.wrapping_shr(shift as u32)))?;
            }

            // *** Comparison
            IsBool => {
                let val = self.data.pop()?;
                self.data.push(Val::Bool(matches!(val, Val::Bool(_))))?;
            }
            IsChar => {
                let val = self.data.pop()?;
                self.data.push(Val::Bool(matches!(val, Val::Char(_))))?;
            }
            IsInt => {
                let val = self.data.pop()?;
                self.data.push(Val::Bool(matches!(val, Val::Int(_))))?;
            }
            IsFloat => {
                let val = self.data.pop()?;
                self.data.push(Val::Bool(matches!(val, Val::Float(_))))?;
            }
            StrIsBool => {
                let range = self.data.pop_char_range()?;
                let is = range.eq_ignore_ascii_case("true") || range.eq_ignore_ascii_case("false");
                self.data.push(Val::Bool(is))?;
            }
            StrIsInt => {
                let range = self.data.pop_char_range()?;
                self.data.push(Val::Bool(str_is_int(&range)))?;
            }
            StrIsHex => {
                let range = self.data.pop_char_range()?;
                self.data.push(Val::Bool(str_is_hex(&range)))?;
            }
            StrIsFloat => {
                let range = self.data.pop_char_range()?;
                self.data.push(Val::Bool(range.parse::<f64>().is_ok()))?;
            }
            CEquals => {
                let c2 = self.data.pop_char()?;
                let c1 = self.data.pop_char()?;
                self.data.push(Val::Bool(c1 == c2))?;
            }
            CGreater => {
                let c2 = self.data.pop_char()?;
                let c1 = self.data.pop_char()?;
                self.data.push(Val::Bool(c1 > c2))?;
            }
            CGreaterEq => {
                let c2 = self.data.pop_char()?;
                let c1 = self.data.pop_char()?;
                self.data.push(Val::Bool(c1 >= c2))?;
            }
            CLess => {
                let c2 = self.data.pop_char()?;
                let c1 = self.data.pop_char()?;
                self.data.push(Val::Bool(c1 < c2))?;
            }
            CLessEq => {
                let c2 = self.data.pop_char()?;
                let c1 = self.data.pop_char()?;
                self.data.push(Val::Bool(c1 <= c2))?;
            }
            IEquals => {
                let i2 = self.data.pop_int()?;
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Bool(i1 == i2))?;
            }
            IGreater => {
                let i2 = self.data.pop_int()?;
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Bool(i1 > i2))?;
            }
            IGreaterEq => {
                let i2 = self.data.pop_int()?;
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Bool(i1 >= i2))?;
            }
            ILess => {
                let i2 = self.data.pop_int()?;
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Bool(i1 < i2))?;
            }
            ILessEq => {
                let i2 = self.data.pop_int()?;
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Bool(i1 <= i2))?;
            }
            FEquals => {
                // Bit identity, not numeric equality: NaN matches an
                // identical NaN and 0.0 does not match -0.0.
                let f2 = self.data.pop_float()?;
                let f1 = self.data.pop_float()?;
                self.data.push(Val::Bool(f1.to_bits() == f2.to_bits()))?;
            }
            FGreater => {
                let f2 = self.data.pop_float()?;
                let f1 = self.data.pop_float()?;
                self.data.push(Val::Bool(f1 > f2))?;
            }
            FGreaterEq => {
                let f2 = self.data.pop_float()?;
                let f1 = self.data.pop_float()?;
                self.data.push(Val::Bool(f1 >= f2))?;
            }
            FLess => {
                let f2 = self.data.pop_float()?;
                let f1 = self.data.pop_float()?;
                self.data.push(Val::Bool(f1 < f2))?;
            }
            FLessEq => {
                let f2 = self.data.pop_float()?;
                let f1 = self.data.pop_float()?;
                self.data.push(Val::Bool(f1 <= f2))?;
            }

            // *** Math
            IAdd => {
                let i2 = self.data.pop_int()?;
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Int(i1.wrapping_add(i2)))?;
            }
            ISub => {
                let i2 = self.data.pop_int()?;
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Int(i1.wrapping_sub(i2)))?;
            }
            IMult => {
                let i2 = self.data.pop_int()?;
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Int(i1.wrapping_mul(i2)))?;
            }
            IDiv => {
                let i2 = self.data.pop_int()?;
                if i2 == 0 {
                    return Err(VmError::DivideByZero);
                }
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Int(i1.wrapping_div(i2)))?;
            }
            IPow => {
                let exp = self.data.pop_int()?;
                let base = self.data.pop_int()?;
                let result = (base as f64).powf(exp as f64).round();
                self.data.push(Val::Int(result as i32))?;
            }
            ISqrt => {
                let i = self.data.pop_int()?;
                self.data.push(Val::Int((i as f64).sqrt() as i32))?;
            }
            IAbs => {
                let i = self.data.pop_int()?;
                self.data.push(Val::Int(i.wrapping_abs()))?;
            }
            FAdd => {
                let f2 = self.data.pop_float()?;
                let f1 = self.data.pop_float()?;
                self.data.push(Val::Float(f1 + f2))?;
            }
            FSub => {
                let f2 = self.data.pop_float()?;
                let f1 = self.data.pop_float()?;
                self.data.push(Val::Float(f1 - f2))?;
            }
            FMult => {
                let f2 = self.data.pop_float()?;
                let f1 = self.data.pop_float()?;
                self.data.push(Val::Float(f1 * f2))?;
            }
            FDiv => {
                let f2 = self.data.pop_float()?;
                if f2 == 0.0 {
                    return Err(VmError::DivideByZero);
                }
                let f1 = self.data.pop_float()?;
                self.data.push(Val::Float(f1 / f2))?;
            }
            FPow => {
                let exp = self.data.pop_float()?;
                let base = self.data.pop_float()?;
                self.data.push(Val::Float(base.powf(exp)))?;
            }
            FSqrt => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.sqrt()))?;
            }
            FAbs => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.abs()))?;
            }
            Mod => {
                let i2 = self.data.pop_int()?;
                if i2 == 0 {
                    return Err(VmError::DivideByZero);
                }
                let i1 = self.data.pop_int()?;
                self.data.push(Val::Int(i1.wrapping_rem(i2)))?;
            }
            Rand => {
                let bound = self.data.pop_int()?;
                if bound < 1 {
                    return Err(VmError::RandBound);
                }
                let r = (OsRng.next_u32() % bound as u32) as i32;
                self.data.push(Val::Int(r))?;
            }
            FRand => {
                let r = (OsRng.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
                self.data.push(Val::Float(r))?;
            }
            Round => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Int(f.round() as i32))?;
            }
            Floor => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.floor()))?;
            }
            Ceil => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.ceil()))?;
            }
            Log10 => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.log10()))?;
            }
            NExp => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.exp()))?;
            }
            NLog => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.ln()))?;
            }
            Pi => self.data.push(Val::Float(std::f64::consts::PI))?,
            Sin => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.sin()))?;
            }
            Cos => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.cos()))?;
            }
            Tan => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.tan()))?;
            }
            ASin => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.asin()))?;
            }
            ACos => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.acos()))?;
            }
            ATan => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.atan()))?;
            }
            ToDeg => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.to_degrees()))?;
            }
            ToRad => {
                let f = self.data.pop_float()?;
                self.data.push(Val::Float(f.to_radians()))?;
            }

            // *** Time
            GetTime => {
                let secs = epoch_seconds();
                self.data.push(Val::Int(((secs / 3600) % 24) as i32))?;
                self.data.push(Val::Int(((secs / 60) % 60) as i32))?;
                self.data.push(Val::Int((secs % 60) as i32))?;
            }
            GetDate => {
                let (year, month, day) = civil_from_days(epoch_seconds() / 86400);
                self.data.push(Val::Int(year))?;
                self.data.push(Val::Int(month as i32))?;
                self.data.push(Val::Int(day as i32))?;
            }
        }
        Ok(())
    }

    fn log_write(&mut self, bytes: i64, pos: i64) {
        self.io.log(
            &format!("Writing {} bytes at position {}...\n", bytes, pos),
            LOG_INFO,
        );
    }

    fn sleep(&mut self) -> Result<()> {
        let ms = self.data.pop_int()?;
        if ms < 1 {
            return Err(VmError::SleepTime);
        }
        let deadline = Instant::now() + Duration::from_millis(ms as u64);
        loop {
            if self.interrupted.load(Ordering::SeqCst) {
                self.exit_code = 1;
                self.halt = true;
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep((deadline - now).min(Duration::from_millis(50)));
        }
    }

    /// Assembles and runs the popped char range as a nested program. The
    /// code segment, call stack, and instruction pointer are swapped out for
    /// fresh ones and always restored; the data stack is shared, which is
    /// how the nested program receives input and (on success) hands back its
    /// exit code. Failures inside the nest are reported, never propagated.
    fn execute_range(&mut self) -> Result<()> {
        if self.exec_depth >= MAX_EXEC_DEPTH {
            return Err(VmError::ExecuteDepth);
        }
        let source = self.data.pop_char_range()?;

        let saved_code = mem::take(&mut self.code);
        let saved_calls = mem::take(&mut self.calls);
        let saved_ip = mem::replace(&mut self.ip, UNSET);
        self.exec_depth += 1;

        self.io.log(
            &format!(
                "Stack machine v{}. Assembling code from character range...\n",
                VERSION
            ),
            LOG_EVENT,
        );
        let report = match asm::assemble(&source, self.io) {
            Err(e) => Some(format!("VMA FATAL: {}\n", e)),
            Ok(assembly) => {
                self.code = assembly.code;
                self.ip = assembly.entry;
                let nested = self
                    .run()
                    .and_then(|exit_code| self.data.push(Val::Int(exit_code)));
                match nested {
                    Ok(()) => None,
                    Err(e) => Some(format!("VM FATAL: {}\n", e)),
                }
            }
        };
        if let Some(message) = report {
            self.io.error(&message);
        }

        self.exec_depth -= 1;
        self.code = saved_code;
        self.calls = saved_calls;
        self.ip = saved_ip;
        self.exit_code = 0;
        self.halt = false;
        Ok(())
    }
}

/// `-?[0-9]{1,10}` and within i32 range; ten digits alone would admit
/// 2147483648, which no INT can hold.
fn str_is_int(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || digits.len() > 10 {
        return false;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    s.parse::<i32>().is_ok()
}

/// `(0x)?[0-9a-f]{1,8}`, case-insensitive.
fn str_is_hex(s: &str) -> bool {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    !digits.is_empty() && digits.len() <= 8 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

fn epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Days since the epoch to (year, month, day), after Howard Hinnant's civil
/// calendar algorithms.
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719468;
    let era = z.div_euclid(146097);
    let doe = z.rem_euclid(146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y as i32, m, d)
}
