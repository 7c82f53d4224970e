use super::Val;
use std::rc::Rc;

/// ## Instruction set
///
/// The machine has no registers; every instruction works the operand stack.
/// `Opcode` carries no payload — the one parameterised operation, PUSH, is
/// synthesised by the assembler as an [`Op::Literal`] whenever a literal
/// constant appears in source, and is deliberately absent from the mnemonic
/// table.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    // *** Stack manipulation
    Pop,
    PopN,
    Dup,
    DupN,
    Swap,
    Rotate,
    Pick,
    Put,
    Depth,
    Join,
    Split,

    // *** Control flow
    Exit,
    Abort,
    Jump,
    CJump,
    Call,
    Return,
    Sleep,
    Execute,

    // *** Virtual disk
    Mount,
    Unmount,
    VdInfo,
    VdPos,
    Sector,
    Seek,
    ReadB,
    ReadC,
    ReadI,
    ReadF,
    ReadStr,
    WriteB,
    WriteC,
    WriteI,
    WriteF,
    WriteStr,

    // *** Input/output
    Print,
    Error,
    Log,
    PrintStr,
    ErrorStr,
    LogStr,
    GetLine,
    Debug,
    Newline,
    Tab,
    Space,
    LogWarning,
    LogEvent,
    LogInfo,
    LogVerbose,

    // *** Conversion
    BToI,
    BToF,
    IToB,
    IToF,
    FToB,
    FToI,
    StrToB,
    StrToI,
    StrToF,
    HexToI,
    IToHex,
    ToString,
    CToIr,
    IrToC,
    ToUpper,
    ToLower,

    // *** Logic
    And,
    Or,
    Xor,
    Not,

    // *** Bitwise
    BitAnd,
    BitOr,
    BitXor,
    ShiftL,
    ShiftR,

    // *** Comparison
    IsBool,
    IsChar,
    IsInt,
    IsFloat,
    StrIsBool,
    StrIsInt,
    StrIsHex,
    StrIsFloat,
    CEquals,
    CGreater,
    CGreaterEq,
    CLess,
    CLessEq,
    IEquals,
    IGreater,
    IGreaterEq,
    ILess,
    ILessEq,
    FEquals,
    FGreater,
    FGreaterEq,
    FLess,
    FLessEq,

    // *** Math
    IAdd,
    ISub,
    IMult,
    IDiv,
    IPow,
    ISqrt,
    IAbs,
    FAdd,
    FSub,
    FMult,
    FDiv,
    FPow,
    FSqrt,
    FAbs,
    Mod,
    Rand,
    FRand,
    Round,
    Floor,
    Ceil,
    Log10,
    NExp,
    NLog,
    Pi,
    Sin,
    Cos,
    Tan,
    ASin,
    ACos,
    ATan,
    ToDeg,
    ToRad,

    // *** Time
    GetTime,
    GetDate,
}

impl Opcode {
    /// Case-insensitive mnemonic lookup; the assembler's instruction table.
    pub fn lookup(name: &str) -> Option<Opcode> {
        use Opcode::*;
        let token = name.to_ascii_uppercase();
        let op = match token.as_str() {
            "POP" => Pop,
            "POPN" => PopN,
            "DUP" => Dup,
            "DUPN" => DupN,
            "SWAP" => Swap,
            "ROTATE" => Rotate,
            "PICK" => Pick,
            "PUT" => Put,
            "DEPTH" => Depth,
            "JOIN" => Join,
            "SPLIT" => Split,

            "EXIT" => Exit,
            "ABORT" => Abort,
            "JUMP" => Jump,
            "CJUMP" => CJump,
            "CALL" => Call,
            "RETURN" => Return,
            "SLEEP" => Sleep,
            "EXECUTE" => Execute,

            "MOUNT" => Mount,
            "UNMOUNT" => Unmount,
            "VDINFO" => VdInfo,
            "VDPOS" => VdPos,
            "SECTOR" => Sector,
            "SEEK" => Seek,
            "READB" => ReadB,
            "READC" => ReadC,
            "READI" => ReadI,
            "READF" => ReadF,
            "READSTR" => ReadStr,
            "WRITEB" => WriteB,
            "WRITEC" => WriteC,
            "WRITEI" => WriteI,
            "WRITEF" => WriteF,
            "WRITESTR" => WriteStr,

            "PRINT" => Print,
            "ERROR" => Error,
            "LOG" => Log,
            "PRINTSTR" => PrintStr,
            "ERRORSTR" => ErrorStr,
            "LOGSTR" => LogStr,
            "GETLINE" => GetLine,
            "DEBUG" => Debug,
            "NEWLINE" => Newline,
            "TAB" => Tab,
            "SPACE" => Space,
            "LOGWARNING" => LogWarning,
            "LOGEVENT" => LogEvent,
            "LOGINFO" => LogInfo,
            "LOGVERBOSE" => LogVerbose,

            "BTOI" => BToI,
            "BTOF" => BToF,
            "ITOB" => IToB,
            "ITOF" => IToF,
            "FTOB" => FToB,
            "FTOI" => FToI,
            "STRTOB" => StrToB,
            "STRTOI" => StrToI,
            "STRTOF" => StrToF,
            "HEXTOI" => HexToI,
            "ITOHEX" => IToHex,
            "TOSTRING" => ToString,
            "CTOIR" => CToIr,
            "IRTOC" => IrToC,
            "TOUPPER" => ToUpper,
            "TOLOWER" => ToLower,

            "AND" => And,
            "OR" => Or,
            "XOR" => Xor,
            "NOT" => Not,

            "BITAND" => BitAnd,
            "BITOR" => BitOr,
            "BITXOR" => BitXor,
            "SHIFTL" => ShiftL,
            "SHIFTR" => ShiftR,

            "ISBOOL" => IsBool,
            "ISCHAR" => IsChar,
            "ISINT" => IsInt,
            "ISFLOAT" => IsFloat,
            "STRISBOOL" => StrIsBool,
            "STRISINT" => StrIsInt,
            "STRISHEX" => StrIsHex,
            "STRISFLOAT" => StrIsFloat,
            "CEQUALS" => CEquals,
            "CGREATER" => CGreater,
            "CGREATEREQ" => CGreaterEq,
            "CLESS" => CLess,
            "CLESSEQ" => CLessEq,
            "IEQUALS" => IEquals,
            "IGREATER" => IGreater,
            "IGREATEREQ" => IGreaterEq,
            "ILESS" => ILess,
            "ILESSEQ" => ILessEq,
            "FEQUALS" => FEquals,
            "FGREATER" => FGreater,
            "FGREATEREQ" => FGreaterEq,
            "FLESS" => FLess,
            "FLESSEQ" => FLessEq,

            "IADD" => IAdd,
            "ISUB" => ISub,
            "IMULT" => IMult,
            "IDIV" => IDiv,
            "IPOW" => IPow,
            "ISQRT" => ISqrt,
            "IABS" => IAbs,
            "FADD" => FAdd,
            "FSUB" => FSub,
            "FMULT" => FMult,
            "FDIV" => FDiv,
            "FPOW" => FPow,
            "FSQRT" => FSqrt,
            "FABS" => FAbs,
            "MOD" => Mod,
            "RAND" => Rand,
            "FRAND" => FRand,
            "ROUND" => Round,
            "FLOOR" => Floor,
            "CEIL" => Ceil,
            "LOG10" => Log10,
            "NEXP" => NExp,
            "NLOG" => NLog,
            "PI" => Pi,
            "SIN" => Sin,
            "COS" => Cos,
            "TAN" => Tan,
            "ASIN" => ASin,
            "ACOS" => ACos,
            "ATAN" => ATan,
            "TODEG" => ToDeg,
            "TORAD" => ToRad,

            "GETTIME" => GetTime,
            "GETDATE" => GetDate,

            _ => return None,
        };
        Some(op)
    }

    pub fn exists(name: &str) -> bool {
        Opcode::lookup(name).is_some()
    }

    pub fn name(self) -> &'static str {
        use Opcode::*;
        match self {
            Pop => "POP",
            PopN => "POPN",
            Dup => "DUP",
            DupN => "DUPN",
            Swap => "SWAP",
            Rotate => "ROTATE",
            Pick => "PICK",
            Put => "PUT",
            Depth => "DEPTH",
            Join => "JOIN",
            Split => "SPLIT",

            Exit => "EXIT",
            Abort => "ABORT",
            Jump => "JUMP",
            CJump => "CJUMP",
            Call => "CALL",
            Return => "RETURN",
            Sleep => "SLEEP",
            Execute => "EXECUTE",

            Mount => "MOUNT",
            Unmount => "UNMOUNT",
            VdInfo => "VDINFO",
            VdPos => "VDPOS",
            Sector => "SECTOR",
            Seek => "SEEK",
            ReadB => "READB",
            ReadC => "READC",
            ReadI => "READI",
            ReadF => "READF",
            ReadStr => "READSTR",
            WriteB => "WRITEB",
            WriteC => "WRITEC",
            WriteI => "WRITEI",
            WriteF => "WRITEF",
            WriteStr => "WRITESTR",

            Print => "PRINT",
            Error => "ERROR",
            Log => "LOG",
            PrintStr => "PRINTSTR",
            ErrorStr => "ERRORSTR",
            LogStr => "LOGSTR",
            GetLine => "GETLINE",
            Debug => "DEBUG",
            Newline => "NEWLINE",
            Tab => "TAB",
            Space => "SPACE",
            LogWarning => "LOGWARNING",
            LogEvent => "LOGEVENT",
            LogInfo => "LOGINFO",
            LogVerbose => "LOGVERBOSE",

            BToI => "BTOI",
            BToF => "BTOF",
            IToB => "ITOB",
            IToF => "ITOF",
            FToB => "FTOB",
            FToI => "FTOI",
            StrToB => "STRTOB",
            StrToI => "STRTOI",
            StrToF => "STRTOF",
            HexToI => "HEXTOI",
            IToHex => "ITOHEX",
            ToString => "TOSTRING",
            CToIr => "CTOIR",
            IrToC => "IRTOC",
            ToUpper => "TOUPPER",
            ToLower => "TOLOWER",

            And => "AND",
            Or => "OR",
            Xor => "XOR",
            Not => "NOT",

            BitAnd => "BITAND",
            BitOr => "BITOR",
            BitXor => "BITXOR",
            ShiftL => "SHIFTL",
            ShiftR => "SHIFTR",

            IsBool => "ISBOOL",
            IsChar => "ISCHAR",
            IsInt => "ISINT",
            IsFloat => "ISFLOAT",
            StrIsBool => "STRISBOOL",
            StrIsInt => "STRISINT",
            StrIsHex => "STRISHEX",
            StrIsFloat => "STRISFLOAT",
            CEquals => "CEQUALS",
            CGreater => "CGREATER",
            CGreaterEq => "CGREATEREQ",
            CLess => "CLESS",
            CLessEq => "CLESSEQ",
            IEquals => "IEQUALS",
            IGreater => "IGREATER",
            IGreaterEq => "IGREATEREQ",
            ILess => "ILESS",
            ILessEq => "ILESSEQ",
            FEquals => "FEQUALS",
            FGreater => "FGREATER",
            FGreaterEq => "FGREATEREQ",
            FLess => "FLESS",
            FLessEq => "FLESSEQ",

            IAdd => "IADD",
            ISub => "ISUB",
            IMult => "IMULT",
            IDiv => "IDIV",
            IPow => "IPOW",
            ISqrt => "ISQRT",
            IAbs => "IABS",
            FAdd => "FADD",
            FSub => "FSUB",
            FMult => "FMULT",
            FDiv => "FDIV",
            FPow => "FPOW",
            FSqrt => "FSQRT",
            FAbs => "FABS",
            Mod => "MOD",
            Rand => "RAND",
            FRand => "FRAND",
            Round => "ROUND",
            Floor => "FLOOR",
            Ceil => "CEIL",
            Log10 => "LOG10",
            NExp => "NEXP",
            NLog => "NLOG",
            Pi => "PI",
            Sin => "SIN",
            Cos => "COS",
            Tan => "TAN",
            ASin => "ASIN",
            ACos => "ACOS",
            ATan => "ATAN",
            ToDeg => "TODEG",
            ToRad => "TORAD",

            GetTime => "GETTIME",
            GetDate => "GETDATE",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One record of the code segment. `Literal` is the assembler-synthesised
/// PUSH; `Placeholder` only exists between pass 1 and pass 2, and running
/// one means label resolution was skipped or corrupted.
#[derive(Debug, Clone)]
pub enum Op {
    Code(Opcode),
    Literal(Val),
    Placeholder(Rc<str>),
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Op::Code(op) => write!(f, "{}", op),
            Op::Literal(val) => write!(f, "PUSH[{}]", val.quoted()),
            Op::Placeholder(name) => write!(f, "{}", name),
        }
    }
}
