use thiserror::Error;

/// Fatal problems found while assembling source. These always stop the
/// machine before the first instruction runs; the driver reports them with
/// the `VMA FATAL:` prefix.
#[derive(Debug, Error)]
pub enum AsmError {
    #[error("Could not read source file.")]
    SourceUnreadable(#[source] std::io::Error),
    #[error("Label name '{0}' disallowed by the assembler.")]
    NameDisallowed(String),
    #[error("Label '{0}' cannot be declared more than once.")]
    DuplicateLabel(String),
    #[error("Duplicate label definition: {0}")]
    DuplicateEntry(String),
    #[error("BEGIN cannot be defined more than once.")]
    DuplicateBegin,
    #[error("BEGIN is undefined or out of bounds.")]
    BadBegin,
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("Cannot remove nonexistent symbol: {0}")]
    UnknownRemoval(String),
    #[error("No instruction exists at location: {0}")]
    ReplaceOutOfBounds(usize),
}

/// Fatal problems hit while a program is running. The run loop wraps these
/// in [`VmError::Faulted`] so the report names the instruction that failed;
/// the driver adds the `VM FATAL:` prefix.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("Stack underflow.")]
    Underflow,
    #[error("Stack overflow.")]
    Overflow,
    #[error("{0} expected.")]
    WrongType(&'static str),
    #[error("Maximum recursion depth exceeded.")]
    CallOverflow,
    #[error("You cannot RETURN without first making a CALL.")]
    CallUnderflow,
    #[error("Instruction pointer out of bounds.")]
    IpOutOfBounds,
    #[error("Program did not assemble correctly, placeholder run.")]
    PlaceholderRun,
    #[error("Number of items must be greater than zero.")]
    CountNotPositive,
    #[error("Number of items to rotate must be non-zero.")]
    RotateZero,
    #[error("Location to pick from must be greater than zero.")]
    PickIndex,
    #[error("Location to put to must be greater than zero.")]
    PutIndex,
    #[error("Range size indicator must be greater than zero.")]
    RangeEmpty,
    #[error("Stack range size must be non-negative.")]
    RangeNegative,
    #[error("Stack range size must be greater than zero.")]
    SplitEmpty,
    #[error("Index must be between 0 and {0}.")]
    SplitIndex(i32),
    #[error("Cannot divide by zero.")]
    DivideByZero,
    #[error("Sleep time must be greater than zero.")]
    SleepTime,
    #[error("Log level must be between 0 and 3.")]
    LogLevel,
    #[error("Upper bound must be greater than 0.")]
    RandBound,
    #[error("Maximum EXECUTE depth exceeded.")]
    ExecuteDepth,
    #[error("Character range does not represent a valid integer.")]
    NotAnInt,
    #[error("Character range does not represent a valid float.")]
    NotAFloat,
    #[error("Character range does not represent valid hexadecimal.")]
    NotHex,
    #[error("{0}")]
    Abort(String),
    #[error("No disk has been mounted.")]
    NoDisk,
    #[error("File pointer goes out of bounds.")]
    DiskBounds,
    #[error("Invalid size specifications for virtual disk.")]
    DiskGeometry,
    #[error("Could not mount virtual disk. {0}")]
    MountFailed(String),
    #[error("Failed to unmount virtual disk. {0}")]
    UnmountFailed(String),
    #[error("Unable to {0} {1}. {2}")]
    DiskIo(&'static str, &'static str, String),
    #[error("Input past end.")]
    InputExhausted,
    #[error("{op}: {source}")]
    Faulted {
        op: String,
        #[source]
        source: Box<VmError>,
    },
}
