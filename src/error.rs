//! Error taxonomy for assembly and execution, plus fatal setup errors.
//!
//! Diagnostics about the assembled program are never Rust errors: they are
//! [`ErrorKind`] values recorded in an [`ErrorLog`](crate::diagnostics::ErrorLog)
//! so that a pass always runs to completion. [`QuackError`] covers the few
//! conditions that stop the process, such as an unreadable source file.

use std::path::PathBuf;
use thiserror::Error;

/// The fixed set of 31 diagnostics, numbered 0-30.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Operand shape and range
    #[error("Operand Must Be Symbolic")]
    OperandMustBeSymbolic = 0,

    #[error("Operand Must Be Positive Integer")]
    OperandMustBePositive = 1,

    #[error("Operand Must Be Numeric")]
    OperandMustBeNumeric = 2,

    #[error("Extra Operands")]
    ExtraOperands = 3,

    #[error("Operand Too Large For Quack3200")]
    OperandTooLarge = 4,

    #[error("Operand Exceeds Quack3200 Final Location")]
    OperandExceedsFinalLocation = 5,

    // Symbols and labels
    #[error("Multiply Defined Symbol")]
    MultiplyDefinedSymbol = 6,

    #[error("Undefined Symbol")]
    UndefinedSymbol = 7,

    #[error("Symbol Does Not Meet Quack3200 Symbol Specification")]
    InvalidSymbol = 8,

    #[error("Multiply Defined Label")]
    MultiplyDefinedLabel = 9,

    // HALT placement
    #[error("HALT Instruction Can Only Be Included Once")]
    DuplicateHalt = 10,

    #[error("HALT Instruction Before Location 100 Will Not Be Detected By Emulator")]
    HaltBeforeEntryPoint = 11,

    #[error("Assembler Language Statements Are Not Allowed Before HALT Instruction")]
    DirectiveBeforeHalt = 12,

    #[error("Machine Language Statements Are Not Allowed After HALT Instruction")]
    MachineAfterHalt = 13,

    #[error("No HALT Instruction Detected for Execution Termination")]
    MissingHalt = 14,

    // END placement
    #[error("END Instruction Cannot Have A Label")]
    LabeledEnd = 15,

    #[error("END Instruction Can Only Be Included Once")]
    DuplicateEnd = 16,

    #[error("No END Instruction Detected")]
    MissingEnd = 17,

    #[error("Only Comments Are Allowed After END Instruction")]
    StatementAfterEnd = 18,

    // Constant and memory bounds
    #[error("Constant Too Large For Quack3200")]
    ConstantTooLarge = 19,

    #[error("Insufficient Memory For Translation")]
    InsufficientMemory = 20,

    // Miscellaneous syntax
    #[error("Invalid Register Specified")]
    InvalidRegister = 21,

    #[error("Invalid Assembly Language Statement")]
    InvalidStatement = 22,

    #[error("The Origin's Operand Must be Higher Than Current Location")]
    OriginNotAhead = 23,

    #[error("Comma Can Only Be Used To Separate Register From Operand")]
    MisplacedComma = 24,

    // Run-time arithmetic and input
    #[error("ADD Instruction Causes Overflow In a Register")]
    AddOverflow = 25,

    #[error("SUB Instruction Causes Overflow In a Register")]
    SubOverflow = 26,

    #[error("MULT Instruction Causes Overflow In a Register")]
    MultOverflow = 27,

    #[error("Only Integers Are Supported by Quack3200")]
    NonIntegerInput = 28,

    #[error("Division By Zero Is Undefined")]
    DivisionByZero = 29,

    #[error("Negative Sign Cannot Be Followed By 0")]
    NegativeZero = 30,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 31] = [
        ErrorKind::OperandMustBeSymbolic,
        ErrorKind::OperandMustBePositive,
        ErrorKind::OperandMustBeNumeric,
        ErrorKind::ExtraOperands,
        ErrorKind::OperandTooLarge,
        ErrorKind::OperandExceedsFinalLocation,
        ErrorKind::MultiplyDefinedSymbol,
        ErrorKind::UndefinedSymbol,
        ErrorKind::InvalidSymbol,
        ErrorKind::MultiplyDefinedLabel,
        ErrorKind::DuplicateHalt,
        ErrorKind::HaltBeforeEntryPoint,
        ErrorKind::DirectiveBeforeHalt,
        ErrorKind::MachineAfterHalt,
        ErrorKind::MissingHalt,
        ErrorKind::LabeledEnd,
        ErrorKind::DuplicateEnd,
        ErrorKind::MissingEnd,
        ErrorKind::StatementAfterEnd,
        ErrorKind::ConstantTooLarge,
        ErrorKind::InsufficientMemory,
        ErrorKind::InvalidRegister,
        ErrorKind::InvalidStatement,
        ErrorKind::OriginNotAhead,
        ErrorKind::MisplacedComma,
        ErrorKind::AddOverflow,
        ErrorKind::SubOverflow,
        ErrorKind::MultOverflow,
        ErrorKind::NonIntegerInput,
        ErrorKind::DivisionByZero,
        ErrorKind::NegativeZero,
    ];

    /// Numeric code of this diagnostic (0-30).
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Diagnostics raised while the emulator runs.
    ///
    /// Code 19 is shared: it is also recorded for oversized DC literals.
    pub fn is_runtime(self) -> bool {
        matches!(
            self,
            ErrorKind::AddOverflow
                | ErrorKind::SubOverflow
                | ErrorKind::MultOverflow
                | ErrorKind::NonIntegerInput
                | ErrorKind::DivisionByZero
        )
    }
}

/// Fatal errors: the assembler cannot continue at all.
#[derive(Debug, Error)]
pub enum QuackError {
    #[error("source file could not be opened: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read source line: {0}")]
    Read(#[source] std::io::Error),

    #[error("console I/O failed: {0}")]
    Console(#[source] std::io::Error),
}

impl QuackError {
    /// Create an error for a source file that could not be opened.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for fallible assembler operations.
pub type Result<T> = std::result::Result<T, QuackError>;
