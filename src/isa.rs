//! The Quack3200 machine definition.
//!
//! 100,000 memory cells, 10 accumulator registers, 13 opcodes and
//! 8-digit signed arithmetic. Mnemonic lookup goes through compile-time
//! perfect hash maps keyed on the uppercased token.

use phf::phf_map;
use std::fmt;

/// Number of addressable memory cells.
pub const MEMORY_SIZE: usize = 100_000;

/// Highest valid memory address.
pub const LAST_ADDRESS: u32 = 99_999;

/// Number of general registers.
pub const REGISTER_COUNT: usize = 10;

/// Register used when an instruction does not name one.
pub const DEFAULT_REGISTER: Register = Register(9);

/// Largest value a register or constant may hold.
pub const WORD_MAX: i64 = 99_999_999;

/// Smallest value a register or constant may hold.
pub const WORD_MIN: i64 = -99_999_999;

/// Address where execution starts. Locations below it never run.
pub const ENTRY_POINT: u32 = 100;

/// Divisor that isolates the opcode field of a machine word.
pub const OPCODE_DIVISOR: i64 = 1_000_000;

/// Divisor that isolates the register field of a machine word.
pub const REGISTER_DIVISOR: i64 = 100_000;

/// Machine-language opcodes with their fixed numeric ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add = 1,
    Sub = 2,
    Mult = 3,
    Div = 4,
    Load = 5,
    Store = 6,
    Read = 7,
    Write = 8,
    B = 9,
    Bm = 10,
    Bz = 11,
    Bp = 12,
    Halt = 13,
}

static OPCODES: phf::Map<&'static str, Opcode> = phf_map! {
    "ADD" => Opcode::Add,
    "SUB" => Opcode::Sub,
    "MULT" => Opcode::Mult,
    "DIV" => Opcode::Div,
    "LOAD" => Opcode::Load,
    "STORE" => Opcode::Store,
    "READ" => Opcode::Read,
    "WRITE" => Opcode::Write,
    "B" => Opcode::B,
    "BM" => Opcode::Bm,
    "BZ" => Opcode::Bz,
    "BP" => Opcode::Bp,
    "HALT" => Opcode::Halt,
};

impl Opcode {
    pub const ALL: [Opcode; 13] = [
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mult,
        Opcode::Div,
        Opcode::Load,
        Opcode::Store,
        Opcode::Read,
        Opcode::Write,
        Opcode::B,
        Opcode::Bm,
        Opcode::Bz,
        Opcode::Bp,
        Opcode::Halt,
    ];

    /// Look up a mnemonic. Expects the token already uppercased.
    #[inline]
    pub fn from_mnemonic(word: &str) -> Option<Self> {
        OPCODES.get(word).copied()
    }

    /// Map a numeric id (1-13) back to its opcode.
    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.id() == id)
    }

    #[inline]
    pub fn id(self) -> i64 {
        self as i64
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mult => "MULT",
            Opcode::Div => "DIV",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::B => "B",
            Opcode::Bm => "BM",
            Opcode::Bz => "BZ",
            Opcode::Bp => "BP",
            Opcode::Halt => "HALT",
        }
    }

    /// Opcodes that may omit the register and take only an operand.
    #[inline]
    pub fn has_short_form(self) -> bool {
        matches!(self, Opcode::Read | Opcode::Write | Opcode::B)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Assembler directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Set the location counter.
    Org,
    /// Reserve storage cells.
    Ds,
    /// Define a constant cell.
    Dc,
}

static DIRECTIVES: phf::Map<&'static str, Directive> = phf_map! {
    "ORG" => Directive::Org,
    "DS" => Directive::Ds,
    "DC" => Directive::Dc,
};

impl Directive {
    /// Look up a directive. Expects the token already uppercased.
    #[inline]
    pub fn from_mnemonic(word: &str) -> Option<Self> {
        DIRECTIVES.get(word).copied()
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Directive::Org => "ORG",
            Directive::Ds => "DS",
            Directive::Dc => "DC",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A register number, always 0-9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Register(u8);

impl Register {
    pub fn new(number: u8) -> Option<Self> {
        (usize::from(number) < REGISTER_COUNT).then_some(Self(number))
    }

    /// Parse a register field: exactly one decimal digit.
    pub fn parse(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_digit(10).and_then(|d| Self::new(d as u8)),
            _ => None,
        }
    }

    #[inline]
    pub fn number(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A memory address, always 0-99,999.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(u32);

impl Address {
    pub const ZERO: Address = Address(0);

    pub fn new(value: u32) -> Option<Self> {
        (value <= LAST_ADDRESS).then_some(Self(value))
    }

    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The following address, or `None` past the end of memory.
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}
