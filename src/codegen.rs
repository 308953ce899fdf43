//! Machine-word encoding.
//!
//! Instructions are decimal words `OO R AAAAA`:
//! `opcode * 10^6 + register * 10^5 + address`. DC constants are stored as
//! their literal signed value and never use that layout.

use crate::isa::{Address, OPCODE_DIVISOR, Opcode, REGISTER_DIVISOR, Register};
use std::fmt;

/// Width of a DC constant's magnitude in the listing.
const CONSTANT_DIGITS: usize = 8;

/// A fully resolved machine instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineWord {
    pub opcode: Opcode,
    pub register: Register,
    pub address: Address,
}

impl MachineWord {
    pub fn new(opcode: Opcode, register: Register, address: Address) -> Self {
        Self {
            opcode,
            register,
            address,
        }
    }

    #[inline]
    pub fn encode(&self) -> i64 {
        self.opcode.id() * OPCODE_DIVISOR
            + i64::from(self.register.number()) * REGISTER_DIVISOR
            + i64::from(self.address.value())
    }

    /// Split a memory word into its fields.
    ///
    /// `None` when the opcode field is not 1-13, as for data cells, zero
    /// cells and negative constants.
    pub fn decode(word: i64) -> Option<Self> {
        let opcode = Opcode::from_id(word / OPCODE_DIVISOR)?;
        let register = Register::new(((word % OPCODE_DIVISOR) / REGISTER_DIVISOR) as u8)?;
        let address = Address::new((word % REGISTER_DIVISOR) as u32)?;
        Some(Self::new(opcode, register, address))
    }
}

impl fmt::Display for MachineWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}{}{}",
            self.opcode.id(),
            self.register,
            self.address
        )
    }
}

/// The CONTENTS produced for one line in Pass II.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    /// DS, ORG, comments, END, and lines after END.
    Empty,
    Instruction(MachineWord),
    /// Operand symbol not in the table (or rejected); only `OOR` is known.
    Unresolved { opcode: Opcode, register: Register },
    /// Operand symbol is multiply defined; listed as `OOR?????`.
    Ambiguous { opcode: Opcode, register: Register },
    Constant(i64),
}

impl Content {
    /// Word to store in memory, if this content has one.
    pub fn word(&self) -> Option<i64> {
        match self {
            Content::Instruction(word) => Some(word.encode()),
            Content::Constant(value) => Some(*value),
            Content::Empty | Content::Unresolved { .. } | Content::Ambiguous { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Content::Empty)
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Empty => Ok(()),
            Content::Instruction(word) => fmt::Display::fmt(word, f),
            Content::Unresolved { opcode, register } => {
                write!(f, "{:02}{}", opcode.id(), register)
            }
            Content::Ambiguous { opcode, register } => {
                write!(f, "{:02}{}?????", opcode.id(), register)
            }
            Content::Constant(value) => f.write_str(&constant_text(*value)),
        }
    }
}

/// Listing text of a DC constant: magnitude padded to 8 digits, `-` in front
/// when negative.
pub fn constant_text(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!(
        "{sign}{:0width$}",
        value.unsigned_abs(),
        width = CONSTANT_DIGITS
    )
}
