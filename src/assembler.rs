//! Two-pass translation.
//!
//! Pass I walks the source once, advancing the location counter and
//! recording every definable label. Its diagnostics are provisional and
//! dropped when it finishes. Pass II rewinds, classifies every line again,
//! resolves operands against the symbol table, places words into memory and
//! records the diagnostics that are kept.

use crate::codegen::{Content, MachineWord};
use crate::diagnostics::ErrorLog;
use crate::emulator::Memory;
use crate::error::{ErrorKind, Result};
use crate::isa::{Address, Directive, ENTRY_POINT, MEMORY_SIZE, Opcode, Register};
use crate::parser::{ParsedLine, Statement, StatementKind, classify};
use crate::source::LineSource;
use crate::symbols::{SymbolTable, SymbolValue};
use tracing::{debug, info, warn};

/// Statement text for diagnostics that belong to no particular line.
pub const NO_STATEMENT: &str = "*****";

/// One line of the translation listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine {
    /// Location counter when the line was read.
    pub location: Address,
    pub content: Content,
    /// The source line, verbatim.
    pub statement: String,
    pub kind: StatementKind,
}

impl ListingLine {
    /// Location to show in the listing; comments and END have none.
    pub fn shown_location(&self) -> Option<Address> {
        match self.kind {
            StatementKind::MachineLanguage | StatementKind::AssemblerDirective => {
                Some(self.location)
            }
            StatementKind::Comment | StatementKind::End => None,
        }
    }
}

/// Output of Pass II.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    pub lines: Vec<ListingLine>,
    pub memory: Memory,
    /// Some statement sits in 1-99, below the entry point.
    pub below_entry_point: bool,
}

/// Build the symbol table.
///
/// Stops at the first END or at end of input, and leaves `log` empty either way.
pub fn pass_one<S: LineSource>(source: &mut S, log: &mut ErrorLog) -> Result<SymbolTable> {
    let mut symbols = SymbolTable::new();
    let mut location = Address::ZERO;

    while let Some(line) = source.next_line()? {
        let parsed = classify(&line, log);
        if parsed.kind() == StatementKind::End {
            break;
        }
        if let Some(label) = parsed.definable_label() {
            symbols.define(label, location);
        }
        location = advance_location(&parsed, location, &line, log);
    }

    info!(symbols = symbols.len(), "pass I complete");
    log.reset();
    Ok(symbols)
}

/// Record a diagnostic for every multiply-defined label, named by the label.
pub fn report_multiply_defined_labels(symbols: &SymbolTable, log: &mut ErrorLog) {
    for name in symbols.multiply_defined() {
        log.record(ErrorKind::MultiplyDefinedLabel, name);
    }
}

/// Location counter after `parsed`.
///
/// An advance that would leave memory is refused: the counter stays put and
/// the matching diagnostic is recorded against `statement`.
pub fn advance_location(
    parsed: &ParsedLine,
    location: Address,
    statement: &str,
    log: &mut ErrorLog,
) -> Address {
    match parsed.statement {
        Statement::Comment | Statement::End => location,
        Statement::Directive {
            directive: Directive::Ds,
            value,
        } => {
            let next = i64::from(location.value()) + value;
            match address_below_limit(next) {
                Some(next) => next,
                None => {
                    log.record(ErrorKind::OperandExceedsFinalLocation, statement);
                    location
                }
            }
        }
        Statement::Directive {
            directive: Directive::Org,
            value,
        } => match address_below_limit(value) {
            Some(origin) if origin > location => origin,
            Some(_) => {
                log.record(ErrorKind::OriginNotAhead, statement);
                location
            }
            None => {
                log.record(ErrorKind::OperandExceedsFinalLocation, statement);
                location
            }
        },
        Statement::Machine { .. }
        | Statement::Directive {
            directive: Directive::Dc,
            ..
        } => match location.next() {
            Some(next) => next,
            None => {
                log.record(ErrorKind::InsufficientMemory, statement);
                location
            }
        },
    }
}

fn address_below_limit(value: i64) -> Option<Address> {
    if (0..MEMORY_SIZE as i64).contains(&value) {
        Address::new(u32::try_from(value).ok()?)
    } else {
        None
    }
}

/// Translate the source into listing lines and a memory image.
pub fn pass_two<S: LineSource>(
    source: &mut S,
    symbols: &SymbolTable,
    log: &mut ErrorLog,
) -> Result<Translation> {
    source.rewind()?;
    let mut pass = PassTwo::new(symbols, log);
    while let Some(line) = source.next_line()? {
        pass.line(line);
    }
    Ok(pass.finish())
}

struct PassTwo<'a> {
    symbols: &'a SymbolTable,
    log: &'a mut ErrorLog,
    location: Address,
    seen_end: bool,
    seen_halt: bool,
    translation: Translation,
}

impl<'a> PassTwo<'a> {
    fn new(symbols: &'a SymbolTable, log: &'a mut ErrorLog) -> Self {
        Self {
            symbols,
            log,
            location: Address::ZERO,
            seen_end: false,
            seen_halt: false,
            translation: Translation::default(),
        }
    }

    fn line(&mut self, statement: String) {
        let parsed = classify(&statement, self.log);
        let content = self.translate(&parsed, &statement);
        if let Some(word) = content.word() {
            self.translation.memory.write(self.location, word);
        }

        let location = self.location;
        self.location = advance_location(&parsed, location, &statement, self.log);
        let placed = self.location.value();
        if placed > 0 && placed < ENTRY_POINT {
            self.translation.below_entry_point = true;
        }

        debug!(location = location.value(), %content, "translated");
        self.translation.lines.push(ListingLine {
            location,
            content,
            statement,
            kind: parsed.kind(),
        });
    }

    fn translate(&mut self, parsed: &ParsedLine, statement: &str) -> Content {
        if self.seen_end {
            match parsed.kind() {
                StatementKind::End => self.log.record(ErrorKind::DuplicateEnd, statement),
                StatementKind::Comment => {}
                StatementKind::MachineLanguage | StatementKind::AssemblerDirective => {
                    self.log.record(ErrorKind::StatementAfterEnd, statement)
                }
            }
            return Content::Empty;
        }

        match &parsed.statement {
            Statement::Machine {
                opcode,
                register,
                operand,
            } => self.machine(*opcode, *register, operand.as_deref(), statement),
            Statement::Directive { directive, value } => {
                if !self.seen_halt && *directive != Directive::Org {
                    self.log.record(ErrorKind::DirectiveBeforeHalt, statement);
                }
                match directive {
                    Directive::Dc => Content::Constant(*value),
                    Directive::Ds | Directive::Org => Content::Empty,
                }
            }
            Statement::Comment => Content::Empty,
            Statement::End => {
                self.seen_end = true;
                Content::Empty
            }
        }
    }

    fn machine(
        &mut self,
        opcode: Opcode,
        register: Register,
        operand: Option<&str>,
        statement: &str,
    ) -> Content {
        if self.seen_halt {
            self.log.record(ErrorKind::MachineAfterHalt, statement);
        }

        if opcode == Opcode::Halt {
            if self.seen_halt {
                self.log.record(ErrorKind::DuplicateHalt, statement);
            }
            if self.location.value() < ENTRY_POINT {
                self.log.record(ErrorKind::HaltBeforeEntryPoint, statement);
            }
            self.seen_halt = true;
            return Content::Instruction(MachineWord::new(opcode, register, Address::ZERO));
        }

        let unresolved = Content::Unresolved { opcode, register };
        let Some(symbol) = operand else {
            return unresolved;
        };
        match self.symbols.lookup(symbol) {
            Some(SymbolValue::Location(address)) => {
                Content::Instruction(MachineWord::new(opcode, register, address))
            }
            Some(SymbolValue::MultiplyDefined) => {
                self.log.record(ErrorKind::MultiplyDefinedSymbol, statement);
                Content::Ambiguous { opcode, register }
            }
            None => {
                self.log.record(ErrorKind::UndefinedSymbol, statement);
                unresolved
            }
        }
    }

    fn finish(self) -> Translation {
        if !self.seen_end {
            self.log.record(ErrorKind::MissingEnd, NO_STATEMENT);
        }
        if !self.seen_halt {
            self.log.record(ErrorKind::MissingHalt, NO_STATEMENT);
        }
        if self.translation.below_entry_point {
            warn!("instructions before location {ENTRY_POINT} will not be executed");
        }
        info!(
            lines = self.translation.lines.len(),
            errors = self.log.count(),
            "pass II complete"
        );
        self.translation
    }
}
