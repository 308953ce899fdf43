//! Quack3200: a two-pass assembler and the decimal accumulator machine that
//! runs its output.
//!
//! ```
//! use quack3200::{BufferedPort, Outcome, RunOptions, assemble, execute};
//!
//! let source = "\
//!          ORG 100
//!          READ X
//!          LOAD 1,X
//!          ADD 1,X
//!          STORE 1,Y
//!          WRITE Y
//!          HALT
//! X        DS 1
//! Y        DS 1
//!          END";
//!
//! let assembly = assemble(source).unwrap();
//! assert!(assembly.is_ok());
//!
//! let mut port = BufferedPort::new(["21"]);
//! let execution = execute(&assembly, &mut port, &RunOptions::default())
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(execution.outcome, Outcome::Halted);
//! assert_eq!(port.outputs(), &[42]);
//! ```

pub mod assembler;
pub mod codegen;
pub mod diagnostics;
pub mod emulator;
pub mod error;
pub mod isa;
pub mod listing;
pub mod parser;
pub mod source;
pub mod symbols;

pub use assembler::{ListingLine, Translation};
pub use diagnostics::{ErrorLog, ErrorRecord};
pub use emulator::{BufferedPort, Console, Emulator, IoPort, Memory, Outcome, RunOptions};
pub use error::{ErrorKind, QuackError, Result};
pub use source::{FileSource, LineSource, MemorySource};
pub use symbols::{SymbolTable, SymbolValue};

use std::path::Path;

/// Everything both passes produced for one source.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub symbols: SymbolTable,
    pub translation: Translation,
    /// Error 9 records first, then Pass II findings in line order.
    pub errors: ErrorLog,
}

impl Assembly {
    /// No assembly error was recorded, so the program may run.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Assemble source held in memory.
pub fn assemble(source: &str) -> Result<Assembly> {
    assemble_source(&mut MemorySource::new(source))
}

/// Assemble a source file, reading it once per pass.
pub fn assemble_file(path: &Path) -> Result<Assembly> {
    tracing::info!(path = %path.display(), "assembling");
    assemble_source(&mut FileSource::open(path)?)
}

/// Run both passes over any line provider.
pub fn assemble_source<S: LineSource>(source: &mut S) -> Result<Assembly> {
    let mut errors = ErrorLog::new();
    let symbols = assembler::pass_one(source, &mut errors)?;
    assembler::report_multiply_defined_labels(&symbols, &mut errors);
    let translation = assembler::pass_two(source, &symbols, &mut errors)?;

    Ok(Assembly {
        symbols,
        translation,
        errors,
    })
}

/// A finished run.
#[derive(Debug, Clone)]
pub struct Execution {
    pub outcome: Outcome,
    /// Runtime diagnostics; at most one, since execution stops on the first.
    pub errors: ErrorLog,
    pub emulator: Emulator,
}

/// Run an assembled program from location 100.
///
/// Returns `Ok(None)` without executing anything when the assembly recorded
/// errors.
pub fn execute<P: IoPort>(
    assembly: &Assembly,
    port: &mut P,
    options: &RunOptions,
) -> Result<Option<Execution>> {
    if !assembly.is_ok() {
        tracing::warn!(
            errors = assembly.errors.count(),
            "not executing a program with assembly errors"
        );
        return Ok(None);
    }

    let mut emulator = Emulator::new(assembly.translation.memory.clone());
    let mut errors = ErrorLog::new();
    let outcome = emulator.run(port, &mut errors, options)?;
    Ok(Some(Execution {
        outcome,
        errors,
        emulator,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_and_execute() {
        let source = "\
; multiply two constants
         ORG 100
         LOAD 2,A
         MULT 2,B
         STORE 2,C
         WRITE C
         HALT
A        DC 6
B        DC -7
C        DS 1
         END";

        let assembly = assemble(source).unwrap();
        assert!(assembly.is_ok(), "{:?}", assembly.errors.codes());
        assert_eq!(assembly.symbols.len(), 3);

        let mut port = BufferedPort::default();
        let execution = execute(&assembly, &mut port, &RunOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(execution.outcome, Outcome::Halted);
        assert!(execution.errors.is_empty());
        assert_eq!(port.outputs(), &[-42]);
    }

    #[test]
    fn test_errors_prevent_execution() {
        let assembly = assemble("  ORG 100\n  LOAD A X\n  HALT\nX DC 1\n  END").unwrap();
        assert!(!assembly.is_ok());
        assert_eq!(assembly.errors.codes(), vec![21]);

        let mut port = BufferedPort::default();
        let execution = execute(&assembly, &mut port, &RunOptions::default()).unwrap();
        assert!(execution.is_none());
    }

    #[test]
    fn test_pass_one_errors_are_not_kept() {
        // Classified in both passes, reported once.
        let assembly = assemble("  ORG 100\n  what is this\n  HALT\n  END").unwrap();
        assert_eq!(assembly.errors.codes(), vec![22]);
    }
}
