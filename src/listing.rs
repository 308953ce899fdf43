//! Plain-text listings.
//!
//! Each view wraps borrowed assembly data and renders through `Display`, so
//! callers can print straight to a stream or collect into a `String`.

use crate::assembler::Translation;
use crate::diagnostics::ErrorLog;
use crate::isa::ENTRY_POINT;
use crate::symbols::SymbolTable;
use std::fmt;

const NUMBER_WIDTH: usize = 11;
const SYMBOL_WIDTH: usize = 17;
const CONTENTS_WIDTH: usize = 14;
const STATEMENT_COLUMN: usize = NUMBER_WIDTH + CONTENTS_WIDTH;

/// Numbered symbol table in first-seen order; poisoned entries show `???`.
pub struct SymbolListing<'a>(pub &'a SymbolTable);

impl fmt::Display for SymbolListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SYMBOL TABLE:")?;
        writeln!(f)?;
        writeln!(f, "SYMBOL#    SYMBOL           LOCATION")?;
        for (number, (name, value)) in self.0.iter().enumerate() {
            writeln!(
                f,
                "{number:<NUMBER_WIDTH$}{name:<SYMBOL_WIDTH$} {value}"
            )?;
        }
        Ok(())
    }
}

/// LOCATION / CONTENTS / ORIGINAL STATEMENT columns for every source line.
pub struct TranslationListing<'a>(pub &'a Translation);

impl fmt::Display for TranslationListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TRANSLATION OF PROGRAM:")?;
        writeln!(f)?;
        writeln!(f, "LOCATION   CONTENTS      ORIGINAL STATEMENT")?;
        for line in &self.0.lines {
            match line.shown_location() {
                Some(location) => {
                    let contents = line.content.to_string();
                    writeln!(
                        f,
                        "{:<NUMBER_WIDTH$}{contents:<CONTENTS_WIDTH$}{}",
                        location.value(),
                        line.statement
                    )?;
                }
                // Blank lines are dropped; other comments keep the column.
                None if line.statement.trim().is_empty() => {}
                None => writeln!(f, "{:STATEMENT_COLUMN$}{}", "", line.statement)?,
            }
        }
        if self.0.below_entry_point {
            writeln!(f)?;
            writeln!(
                f,
                "<WARNING: Instructions Before Location {ENTRY_POINT} Will Not Be Executed>"
            )?;
        }
        Ok(())
    }
}

/// Every recorded (statement, message) pair.
pub struct ErrorListing<'a>(pub &'a ErrorLog);

impl fmt::Display for ErrorListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LIST OF ERRORS:")?;
        for record in self.0 {
            writeln!(f)?;
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}

/// `NUMBER OF ERRORS: n`
pub struct ErrorCount<'a>(pub &'a ErrorLog);

impl fmt::Display for ErrorCount<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NUMBER OF ERRORS: {}", self.0.count())
    }
}
