//! The error log shared by the classifier, both passes and the emulator.
//!
//! Every record pairs the offending statement with one [`ErrorKind`].
//! Components only append and query; the driver owns the two reset points.

use crate::error::ErrorKind;
use std::fmt;

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// The offending statement, verbatim.
    pub statement: String,
    pub kind: ErrorKind,
}

impl ErrorRecord {
    #[inline]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n<ERROR: {}>", self.statement, self.kind)
    }
}

/// Ordered record of (statement, message) pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorLog {
    records: Vec<ErrorRecord>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic for `statement`.
    pub fn record(&mut self, kind: ErrorKind, statement: impl Into<String>) {
        let statement = statement.into();
        tracing::debug!(code = kind.code(), %statement, "recorded: {kind}");
        self.records.push(ErrorRecord { statement, kind });
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of recorded (statement, message) pairs.
    #[inline]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Forget every record.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Records in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter()
    }

    /// Take every record out, leaving the log empty.
    pub fn drain(&mut self) -> impl Iterator<Item = ErrorRecord> + '_ {
        self.records.drain(..)
    }

    /// Whether any record carries `kind`.
    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.records.iter().any(|r| r.kind == kind)
    }

    /// Codes of every record, in order. Mostly useful in tests.
    pub fn codes(&self) -> Vec<u8> {
        self.records.iter().map(|r| r.kind.code()).collect()
    }
}

impl<'a> IntoIterator for &'a ErrorLog {
    type Item = &'a ErrorRecord;
    type IntoIter = std::slice::Iter<'a, ErrorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_count() {
        let mut log = ErrorLog::new();
        assert!(log.is_empty());

        log.record(ErrorKind::UndefinedSymbol, "  STORE 1,X");
        assert!(!log.is_empty());
        assert_eq!(log.count(), 1);

        let first = log.iter().next().unwrap();
        assert_eq!(first.statement, "  STORE 1,X");
        assert_eq!(first.message(), "Undefined Symbol");
    }

    #[test]
    fn test_same_record_twice_counts_twice() {
        let mut log = ErrorLog::new();
        log.record(ErrorKind::ExtraOperands, "a b c d e");
        log.record(ErrorKind::ExtraOperands, "a b c d e");
        assert_eq!(log.count(), 2);
        assert_eq!(log.codes(), vec![3, 3]);
    }

    #[test]
    fn test_reset_and_drain() {
        let mut log = ErrorLog::new();
        log.record(ErrorKind::MissingEnd, "*****");
        log.record(ErrorKind::MissingHalt, "*****");
        let drained: Vec<_> = log.drain().map(|r| r.kind).collect();
        assert_eq!(drained, vec![ErrorKind::MissingEnd, ErrorKind::MissingHalt]);
        assert!(log.is_empty());

        log.record(ErrorKind::DuplicateEnd, "END");
        log.reset();
        assert_eq!(log.count(), 0);
    }

    #[test]
    fn test_display() {
        let record = ErrorRecord {
            statement: "REG# 0".into(),
            kind: ErrorKind::AddOverflow,
        };
        assert_eq!(
            record.to_string(),
            "REG# 0\n<ERROR: ADD Instruction Causes Overflow In a Register>"
        );
    }
}
