//! Statement classifier for Quack3200 assembly.
//!
//! Turns one raw source line into a [`ParsedLine`] and records every field
//! violation in the [`ErrorLog`]. Classification never fails: a line whose
//! shape cannot be recognized is reported and treated as a comment.
//!
//! Accepted shapes, by word count after comment removal:
//!
//! | words | shape |
//! |---|---|
//! | 4 | `LABEL OPCODE REGISTER OPERAND` |
//! | 3 | `OPCODE REGISTER OPERAND`, `LABEL READ/WRITE/B OPERAND`, `LABEL HALT REGISTER`, `LABEL DS/DC/ORG OPERAND` |
//! | 2 | `READ/WRITE/B OPERAND`, `HALT REGISTER`, `ORG OPERAND` |
//! | 1 | `HALT`, `END` |

use crate::diagnostics::ErrorLog;
use crate::error::ErrorKind;
use crate::isa::{DEFAULT_REGISTER, Directive, Opcode, Register};

/// Most words a statement may contain.
const MAX_WORDS: usize = 4;

/// Longest symbol, in characters.
const MAX_SYMBOL_LEN: usize = 10;

/// Longest ORG/DS literal, in characters.
const MAX_LOCATION_LITERAL: usize = 5;

/// Longest DC literal, in characters, without and with a leading `-`.
const MAX_CONSTANT_LITERAL: usize = 8;
const MAX_NEGATIVE_CONSTANT_LITERAL: usize = 9;

/// ORG value assumed when the written one is unusable.
const FALLBACK_ORIGIN: i64 = 100;

/// DS size assumed when the written one is unusable.
const FALLBACK_STORAGE: i64 = 1;

/// The four mutually exclusive statement classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    MachineLanguage,
    AssemblerDirective,
    Comment,
    End,
}

/// An operand as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Symbolic(String),
    Numeric(i64),
}

/// Classified content of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `operand` is `None` for HALT and when the written operand was rejected.
    Machine {
        opcode: Opcode,
        register: Register,
        operand: Option<String>,
    },
    /// `value` is the validated literal, or a fallback after an error.
    Directive { directive: Directive, value: i64 },
    Comment,
    End,
}

/// Result of classifying one source line. Rebuilt for every line in every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub label: Option<String>,
    pub statement: Statement,
}

impl ParsedLine {
    fn comment() -> Self {
        Self {
            label: None,
            statement: Statement::Comment,
        }
    }

    fn unlabeled(statement: Statement) -> Self {
        Self {
            label: None,
            statement,
        }
    }

    fn labeled(label: &str, statement: Statement) -> Self {
        Self {
            label: Some(label.to_string()),
            statement,
        }
    }

    pub fn kind(&self) -> StatementKind {
        match self.statement {
            Statement::Machine { .. } => StatementKind::MachineLanguage,
            Statement::Directive { .. } => StatementKind::AssemblerDirective,
            Statement::Comment => StatementKind::Comment,
            Statement::End => StatementKind::End,
        }
    }

    /// The label, only for statements that can define one.
    pub fn definable_label(&self) -> Option<&str> {
        match self.kind() {
            StatementKind::MachineLanguage | StatementKind::AssemblerDirective => {
                self.label.as_deref()
            }
            StatementKind::Comment | StatementKind::End => None,
        }
    }

    pub fn opcode(&self) -> Option<Opcode> {
        match self.statement {
            Statement::Machine { opcode, .. } => Some(opcode),
            _ => None,
        }
    }

    pub fn directive(&self) -> Option<Directive> {
        match self.statement {
            Statement::Directive { directive, .. } => Some(directive),
            _ => None,
        }
    }

    /// Register field; 9 when the statement does not name one.
    pub fn register(&self) -> Register {
        match self.statement {
            Statement::Machine { register, .. } => register,
            _ => DEFAULT_REGISTER,
        }
    }

    pub fn operand(&self) -> Option<Operand> {
        match &self.statement {
            Statement::Machine { operand, .. } => operand.clone().map(Operand::Symbolic),
            Statement::Directive { value, .. } => Some(Operand::Numeric(*value)),
            Statement::Comment | Statement::End => None,
        }
    }

    pub fn operand_value(&self) -> Option<i64> {
        match self.statement {
            Statement::Directive { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Classify one source line, recording every violation in `log`.
pub fn classify(line: &str, log: &mut ErrorLog) -> ParsedLine {
    let parsed = Classifier { line, log }.classify();
    tracing::debug!(line, kind = ?parsed.kind(), "classified");
    parsed
}

/// Everything before the first `;`.
pub fn strip_comment(line: &str) -> &str {
    line.split(';').next().unwrap_or("")
}

/// Number of whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Optional leading `-` followed by one or more decimal digits.
pub fn is_integer(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// 1-10 characters, alphabetic first, alphanumeric rest.
pub fn is_valid_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    symbol.chars().count() <= MAX_SYMBOL_LEN
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric())
}

/// A comma may only separate a lone register digit from the operand.
///
/// At most one comma; left of it (ignoring spaces) a single digit preceded
/// by whitespace, right of it an operand.
pub fn comma_placement_is_valid(code: &str) -> bool {
    let Some((before, after)) = code.split_once(',') else {
        return true;
    };
    if after.contains(',') {
        return false;
    }

    let mut tail = before.trim_end().chars().rev();
    let digit = tail.next().is_some_and(|c| c.is_ascii_digit());
    let separated = tail.next().is_some_and(char::is_whitespace);

    digit && separated && !after.trim().is_empty()
}

struct Classifier<'a> {
    line: &'a str,
    log: &'a mut ErrorLog,
}

impl Classifier<'_> {
    fn error(&mut self, kind: ErrorKind) {
        self.log.record(kind, self.line);
    }

    fn classify(mut self) -> ParsedLine {
        let code = strip_comment(self.line);

        if !comma_placement_is_valid(code) {
            self.error(ErrorKind::MisplacedComma);
        }

        let code = code.replace(',', " ");
        let original: Vec<&str> = code.split_whitespace().collect();
        if original.is_empty() {
            return ParsedLine::comment();
        }
        if original.len() > MAX_WORDS {
            self.error(ErrorKind::ExtraOperands);
            return ParsedLine::comment();
        }

        let upper: Vec<String> = original.iter().map(|w| w.to_ascii_uppercase()).collect();

        match original.len() {
            4 => self.four_words(&original, &upper),
            3 => self.three_words(&original, &upper),
            2 => self.two_words(&original, &upper),
            _ => self.one_word(&upper[0]),
        }
    }

    /// `LABEL OPCODE REGISTER OPERAND`
    fn four_words(&mut self, original: &[&str], upper: &[String]) -> ParsedLine {
        self.validate_label(original[0]);

        match Opcode::from_mnemonic(&upper[1]) {
            Some(opcode) => {
                let statement = self.machine(opcode, &upper[2], original[3]);
                ParsedLine::labeled(original[0], statement)
            }
            None => self.invalid(),
        }
    }

    fn three_words(&mut self, original: &[&str], upper: &[String]) -> ParsedLine {
        if let Some(opcode) = Opcode::from_mnemonic(&upper[0]) {
            return ParsedLine::unlabeled(self.machine(opcode, &upper[1], original[2]));
        }

        if let Some(statement) = self.short_machine(&upper[1], original[2]) {
            self.validate_label(original[0]);
            return ParsedLine::labeled(original[0], statement);
        }

        if let Some(directive) = Directive::from_mnemonic(&upper[1]) {
            self.validate_label(original[0]);
            let statement = self.directive(directive, original[2]);
            return ParsedLine::labeled(original[0], statement);
        }

        self.invalid()
    }

    fn two_words(&mut self, original: &[&str], upper: &[String]) -> ParsedLine {
        if let Some(statement) = self.short_machine(&upper[0], original[1]) {
            return ParsedLine::unlabeled(statement);
        }

        if upper[0] == Directive::Org.mnemonic() {
            if self.integer(original[1]) {
                let statement = self.directive_operand(Directive::Org, original[1], true);
                return ParsedLine::unlabeled(statement);
            }
            self.error(ErrorKind::OperandMustBeNumeric);
        }

        if upper[1] == "END" {
            self.error(ErrorKind::LabeledEnd);
            return ParsedLine::labeled(original[0], Statement::End);
        }

        self.invalid()
    }

    fn one_word(&mut self, word: &str) -> ParsedLine {
        match word {
            "HALT" => ParsedLine::unlabeled(Statement::Machine {
                opcode: Opcode::Halt,
                register: DEFAULT_REGISTER,
                operand: None,
            }),
            "END" => ParsedLine::unlabeled(Statement::End),
            _ => self.invalid(),
        }
    }

    fn invalid(&mut self) -> ParsedLine {
        self.error(ErrorKind::InvalidStatement);
        ParsedLine::comment()
    }

    fn validate_label(&mut self, label: &str) {
        if !is_valid_symbol(label) {
            self.error(ErrorKind::InvalidSymbol);
        }
    }

    /// `OPCODE REGISTER OPERAND`
    fn machine(&mut self, opcode: Opcode, register: &str, operand: &str) -> Statement {
        let register = self.register(register);
        let operand = self.symbolic_operand(operand);
        Statement::Machine {
            opcode,
            register,
            operand,
        }
    }

    /// `READ/WRITE/B OPERAND` or `HALT REGISTER`; `None` for any other opcode.
    fn short_machine(&mut self, word: &str, operand: &str) -> Option<Statement> {
        let opcode = Opcode::from_mnemonic(word)?;

        if opcode.has_short_form() {
            let operand = self.symbolic_operand(operand);
            return Some(Statement::Machine {
                opcode,
                register: DEFAULT_REGISTER,
                operand,
            });
        }

        if opcode == Opcode::Halt {
            let register = self.register(operand);
            return Some(Statement::Machine {
                opcode,
                register,
                operand: None,
            });
        }

        None
    }

    /// Integer test used for every token; `-0...` is flagged wherever it appears.
    fn integer(&mut self, token: &str) -> bool {
        if token.starts_with("-0") {
            self.error(ErrorKind::NegativeZero);
        }
        is_integer(token)
    }

    fn register(&mut self, token: &str) -> Register {
        self.integer(token);
        Register::parse(token).unwrap_or_else(|| {
            self.error(ErrorKind::InvalidRegister);
            DEFAULT_REGISTER
        })
    }

    fn symbolic_operand(&mut self, token: &str) -> Option<String> {
        if self.integer(token) {
            self.error(ErrorKind::OperandMustBeSymbolic);
            None
        } else {
            Some(token.to_string())
        }
    }

    fn directive(&mut self, directive: Directive, token: &str) -> Statement {
        let numeric = self.integer(token);
        self.directive_operand(directive, token, numeric)
    }

    fn directive_operand(&mut self, directive: Directive, token: &str, numeric: bool) -> Statement {
        let value = if numeric {
            match directive {
                Directive::Org => self.origin_value(token),
                Directive::Ds => self.storage_value(token),
                Directive::Dc => self.constant_value(token),
            }
        } else {
            self.error(ErrorKind::OperandMustBeNumeric);
            match directive {
                Directive::Org => FALLBACK_ORIGIN,
                Directive::Ds => FALLBACK_STORAGE,
                Directive::Dc => 0,
            }
        };
        Statement::Directive { directive, value }
    }

    fn origin_value(&mut self, token: &str) -> i64 {
        if token.len() > MAX_LOCATION_LITERAL {
            self.error(ErrorKind::OperandExceedsFinalLocation);
            return FALLBACK_ORIGIN;
        }
        match literal(token) {
            value if value > 0 => value,
            _ => {
                self.error(ErrorKind::OperandMustBePositive);
                FALLBACK_ORIGIN
            }
        }
    }

    fn storage_value(&mut self, token: &str) -> i64 {
        if token.len() > MAX_LOCATION_LITERAL {
            self.error(ErrorKind::OperandTooLarge);
            return FALLBACK_STORAGE;
        }
        match literal(token) {
            value if value > 0 => value,
            _ => {
                self.error(ErrorKind::OperandMustBePositive);
                FALLBACK_STORAGE
            }
        }
    }

    fn constant_value(&mut self, token: &str) -> i64 {
        let max_len = if token.starts_with('-') {
            MAX_NEGATIVE_CONSTANT_LITERAL
        } else {
            MAX_CONSTANT_LITERAL
        };
        if token.len() > max_len {
            self.error(ErrorKind::ConstantTooLarge);
            return 0;
        }
        literal(token)
    }
}

/// Value of a token already checked with [`is_integer`] and bounded in length.
fn literal(token: &str) -> i64 {
    token.parse().unwrap_or_default()
}
