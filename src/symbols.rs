use crate::isa::Address;
use indexmap::IndexMap;
use std::fmt;

/// What a label resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolValue {
    Location(Address),
    /// Defined more than once; never reverts.
    MultiplyDefined,
}

impl fmt::Display for SymbolValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolValue::Location(loc) => write!(f, "{}", loc.value()),
            SymbolValue::MultiplyDefined => f.write_str("???"),
        }
    }
}

/// Label name to location, kept in first-seen order.
///
/// Names are matched verbatim; case folding only applies to reserved words.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    symbols: IndexMap<String, SymbolValue>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `symbol` at `location`. A second definition poisons the entry,
    /// even when the locations agree.
    pub fn define(&mut self, symbol: &str, location: Address) {
        match self.symbols.get_mut(symbol) {
            Some(value) => {
                tracing::debug!(symbol, location = location.value(), "symbol redefined");
                *value = SymbolValue::MultiplyDefined;
            }
            None => {
                tracing::debug!(symbol, location = location.value(), "symbol defined");
                self.symbols
                    .insert(symbol.to_string(), SymbolValue::Location(location));
            }
        }
    }

    pub fn lookup(&self, symbol: &str) -> Option<SymbolValue> {
        self.symbols.get(symbol).copied()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolValue)> {
        self.symbols.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Names of poisoned entries, in first-seen order.
    pub fn multiply_defined(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, value)| *value == SymbolValue::MultiplyDefined)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
