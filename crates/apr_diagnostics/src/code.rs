//! Diagnostic codes with pass-category prefixes for structured identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The pass a diagnostic originated from, determining its prefix letter.
///
/// Each category maps to a single-character prefix used in diagnostic code
/// display (e.g., `P101` for the partitioner, `R203` for the router).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Chip database diagnostics, prefixed with `D`.
    Database,
    /// FM partitioner diagnostics, prefixed with `P`.
    Partitioner,
    /// QLA placer diagnostics, prefixed with `Q`.
    Placer,
    /// Clock-tree synthesis diagnostics, prefixed with `C`.
    Cts,
    /// Global router diagnostics, prefixed with `R`.
    Router,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Database => 'D',
            Category::Partitioner => 'P',
            Category::Placer => 'Q',
            Category::Cts => 'C',
            Category::Router => 'R',
        }
    }
}

/// A structured diagnostic code combining a pass prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `Q101`, `R203`, `C305`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The pass this diagnostic originated from.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Database.prefix(), 'D');
        assert_eq!(Category::Partitioner.prefix(), 'P');
        assert_eq!(Category::Placer.prefix(), 'Q');
        assert_eq!(Category::Cts.prefix(), 'C');
        assert_eq!(Category::Router.prefix(), 'R');
    }

    #[test]
    fn display_format() {
        let code = DiagnosticCode::new(Category::Placer, 101);
        assert_eq!(format!("{code}"), "Q101");

        let code = DiagnosticCode::new(Category::Router, 3);
        assert_eq!(format!("{code}"), "R003");

        let code = DiagnosticCode::new(Category::Cts, 42);
        assert_eq!(format!("{code}"), "C042");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Partitioner, 101);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
