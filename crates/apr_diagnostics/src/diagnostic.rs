//! Structured diagnostic messages with severity, codes, and pass context.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// Where a diagnostic came from: which object (if any) it concerns.
///
/// There is no source text in this domain to point at, so a diagnostic names
/// the object it concerns by its entity name instead of a source span.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// The name of the offending object (instance, net, cell), if any.
    pub object: Option<String>,
}

impl Context {
    /// A diagnostic with no particular object attached.
    pub fn none() -> Self {
        Self { object: None }
    }

    /// A diagnostic naming a specific object.
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            object: Some(name.into()),
        }
    }
}

/// A structured diagnostic message with a severity, a code, and pass context.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The unique error code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The object (if any) this diagnostic concerns.
    pub context: Context,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given code and message.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, context: Context) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            context,
        }
    }

    /// Creates a new warning diagnostic with the given code and message.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, context: Context) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            context,
        }
    }

    /// Creates a new informational note.
    pub fn note(code: DiagnosticCode, message: impl Into<String>, context: Context) -> Self {
        Self {
            severity: Severity::Note,
            code,
            message: message.into(),
            context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Router, 101);
        let diag = Diagnostic::error(code, "queue exhausted", Context::object("net_clk"));
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "queue exhausted");
        assert_eq!(diag.context.object.as_deref(), Some("net_clk"));
        assert_eq!(format!("{}", diag.code), "R101");
    }

    #[test]
    fn create_warning_without_object() {
        let code = DiagnosticCode::new(Category::Placer, 201);
        let diag = Diagnostic::warning(code, "CG did not converge", Context::none());
        assert_eq!(diag.severity, Severity::Warning);
        assert!(diag.context.object.is_none());
    }

    #[test]
    fn create_note() {
        let code = DiagnosticCode::new(Category::Cts, 1);
        let diag = Diagnostic::note(code, "inserted 3 buffers", Context::none());
        assert_eq!(diag.severity, Severity::Note);
    }
}
