//! Diagnostic creation, severity, and accumulation for the place-and-route core.
//!
//! This crate provides structured [`Diagnostic`] messages with severity
//! levels and pass-scoped codes, plus a single-threaded [`DiagnosticSink`]
//! that accumulates them during a pass. There is no source text in this
//! domain to point at, so unlike a compiler frontend's diagnostics there are
//! no spans or labels here — a [`Context`](diagnostic::Context) names the
//! pass and the offending object instead.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Context, Diagnostic};
pub use severity::Severity;
pub use sink::DiagnosticSink;
