//! Utility module

mod error;
mod span;

pub use error::{Diagnostic, DiagnosticKind, DiagnosticSink, FileLog};
pub use span::Span;
