//! Diagnostics for the L compiler
//!
//! Every stage collects `Diagnostic` values instead of failing; nothing in
//! the pipeline panics or returns early on bad input. The driver gates code
//! generation on the combined list being empty.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Type;
use crate::utils::Span;

/// A user-visible error record with source position and message
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub span: Span,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(span: Span, kind: DiagnosticKind) -> Self {
        Self { span, kind }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error at line {}, column {}: {}",
            self.span.line, self.span.column, self.kind
        )
    }
}

/// What went wrong
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    // ==================== Lexical ====================
    #[error("Unterminated string literal")]
    UnterminatedString,

    #[error("Unexpected character: {0}")]
    UnexpectedCharacter(char),

    // ==================== Syntactic ====================
    #[error("Expected {expected} but found '{found}'")]
    ExpectedToken { expected: String, found: String },

    #[error("Expected declaration, assignment, function definition, or 'call', found '{found}'")]
    ExpectedProgramElement { found: String },

    #[error("Expected 'call', 'return', 'if', 'for', declaration, or assignment, found '{found}'")]
    ExpectedStatement { found: String },

    #[error("Expected '=' after identifier '{name}' in assignment")]
    ExpectedAssignOperator { name: String },

    #[error("Expected ';' after assignment")]
    ExpectedSemicolon,

    #[error("Expected identifier after 'call'")]
    ExpectedCallTarget,

    #[error("Invalid expression factor '{found}'")]
    InvalidFactor { found: String },

    // ==================== Semantic ====================
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("Undefined function '{name}'")]
    UndefinedFunction { name: String },

    #[error("Incorrect number of arguments for function '{function}'. Expected {expected}, got {got}")]
    ArgumentCount {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("Type mismatch in argument {index} of function '{function}'. Expected {expected}, got {got}")]
    ArgumentType {
        index: usize,
        function: String,
        expected: Type,
        got: Type,
    },

    #[error("Argument {index} of 'print' must be String or Double, got {got}")]
    PrintArgument { index: usize, got: Type },

    #[error("Condition of '{construct}' must be Boolean, got {got}")]
    ConditionType { construct: &'static str, got: Type },

    #[error("Operator '{op}' cannot be applied to {left} and {right}")]
    OperandType {
        op: &'static str,
        left: Type,
        right: Type,
    },
}

/// Where diagnostics go.
///
/// The pipeline itself collects into a `Vec`; the CLI can mirror every
/// diagnostic into an append-only log file on top of that.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.push(diagnostic.clone());
    }
}

/// Appends each diagnostic as one line to a log file (`errors.txt` style)
pub struct FileLog {
    path: PathBuf,
}

impl FileLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DiagnosticSink for FileLog {
    fn report(&mut self, diagnostic: &Diagnostic) {
        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{}", diagnostic));
        if let Err(err) = appended {
            log::warn!("could not append to {}: {}", self.path.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_format() {
        let diag = Diagnostic::new(Span::new(3, 14), DiagnosticKind::UnterminatedString);
        assert_eq!(
            diag.to_string(),
            "Error at line 3, column 14: Unterminated string literal"
        );
    }

    #[test]
    fn test_argument_type_message() {
        let diag = Diagnostic::new(
            Span::new(2, 6),
            DiagnosticKind::ArgumentType {
                index: 1,
                function: "f".to_string(),
                expected: Type::Double,
                got: Type::String,
            },
        );
        assert_eq!(
            diag.to_string(),
            "Error at line 2, column 6: Type mismatch in argument 1 of function 'f'. Expected Double, got String"
        );
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        let diag = Diagnostic::new(Span::new(1, 1), DiagnosticKind::UnexpectedCharacter('@'));
        sink.report(&diag);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0], diag);
    }
}
