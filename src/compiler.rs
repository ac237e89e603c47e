//! The compilation driver
//!
//! Runs lexer → parser → analyzer in order, concatenating diagnostics in
//! stage order, and invokes the code generator only when the combined list
//! is empty. Nothing here throws; the result is always a value.

use crate::backend::JavaCodeGen;
use crate::frontend::lexer::Lexer;
use crate::frontend::parser::Parser;
use crate::frontend::semantic::SemanticAnalyzer;
use crate::frontend::token::Token;
use crate::utils::{Diagnostic, DiagnosticSink};

const FAILURE_HEADER: &str = "Compilation failed due to the following errors:";

/// Everything one compile run produces. Tests and the CLI use the
/// structured fields; `report()` is the single-string result.
#[derive(Debug)]
pub struct CompileOutput {
    /// The generated Java source; present only when there were no diagnostics
    pub java: Option<String>,
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn succeeded(&self) -> bool {
        self.java.is_some()
    }

    /// The Java program, or the failure report listing one diagnostic per
    /// line
    pub fn report(&self) -> String {
        match &self.java {
            Some(java) => java.clone(),
            None => {
                let mut out = String::from(FAILURE_HEADER);
                out.push('\n');
                for diagnostic in &self.diagnostics {
                    out.push_str(&diagnostic.to_string());
                    out.push('\n');
                }
                out
            }
        }
    }
}

/// Run the full pipeline on one L source string
pub fn compile_source(source: &str) -> CompileOutput {
    log::debug!("compiling {} bytes of L source", source.len());

    let (tokens, lex_diags) = Lexer::new().tokenize(source);
    let (program, parse_diags) = Parser::new(tokens.clone()).parse();
    let (symbols, sem_diags) = SemanticAnalyzer::new().analyze(&program);

    let mut diagnostics = lex_diags;
    diagnostics.extend(parse_diags);
    diagnostics.extend(sem_diags);

    let java = if diagnostics.is_empty() {
        Some(JavaCodeGen::new(&symbols).generate(&program))
    } else {
        log::debug!("code generation skipped, {} diagnostics", diagnostics.len());
        None
    };

    CompileOutput {
        java,
        tokens,
        diagnostics,
    }
}

/// The single entry point: one L source string in, one string out
pub fn compile(source: &str) -> String {
    compile_source(source).report()
}

/// Like [`compile_source`], additionally mirroring every diagnostic into
/// the given sink
pub fn compile_with_sink(source: &str, sink: &mut dyn DiagnosticSink) -> CompileOutput {
    let output = compile_source(source);
    for diagnostic in &output.diagnostics {
        sink.report(diagnostic);
    }
    output
}
