//! Lexer for L
//!
//! Scans the source line by line into a token stream. Never fails hard: an
//! unrecognized byte produces a diagnostic and is skipped, an unterminated
//! string abandons the rest of its line.

use crate::frontend::token::{Token, TokenKind, KEYWORDS};
use crate::utils::{Diagnostic, DiagnosticKind, Span};

/// Two-character operators, tried before everything else
const TWO_CHAR_OPERATORS: &[&str] = &["==", "!=", "<=", ">=", "&&", "||"];

/// Single-character operators and delimiters
const SINGLE_OPERATORS: &str = "+-*/%=(){}<>;,.[]";

/// The lexer state
pub struct Lexer {
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl Lexer {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the entire source, returning tokens and lexical diagnostics
    pub fn tokenize(mut self, source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
        for (index, line) in source.split('\n').enumerate() {
            self.scan_line(index as u32 + 1, line);
        }
        (self.tokens, self.diagnostics)
    }

    fn scan_line(&mut self, line: u32, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            let column = i as u32 + 1;

            if ch.is_whitespace() {
                i += 1;
                continue;
            }

            // Two-character operators first
            if i + 1 < chars.len() {
                let pair: String = [chars[i], chars[i + 1]].iter().collect();
                if TWO_CHAR_OPERATORS.contains(&pair.as_str()) {
                    self.push(TokenKind::Operator, pair, line, column);
                    i += 2;
                    continue;
                }
            }

            // Identifier or keyword
            if ch.is_ascii_alphabetic() || ch == '_' {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let kind = if KEYWORDS.contains(&word.as_str()) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                self.push(kind, word, line, column);
                continue;
            }

            // Number: [0-9]+(\.[0-9]+)?
            if ch.is_ascii_digit() {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let number: String = chars[start..i].iter().collect();
                self.push(TokenKind::Number, number, line, column);
                continue;
            }

            // String literal, quotes included in the lexeme
            if ch == '"' {
                match chars[i + 1..].iter().position(|&c| c == '"') {
                    Some(offset) => {
                        let end = i + 1 + offset;
                        let literal: String = chars[i..=end].iter().collect();
                        self.push(TokenKind::String, literal, line, column);
                        i = end + 1;
                        continue;
                    }
                    None => {
                        self.diagnostics.push(Diagnostic::new(
                            Span::new(line, column),
                            DiagnosticKind::UnterminatedString,
                        ));
                        // Abandon the rest of this line
                        return;
                    }
                }
            }

            if SINGLE_OPERATORS.contains(ch) {
                self.push(TokenKind::Operator, ch.to_string(), line, column);
                i += 1;
                continue;
            }

            self.diagnostics.push(Diagnostic::new(
                Span::new(line, column),
                DiagnosticKind::UnexpectedCharacter(ch),
            ));
            i += 1;
        }
    }

    fn push(&mut self, kind: TokenKind, lexeme: String, line: u32, column: u32) {
        self.tokens
            .push(Token::new(kind, lexeme, Span::new(line, column)));
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
        Lexer::new().tokenize(source)
    }

    #[test]
    fn test_simple_assignment() {
        let (tokens, diags) = lex("x = 42;");
        assert!(diags.is_empty());
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["x", "=", "42", ";"]);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[2].kind, TokenKind::Number);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let (tokens, _) = lex("if else for return call Double String ifx");
        for token in &tokens[..7] {
            assert_eq!(token.kind, TokenKind::Keyword, "{}", token.lexeme);
        }
        assert_eq!(tokens[7].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_two_char_operators_win() {
        let (tokens, diags) = lex("a <= b && c == d || e != f >= g");
        assert!(diags.is_empty());
        let ops: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(ops, vec!["<=", "&&", "==", "||", "!=", ">="]);
    }

    #[test]
    fn test_decimal_numbers() {
        let (tokens, _) = lex("pi = 3.14; n = 7; dot = 5.;");
        let numbers: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.lexeme.as_str())
            .collect();
        // `5.` is a number followed by a bare dot
        assert_eq!(numbers, vec!["3.14", "7", "5"]);
        assert!(tokens.iter().any(|t| t.is_operator(".")));
    }

    #[test]
    fn test_string_keeps_quotes() {
        let (tokens, diags) = lex("msg = \"hello world\";");
        assert!(diags.is_empty());
        let string = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(string.lexeme, "\"hello world\"");
        assert_eq!(string.span.column, 7);
    }

    #[test]
    fn test_unterminated_string_abandons_line() {
        let (tokens, diags) = lex("msg = \"hello;\nnext = 1;");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnterminatedString);
        assert_eq!(diags[0].span, Span::new(1, 7));
        // Nothing after the open quote on line 1; line 2 still scans
        assert!(tokens.iter().any(|t| t.lexeme == "next" && t.span.line == 2));
        assert!(!tokens.iter().any(|t| t.kind == TokenKind::String));
    }

    #[test]
    fn test_unexpected_character() {
        let (tokens, diags) = lex("x = 1 @ 2;");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnexpectedCharacter('@'));
        assert_eq!(diags[0].span, Span::new(1, 7));
        // The scan continues past the bad byte
        assert!(tokens.iter().any(|t| t.lexeme == "2"));
    }

    #[test]
    fn test_positions_are_one_based_per_line() {
        let (tokens, _) = lex("a = 1;\n  b = 2;");
        let b = tokens.iter().find(|t| t.lexeme == "b").unwrap();
        assert_eq!(b.span, Span::new(2, 3));
    }

    #[test]
    fn test_token_coverage_reconstructs_line() {
        let source = "total = count + 2.5;";
        let (tokens, diags) = lex(source);
        assert!(diags.is_empty());
        // Every lexeme sits at its recorded column in the original line
        let chars: Vec<char> = source.chars().collect();
        let mut rebuilt: Vec<char> = vec![' '; chars.len()];
        for token in &tokens {
            let start = token.span.column as usize - 1;
            for (offset, ch) in token.lexeme.chars().enumerate() {
                rebuilt[start + offset] = ch;
            }
        }
        assert_eq!(rebuilt.into_iter().collect::<String>(), source);
    }
}
