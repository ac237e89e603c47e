//! Parser for L
//!
//! Recursive descent with single-token lookahead (plus a one-token peek to
//! tell function definitions from assignments). The parser never fails hard:
//! it records a diagnostic, resynchronizes (to the next `;` at the top
//! level, one token inside blocks), and returns a partial tree.

use crate::frontend::ast::*;
use crate::frontend::token::{Token, TokenKind};
use crate::types::Type;
use crate::utils::{Diagnostic, DiagnosticKind, Span};

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Parse a complete program, returning the (possibly partial) tree and
    /// all syntactic diagnostics
    pub fn parse(mut self) -> (Program, Vec<Diagnostic>) {
        let mut items = Vec::new();
        while !self.at_end() {
            match self.parse_program_element() {
                Some(item) => items.push(item),
                None => self.synchronize_top_level(),
            }
        }
        (Program { items }, self.diagnostics)
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check_operator(&self, op: &str) -> bool {
        self.current().is_some_and(|t| t.is_operator(op))
    }

    fn consume_operator(&mut self, op: &str) -> bool {
        if self.check_operator(op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_operator(&mut self, op: &str) -> bool {
        if self.consume_operator(op) {
            true
        } else {
            let kind = DiagnosticKind::ExpectedToken {
                expected: format!("'{}'", op),
                found: self.found(),
            };
            self.diagnose(self.current_span(), kind);
            false
        }
    }

    fn expect_identifier(&mut self) -> Option<Token> {
        match self.current() {
            Some(token) if token.kind == TokenKind::Identifier => self.advance(),
            _ => {
                let kind = DiagnosticKind::ExpectedToken {
                    expected: "identifier".to_string(),
                    found: self.found(),
                };
                self.diagnose(self.current_span(), kind);
                None
            }
        }
    }

    fn diagnose(&mut self, span: Span, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic::new(span, kind));
    }

    /// Span of the current token, falling back to the last one at EOF
    fn current_span(&self) -> Span {
        self.current()
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or_default()
    }

    fn found(&self) -> String {
        self.current()
            .map(|t| t.lexeme.clone())
            .unwrap_or_else(|| "end of input".to_string())
    }

    /// Top-level recovery: skip past the next `;`
    fn synchronize_top_level(&mut self) {
        while let Some(token) = self.current() {
            let done = token.is_operator(";");
            self.pos += 1;
            if done {
                break;
            }
        }
    }

    /// Statement-final recovery: drop tokens up to and including the next
    /// `;`, but never across a closing brace
    fn recover_to_semicolon(&mut self) {
        while let Some(token) = self.current() {
            if token.is_operator("}") {
                break;
            }
            let done = token.is_operator(";");
            self.pos += 1;
            if done {
                break;
            }
        }
    }

    // ==================== Program Structure ====================

    fn parse_program_element(&mut self) -> Option<Item> {
        let token = self.current()?.clone();
        match token.kind {
            TokenKind::Identifier => {
                // IDENT followed by '(' opens a function definition
                if self.peek(1).is_some_and(|t| t.is_operator("(")) {
                    self.parse_function().map(Item::Function)
                } else {
                    self.parse_assignment().map(|a| Item::Stmt(Stmt::Assignment(a)))
                }
            }
            TokenKind::Keyword => match token.lexeme.as_str() {
                "call" => self.parse_call_stmt().map(Item::Stmt),
                "return" => self.parse_return_stmt().map(Item::Stmt),
                "if" => self.parse_if_stmt().map(Item::Stmt),
                "for" => self.parse_for_stmt().map(Item::Stmt),
                "Double" | "String" => self.parse_var_decl().map(Item::Stmt),
                _ => {
                    self.diagnose(
                        token.span,
                        DiagnosticKind::ExpectedProgramElement {
                            found: token.lexeme,
                        },
                    );
                    None
                }
            },
            _ => {
                self.diagnose(
                    token.span,
                    DiagnosticKind::ExpectedProgramElement {
                        found: token.lexeme,
                    },
                );
                None
            }
        }
    }

    fn parse_function(&mut self) -> Option<Function> {
        let name = self.advance()?;
        self.expect_operator("(");
        let params = self.parse_param_list();
        self.expect_operator(")");
        self.expect_operator("{");
        let body = self.parse_block();
        self.expect_operator("}");
        Some(Function {
            name: name.lexeme,
            params,
            body,
            span: name.span,
        })
    }

    fn parse_param_list(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if self.check_operator(")") {
            return params;
        }
        loop {
            match self.expect_identifier() {
                Some(token) => params.push(Param {
                    name: token.lexeme,
                    span: token.span,
                }),
                None => break,
            }
            if !self.consume_operator(",") {
                break;
            }
        }
        params
    }

    fn parse_block(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while let Some(token) = self.current() {
            if token.is_operator("}") {
                break;
            }
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                // Inside blocks, skip a single token and try again
                None => {
                    self.pos += 1;
                }
            }
        }
        stmts
    }

    // ==================== Statements ====================

    fn parse_statement(&mut self) -> Option<Stmt> {
        let token = self.current()?.clone();
        match token.kind {
            TokenKind::Keyword => match token.lexeme.as_str() {
                "call" => self.parse_call_stmt(),
                "return" => self.parse_return_stmt(),
                "if" => self.parse_if_stmt(),
                "for" => self.parse_for_stmt(),
                "Double" | "String" => self.parse_var_decl(),
                _ => {
                    self.diagnose(
                        token.span,
                        DiagnosticKind::ExpectedStatement {
                            found: token.lexeme,
                        },
                    );
                    None
                }
            },
            TokenKind::Identifier => self.parse_assignment().map(Stmt::Assignment),
            _ => {
                self.diagnose(
                    token.span,
                    DiagnosticKind::ExpectedStatement {
                        found: token.lexeme,
                    },
                );
                None
            }
        }
    }

    fn parse_var_decl(&mut self) -> Option<Stmt> {
        let keyword = self.advance()?;
        let declared = Type::from_keyword(&keyword.lexeme)?;
        let name = self.expect_identifier()?;
        if !self.expect_operator(";") {
            self.recover_to_semicolon();
        }
        Some(Stmt::VarDecl {
            name: name.lexeme,
            declared,
            span: keyword.span,
        })
    }

    fn parse_assignment(&mut self) -> Option<Assign> {
        let assign = self.parse_bare_assignment()?;
        if !self.consume_operator(";") {
            self.diagnose(self.current_span(), DiagnosticKind::ExpectedSemicolon);
            self.recover_to_semicolon();
        }
        Some(assign)
    }

    /// `IDENT "=" expression`, without the trailing `;` — shared between
    /// assignment statements and `for` headers
    fn parse_bare_assignment(&mut self) -> Option<Assign> {
        let target = self.expect_identifier()?;
        if !self.consume_operator("=") {
            self.diagnose(
                target.span,
                DiagnosticKind::ExpectedAssignOperator {
                    name: target.lexeme,
                },
            );
            return None;
        }
        let value = self.parse_expression()?;
        Some(Assign {
            target: target.lexeme,
            value,
            span: target.span,
        })
    }

    fn parse_call_stmt(&mut self) -> Option<Stmt> {
        let call = self.advance()?;
        let callee = match self.current() {
            Some(token) if token.kind == TokenKind::Identifier => self.advance()?,
            _ => {
                self.diagnose(call.span, DiagnosticKind::ExpectedCallTarget);
                return None;
            }
        };
        self.expect_operator("(");
        let args = self.parse_arg_list();
        self.expect_operator(")");
        if !self.expect_operator(";") {
            self.recover_to_semicolon();
        }
        Some(Stmt::Call {
            callee: callee.lexeme,
            args,
            span: callee.span,
        })
    }

    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let ret = self.advance()?;
        let value = self.parse_expression();
        if !self.expect_operator(";") {
            self.recover_to_semicolon();
        }
        Some(Stmt::Return {
            value,
            span: ret.span,
        })
    }

    fn parse_if_stmt(&mut self) -> Option<Stmt> {
        let if_token = self.advance()?;
        self.expect_operator("(");
        let cond = self.parse_expression()?;
        self.expect_operator(")");
        self.expect_operator("{");
        let then_body = self.parse_block();
        self.expect_operator("}");

        let else_body = if self.current().is_some_and(|t| t.is_keyword("else")) {
            self.pos += 1;
            self.expect_operator("{");
            let body = self.parse_block();
            self.expect_operator("}");
            Some(body)
        } else {
            None
        };

        Some(Stmt::If {
            cond,
            then_body,
            else_body,
            span: if_token.span,
        })
    }

    fn parse_for_stmt(&mut self) -> Option<Stmt> {
        let for_token = self.advance()?;
        self.expect_operator("(");
        let init = self.parse_assignment()?;
        let cond = self.parse_expression()?;
        self.expect_operator(";");
        let update = self.parse_bare_assignment()?;
        self.expect_operator(")");
        self.expect_operator("{");
        let body = self.parse_block();
        self.expect_operator("}");
        Some(Stmt::For {
            init,
            cond,
            update,
            body,
            span: for_token.span,
        })
    }

    // ==================== Expressions ====================

    fn parse_expression(&mut self) -> Option<Expr> {
        self.parse_logical()
    }

    fn parse_logical(&mut self) -> Option<Expr> {
        let mut left = self.parse_comparison()?;
        while let Some(op) = self.current_logical_op() {
            self.pos += 1;
            let Some(right) = self.parse_comparison() else {
                break;
            };
            let span = left.span();
            left = Expr::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Some(left)
    }

    fn parse_comparison(&mut self) -> Option<Expr> {
        let left = self.parse_additive()?;
        // At most one relational operator per sub-expression
        if let Some(op) = self.current_cmp_op() {
            self.pos += 1;
            if let Some(right) = self.parse_additive() {
                let span = left.span();
                return Some(Expr::Comparison {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                });
            }
        }
        Some(left)
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.current_bin_op(&[BinOp::Add, BinOp::Sub]) {
            self.pos += 1;
            let Some(right) = self.parse_multiplicative() else {
                break;
            };
            let span = left.span();
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Some(left)
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut left = self.parse_factor()?;
        while let Some(op) = self.current_bin_op(&[BinOp::Mul, BinOp::Div, BinOp::Mod]) {
            self.pos += 1;
            let Some(right) = self.parse_factor() else {
                break;
            };
            let span = left.span();
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Some(left)
    }

    fn parse_factor(&mut self) -> Option<Expr> {
        let token = self.current()?.clone();
        match token.kind {
            TokenKind::Number | TokenKind::String => {
                self.pos += 1;
                Some(Expr::Literal {
                    text: token.lexeme,
                    span: token.span,
                })
            }
            TokenKind::Keyword if token.lexeme == "call" => {
                self.pos += 1;
                self.parse_call_expr(token.span)
            }
            TokenKind::Identifier => {
                self.pos += 1;
                if self.consume_operator("(") {
                    let args = self.parse_arg_list();
                    self.expect_operator(")");
                    Some(Expr::Call {
                        callee: token.lexeme,
                        args,
                        span: token.span,
                    })
                } else if self.consume_operator("[") {
                    let index = self.parse_expression()?;
                    self.expect_operator("]");
                    Some(Expr::StringIndex {
                        target: token.lexeme,
                        index: Box::new(index),
                        span: token.span,
                    })
                } else {
                    Some(Expr::Variable {
                        name: token.lexeme,
                        span: token.span,
                    })
                }
            }
            TokenKind::Operator if token.lexeme == "(" => {
                self.pos += 1;
                let expr = self.parse_expression()?;
                self.expect_operator(")");
                Some(expr)
            }
            _ => {
                self.diagnose(
                    token.span,
                    DiagnosticKind::InvalidFactor {
                        found: token.lexeme,
                    },
                );
                None
            }
        }
    }

    fn parse_call_expr(&mut self, call_span: Span) -> Option<Expr> {
        let callee = match self.current() {
            Some(token) if token.kind == TokenKind::Identifier => self.advance()?,
            _ => {
                self.diagnose(call_span, DiagnosticKind::ExpectedCallTarget);
                return None;
            }
        };
        self.expect_operator("(");
        let args = self.parse_arg_list();
        self.expect_operator(")");
        Some(Expr::Call {
            callee: callee.lexeme,
            args,
            span: callee.span,
        })
    }

    fn parse_arg_list(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        if self.check_operator(")") || self.at_end() {
            return args;
        }
        loop {
            match self.parse_expression() {
                Some(expr) => args.push(expr),
                None => break,
            }
            if !self.consume_operator(",") {
                break;
            }
        }
        args
    }

    fn current_logical_op(&self) -> Option<LogicalOp> {
        let token = self.current()?;
        if token.kind != TokenKind::Operator {
            return None;
        }
        LogicalOp::from_lexeme(&token.lexeme)
    }

    fn current_cmp_op(&self) -> Option<CmpOp> {
        let token = self.current()?;
        if token.kind != TokenKind::Operator {
            return None;
        }
        CmpOp::from_lexeme(&token.lexeme)
    }

    fn current_bin_op(&self, allowed: &[BinOp]) -> Option<BinOp> {
        let token = self.current()?;
        if token.kind != TokenKind::Operator {
            return None;
        }
        BinOp::from_lexeme(&token.lexeme).filter(|op| allowed.contains(op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    fn parse(source: &str) -> (Program, Vec<Diagnostic>) {
        let (tokens, lex_diags) = Lexer::new().tokenize(source);
        assert!(lex_diags.is_empty(), "unexpected lexical errors");
        Parser::new(tokens).parse()
    }

    fn parse_clean(source: &str) -> Program {
        let (program, diags) = parse(source);
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
        program
    }

    #[test]
    fn test_arithmetic_precedence() {
        let program = parse_clean("x = 2 + 3 * 4;");
        let Item::Stmt(Stmt::Assignment(assign)) = &program.items[0] else {
            panic!("expected assignment");
        };
        let Expr::Binary { op, right, .. } = &assign.value else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(
            right.as_ref(),
            Expr::Binary { op: BinOp::Mul, .. }
        ));
    }

    #[test]
    fn test_function_definition() {
        let program = parse_clean("square(n) { return n * n; }");
        let Item::Function(func) = &program.items[0] else {
            panic!("expected function");
        };
        assert_eq!(func.name, "square");
        assert_eq!(func.params.len(), 1);
        assert_eq!(func.params[0].name, "n");
        assert!(matches!(func.body[0], Stmt::Return { .. }));
    }

    #[test]
    fn test_bare_call_in_expression() {
        let program = parse_clean("y = square(5);");
        let Item::Stmt(Stmt::Assignment(assign)) = &program.items[0] else {
            panic!("expected assignment");
        };
        let Expr::Call { callee, args, .. } = &assign.value else {
            panic!("expected call, got {:?}", assign.value);
        };
        assert_eq!(callee, "square");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_call_keyword_in_expression() {
        let program = parse_clean("y = call square(5) + 1;");
        let Item::Stmt(Stmt::Assignment(assign)) = &program.items[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            &assign.value,
            Expr::Binary { op: BinOp::Add, .. }
        ));
    }

    #[test]
    fn test_call_statement() {
        let program = parse_clean("call print(1, \"two\");");
        let Item::Stmt(Stmt::Call { callee, args, .. }) = &program.items[0] else {
            panic!("expected call statement");
        };
        assert_eq!(callee, "print");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_var_decl() {
        let program = parse_clean("Double x;\nString name;");
        assert!(matches!(
            program.items[0],
            Item::Stmt(Stmt::VarDecl {
                declared: Type::Double,
                ..
            })
        ));
        assert!(matches!(
            program.items[1],
            Item::Stmt(Stmt::VarDecl {
                declared: Type::String,
                ..
            })
        ));
    }

    #[test]
    fn test_if_else() {
        let program = parse_clean("if (x < 1) { y = 1; } else { y = 2; }");
        let Item::Stmt(Stmt::If {
            cond,
            then_body,
            else_body,
            ..
        }) = &program.items[0]
        else {
            panic!("expected if");
        };
        assert!(matches!(cond, Expr::Comparison { op: CmpOp::Lt, .. }));
        assert_eq!(then_body.len(), 1);
        assert_eq!(else_body.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_for_loop() {
        let program = parse_clean("for (i = 0; i < 5; i = i + 1) { s = s + i; }");
        let Item::Stmt(Stmt::For {
            init, cond, update, body, ..
        }) = &program.items[0]
        else {
            panic!("expected for");
        };
        assert_eq!(init.target, "i");
        assert!(matches!(cond, Expr::Comparison { .. }));
        assert_eq!(update.target, "i");
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_string_index() {
        let program = parse_clean("c = s[i + 1];");
        let Item::Stmt(Stmt::Assignment(assign)) = &program.items[0] else {
            panic!("expected assignment");
        };
        let Expr::StringIndex { target, index, .. } = &assign.value else {
            panic!("expected string index");
        };
        assert_eq!(target, "s");
        assert!(matches!(index.as_ref(), Expr::Binary { .. }));
    }

    #[test]
    fn test_logical_operators_left_associative() {
        let program = parse_clean("ok = a < 1 && b < 2 || c < 3;");
        let Item::Stmt(Stmt::Assignment(assign)) = &program.items[0] else {
            panic!("expected assignment");
        };
        let Expr::Logical { op, left, .. } = &assign.value else {
            panic!("expected logical op");
        };
        assert_eq!(*op, LogicalOp::Or);
        assert!(matches!(
            left.as_ref(),
            Expr::Logical {
                op: LogicalOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_comparison_is_non_associative() {
        let (_, diags) = parse("x = a < b < c;");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ExpectedSemicolon);
    }

    #[test]
    fn test_missing_semicolon_links_partial_node() {
        let (program, diags) = parse("x = 1");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ExpectedSemicolon);
        assert_eq!(program.items.len(), 1);
    }

    #[test]
    fn test_top_level_resync_recovers_next_statement() {
        let (program, diags) = parse("7 = 3;\ny = 2;");
        assert_eq!(diags.len(), 1);
        assert!(matches!(
            diags[0].kind,
            DiagnosticKind::ExpectedProgramElement { .. }
        ));
        assert_eq!(program.items.len(), 1);
    }

    #[test]
    fn test_parse_print_is_idempotent() {
        let source = "\
greet(who) {\n\
    msg = \"hi \" + who;\n\
    return msg;\n\
}\n\
Double total;\n\
total = 0;\n\
for (i = 0; i < 3; i = i + 1) {\n\
    if (i % 2 == 0 && i != 0) {\n\
        total = total + (i - 1) * 2;\n\
    } else {\n\
        total = total + i;\n\
    }\n\
}\n\
call print(total, greet(\"you\"));\n";
        let printed = parse_clean(source).to_source();
        let reprinted = parse_clean(&printed).to_source();
        assert_eq!(printed, reprinted);
    }
}
