//! Semantic Analysis for L
//!
//! A single top-down walk that populates the symbol table, infers expression
//! types, and checks calls, conditions, and operators. Diagnostics are
//! collected; the walk never stops early.

use std::collections::HashMap;

use crate::frontend::ast::*;
use crate::stdlib::{takes_string_params, BuiltinRegistry};
use crate::types::Type;
use crate::utils::{Diagnostic, DiagnosticKind, Span};

// ==================== Symbol Table ====================

/// Flat name-to-type mapping plus per-function parameter lists.
///
/// One type per identifier; later additions overwrite earlier ones, which is
/// how return-type refinement behaves. `function_params` is defined for
/// every callable name — absence means "unknown callable".
#[derive(Debug, Default)]
pub struct SymbolTable {
    types: HashMap<String, Type>,
    function_params: HashMap<String, Vec<Type>>,
    declared_at: HashMap<String, Span>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, ty: Type, span: Span) {
        log::debug!(
            "Added to symbol table: {} (Type: {}, Line: {}, Column: {})",
            name,
            ty,
            span.line,
            span.column
        );
        self.types.insert(name.to_string(), ty);
        self.declared_at.insert(name.to_string(), span);
    }

    pub fn add_function_params(&mut self, name: &str, params: Vec<Type>) {
        self.function_params.insert(name.to_string(), params);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Checked lookup; the analyzer diagnoses the miss
    pub fn lookup(&self, name: &str) -> Option<Type> {
        self.types.get(name).copied()
    }

    /// Lookup with the legacy Double default; the emitter relies on this
    /// for names the analyzer never saw
    pub fn get_type(&self, name: &str) -> Type {
        self.types.get(name).copied().unwrap_or(Type::Double)
    }

    /// Empty on miss
    pub fn get_function_params(&self, name: &str) -> &[Type] {
        self.function_params
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_callable(&self, name: &str) -> bool {
        self.function_params.contains_key(name)
    }

    pub fn declaration(&self, name: &str) -> Option<Span> {
        self.declared_at.get(name).copied()
    }
}

// ==================== Semantic Analyzer ====================

/// Semantic analyzer
pub struct SemanticAnalyzer {
    symbols: SymbolTable,
    builtins: BuiltinRegistry,
    diagnostics: Vec<Diagnostic>,
    /// Inferred type of the first `return` in the function body being walked
    first_return: Option<Type>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        let mut analyzer = Self {
            symbols: SymbolTable::new(),
            builtins: BuiltinRegistry::new(),
            diagnostics: Vec::new(),
            first_return: None,
        };
        analyzer.seed_builtins();
        analyzer
    }

    /// Install the built-in catalogue before any user code is seen
    fn seed_builtins(&mut self) {
        let entries: Vec<_> = self.builtins.all().cloned().collect();
        for builtin in entries {
            self.symbols
                .add(builtin.name, builtin.ret_type, Span::dummy());
            self.symbols
                .add_function_params(builtin.name, builtin.params);
        }
    }

    /// Walk the program, returning the finalized table and all semantic
    /// diagnostics
    pub fn analyze(mut self, program: &Program) -> (SymbolTable, Vec<Diagnostic>) {
        for item in &program.items {
            match item {
                Item::Function(func) => self.analyze_function(func),
                Item::Stmt(stmt) => self.analyze_stmt(stmt),
            }
        }
        (self.symbols, self.diagnostics)
    }

    fn diagnose(&mut self, span: Span, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic::new(span, kind));
    }

    fn analyze_function(&mut self, func: &Function) {
        // Parameter types come from the function's *name*: a collision with
        // a string-flavored built-in name means String parameters
        let param_ty = if takes_string_params(&func.name) {
            Type::String
        } else {
            Type::Double
        };
        let mut param_types = Vec::new();
        for param in &func.params {
            self.symbols.add(&param.name, param_ty, param.span);
            param_types.push(param_ty);
        }
        self.symbols
            .add_function_params(&func.name, param_types);

        // Provisional return type so recursive calls resolve
        let provisional = self.heuristic_return(&func.name).unwrap_or(Type::Double);
        self.symbols.add(&func.name, provisional, func.span);

        self.first_return = None;
        for stmt in &func.body {
            self.analyze_stmt(stmt);
        }

        // Refinement, last write wins: name heuristic, then the first
        // return statement's expression, then Double
        let ret = self
            .heuristic_return(&func.name)
            .or(self.first_return)
            .unwrap_or(Type::Double);
        self.symbols.add(&func.name, ret, func.span);
    }

    /// Name-based return-type heuristic: a built-in name collision adopts
    /// the catalogue's return type
    fn heuristic_return(&self, name: &str) -> Option<Type> {
        self.builtins.get(name).map(|builtin| builtin.ret_type)
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl {
                name,
                declared,
                span,
            } => {
                self.symbols.add(name, *declared, *span);
            }
            Stmt::Assignment(assign) => self.analyze_assign(assign),
            Stmt::Call { callee, args, span } => {
                self.check_call(callee, args, *span);
            }
            Stmt::Return { value, .. } => {
                if let Some(expr) = value {
                    let ty = self.infer_type(expr);
                    if self.first_return.is_none() {
                        self.first_return = Some(ty);
                    }
                }
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
                ..
            } => {
                self.check_condition(cond, "if");
                for stmt in then_body {
                    self.analyze_stmt(stmt);
                }
                if let Some(body) = else_body {
                    for stmt in body {
                        self.analyze_stmt(stmt);
                    }
                }
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
                ..
            } => {
                self.analyze_assign(init);
                self.check_condition(cond, "for");
                self.analyze_assign(update);
                for stmt in body {
                    self.analyze_stmt(stmt);
                }
            }
        }
    }

    /// Record the target's type at the point of assignment
    fn analyze_assign(&mut self, assign: &Assign) {
        let ty = self.infer_type(&assign.value);
        self.symbols.add(&assign.target, ty, assign.span);
    }

    fn check_condition(&mut self, cond: &Expr, construct: &'static str) {
        let ty = self.infer_type(cond);
        if ty != Type::Boolean && ty != Type::Unknown {
            self.diagnose(
                cond.span(),
                DiagnosticKind::ConditionType { construct, got: ty },
            );
        }
    }

    /// Infer an expression's type, diagnosing undefined names and operand
    /// mismatches along the way
    fn infer_type(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Literal { text, .. } => literal_type(text),
            Expr::Variable { name, span } => match self.symbols.lookup(name) {
                Some(ty) => ty,
                None => {
                    self.diagnose(
                        *span,
                        DiagnosticKind::UndefinedVariable {
                            name: name.clone(),
                        },
                    );
                    Type::Unknown
                }
            },
            Expr::Call { callee, args, span } => self.check_call(callee, args, *span),
            Expr::StringIndex {
                target,
                index,
                span,
            } => {
                if self.symbols.lookup(target).is_none() {
                    self.diagnose(
                        *span,
                        DiagnosticKind::UndefinedVariable {
                            name: target.clone(),
                        },
                    );
                }
                self.infer_type(index);
                Type::String
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                let lt = self.infer_type(left);
                let rt = self.infer_type(right);
                self.check_binary(*op, lt, rt, expr.span())
            }
            Expr::Comparison {
                op, left, right, ..
            } => {
                let lt = self.infer_type(left);
                let rt = self.infer_type(right);
                let both_known = lt != Type::Unknown && rt != Type::Unknown;
                if both_known && (lt != Type::Double || rt != Type::Double) {
                    self.diagnose(
                        expr.span(),
                        DiagnosticKind::OperandType {
                            op: op.symbol(),
                            left: lt,
                            right: rt,
                        },
                    );
                }
                Type::Boolean
            }
            Expr::Logical { left, right, .. } => {
                // Operand types are not enforced here, only the result
                self.infer_type(left);
                self.infer_type(right);
                Type::Boolean
            }
        }
    }

    fn check_binary(&mut self, op: BinOp, left: Type, right: Type, span: Span) -> Type {
        if left == Type::Unknown || right == Type::Unknown {
            return Type::Unknown;
        }
        match op {
            // `+` is concatenation as soon as either side is a String
            BinOp::Add if left == Type::String || right == Type::String => Type::String,
            _ if left == Type::Double && right == Type::Double => Type::Double,
            _ => {
                self.diagnose(
                    span,
                    DiagnosticKind::OperandType {
                        op: op.symbol(),
                        left,
                        right,
                    },
                );
                Type::Unknown
            }
        }
    }

    /// Verify a call site and return the callee's return type
    fn check_call(&mut self, callee: &str, args: &[Expr], span: Span) -> Type {
        // print takes any number of printable arguments
        if callee == "print" {
            for (index, arg) in args.iter().enumerate() {
                let ty = self.infer_type(arg);
                if !ty.is_printable() && ty != Type::Unknown {
                    self.diagnose(
                        arg.span(),
                        DiagnosticKind::PrintArgument {
                            index: index + 1,
                            got: ty,
                        },
                    );
                }
            }
            return Type::Void;
        }

        if !self.symbols.is_callable(callee) {
            self.diagnose(
                span,
                DiagnosticKind::UndefinedFunction {
                    name: callee.to_string(),
                },
            );
            return Type::Unknown;
        }

        let expected = self.symbols.get_function_params(callee).to_vec();
        if expected.len() != args.len() {
            self.diagnose(
                span,
                DiagnosticKind::ArgumentCount {
                    function: callee.to_string(),
                    expected: expected.len(),
                    got: args.len(),
                },
            );
            return self.symbols.get_type(callee);
        }

        for (index, (arg, &want)) in args.iter().zip(expected.iter()).enumerate() {
            let got = self.infer_type(arg);
            if got != want && got != Type::Unknown {
                self.diagnose(
                    arg.span(),
                    DiagnosticKind::ArgumentType {
                        index: index + 1,
                        function: callee.to_string(),
                        expected: want,
                        got,
                    },
                );
            }
        }
        self.symbols.get_type(callee)
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn literal_type(text: &str) -> Type {
    if text.starts_with('"') {
        Type::String
    } else if text == "true" || text == "false" {
        Type::Boolean
    } else if is_number(text) {
        Type::Double
    } else {
        Type::Unknown
    }
}

/// `[0-9]+(\.[0-9]+)?`
fn is_number(text: &str) -> bool {
    let mut parts = text.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match parts.next() {
        Some(frac) => all_digits(whole) && all_digits(frac),
        None => all_digits(whole),
    }
}
