//! Abstract Syntax Tree definitions for L
//!
//! One variant per node kind; the children listed in the grammar become
//! named fields. Trees are built by the parser and immutable afterwards.

use crate::types::Type;
use crate::utils::Span;

/// A complete program (compilation unit)
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level elements
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(Function),
    Stmt(Stmt),
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Function parameter (untyped in source; the analyzer assigns types)
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub span: Span,
}

/// An assignment, either a statement of its own or a `for` header slot
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: String,
    pub value: Expr,
    pub span: Span,
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl {
        name: String,
        declared: Type,
        span: Span,
    },
    Assignment(Assign),
    Call {
        callee: String,
        args: Vec<Expr>,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
        span: Span,
    },
    For {
        init: Assign,
        cond: Expr,
        update: Assign,
        body: Vec<Stmt>,
        span: Span,
    },
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Raw literal text; string literals keep their quotes
    Literal { text: String, span: Span },
    Variable { name: String, span: Span },
    Call {
        callee: String,
        args: Vec<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Comparison {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// Character access on a string variable; yields a one-character string
    StringIndex {
        target: String,
        index: Box<Expr>,
        span: Span,
    },
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    pub fn from_lexeme(op: &str) -> Option<BinOp> {
        match op {
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Sub),
            "*" => Some(BinOp::Mul),
            "/" => Some(BinOp::Div),
            "%" => Some(BinOp::Mod),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }
}

/// Relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
}

impl CmpOp {
    pub fn from_lexeme(op: &str) -> Option<CmpOp> {
        match op {
            "==" => Some(CmpOp::Eq),
            "!=" => Some(CmpOp::Ne),
            "<=" => Some(CmpOp::Le),
            ">=" => Some(CmpOp::Ge),
            "<" => Some(CmpOp::Lt),
            ">" => Some(CmpOp::Gt),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Le => "<=",
            CmpOp::Ge => ">=",
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
        }
    }
}

/// Short-circuit logical operators, spelled `&&` / `||` in source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn from_lexeme(op: &str) -> Option<LogicalOp> {
        match op {
            "&&" => Some(LogicalOp::And),
            "||" => Some(LogicalOp::Or),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }

    /// The grammar-level name of the operator
    pub fn name(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. } => *span,
            Expr::Variable { span, .. } => *span,
            Expr::Call { span, .. } => *span,
            Expr::Binary { span, .. } => *span,
            Expr::Comparison { span, .. } => *span,
            Expr::Logical { span, .. } => *span,
            Expr::StringIndex { span, .. } => *span,
        }
    }

    /// Binding strength, used by the canonical printer and the emitter
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Expr::Logical { .. } => 1,
            Expr::Comparison { .. } => 2,
            Expr::Binary {
                op: BinOp::Add | BinOp::Sub,
                ..
            } => 3,
            Expr::Binary { .. } => 4,
            Expr::Literal { .. }
            | Expr::Variable { .. }
            | Expr::Call { .. }
            | Expr::StringIndex { .. } => 5,
        }
    }
}

// ==================== Canonical printer ====================
//
// Re-emits a tree as L source such that parsing the output reproduces the
// tree. Used by the parse/print round-trip tests and the token dump tooling.

struct SourceWriter {
    out: String,
    indent: usize,
}

impl SourceWriter {
    fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn write_item(&mut self, item: &Item) {
        match item {
            Item::Function(func) => self.write_function(func),
            Item::Stmt(stmt) => self.write_stmt(stmt),
        }
    }

    fn write_function(&mut self, func: &Function) {
        let params: Vec<&str> = func.params.iter().map(|p| p.name.as_str()).collect();
        self.writeln(&format!("{}({}) {{", func.name, params.join(", ")));
        self.indent += 1;
        for stmt in &func.body {
            self.write_stmt(stmt);
        }
        self.indent -= 1;
        self.writeln("}");
    }

    fn write_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl { name, declared, .. } => {
                self.writeln(&format!("{} {};", declared.name(), name));
            }
            Stmt::Assignment(assign) => {
                self.writeln(&format!("{} = {};", assign.target, expr_to_source(&assign.value)));
            }
            Stmt::Call { callee, args, .. } => {
                self.writeln(&format!("call {}({});", callee, args_to_source(args)));
            }
            Stmt::Return { value, .. } => match value {
                Some(expr) => self.writeln(&format!("return {};", expr_to_source(expr))),
                None => self.writeln("return;"),
            },
            Stmt::If {
                cond,
                then_body,
                else_body,
                ..
            } => {
                self.writeln(&format!("if ({}) {{", expr_to_source(cond)));
                self.indent += 1;
                for stmt in then_body {
                    self.write_stmt(stmt);
                }
                self.indent -= 1;
                match else_body {
                    Some(body) => {
                        self.writeln("} else {");
                        self.indent += 1;
                        for stmt in body {
                            self.write_stmt(stmt);
                        }
                        self.indent -= 1;
                        self.writeln("}");
                    }
                    None => self.writeln("}"),
                }
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
                ..
            } => {
                self.writeln(&format!(
                    "for ({} = {}; {}; {} = {}) {{",
                    init.target,
                    expr_to_source(&init.value),
                    expr_to_source(cond),
                    update.target,
                    expr_to_source(&update.value),
                ));
                self.indent += 1;
                for stmt in body {
                    self.write_stmt(stmt);
                }
                self.indent -= 1;
                self.writeln("}");
            }
        }
    }
}

fn args_to_source(args: &[Expr]) -> String {
    let rendered: Vec<String> = args.iter().map(expr_to_source).collect();
    rendered.join(", ")
}

/// Render an expression, parenthesizing wherever re-parsing would otherwise
/// regroup the tree
pub fn expr_to_source(expr: &Expr) -> String {
    match expr {
        Expr::Literal { text, .. } => text.clone(),
        Expr::Variable { name, .. } => name.clone(),
        Expr::Call { callee, args, .. } => format!("{}({})", callee, args_to_source(args)),
        Expr::StringIndex { target, index, .. } => {
            format!("{}[{}]", target, expr_to_source(index))
        }
        Expr::Binary {
            op, left, right, ..
        } => binary_to_source(expr.precedence(), op.symbol(), left, right, false),
        Expr::Logical {
            op, left, right, ..
        } => binary_to_source(expr.precedence(), op.symbol(), left, right, false),
        Expr::Comparison {
            op, left, right, ..
        } => binary_to_source(expr.precedence(), op.symbol(), left, right, true),
    }
}

fn binary_to_source(prec: u8, symbol: &str, left: &Expr, right: &Expr, non_assoc: bool) -> String {
    // Left-associative: the right child needs parentheses at equal strength.
    // Comparison is non-associative, so both sides do.
    let left_needs = left.precedence() < prec || (non_assoc && left.precedence() == prec);
    let right_needs = right.precedence() <= prec;
    format!(
        "{} {} {}",
        wrapped(left, left_needs),
        symbol,
        wrapped(right, right_needs)
    )
}

fn wrapped(expr: &Expr, parens: bool) -> String {
    let rendered = expr_to_source(expr);
    if parens {
        format!("({})", rendered)
    } else {
        rendered
    }
}

impl Program {
    /// Re-emit the tree as canonical L source
    pub fn to_source(&self) -> String {
        let mut writer = SourceWriter {
            out: String::new(),
            indent: 0,
        };
        for item in &self.items {
            writer.write_item(item);
        }
        writer.out
    }
}
