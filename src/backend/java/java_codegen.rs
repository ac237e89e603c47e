//! Java Code Generator
//!
//! Emits one `CompilerOutput` class from a validated AST and the finalized
//! symbol table. The emitter never re-checks types; on a malformed tree it
//! may produce uncompilable Java, but it never fails. Output is fully
//! determined by source order: functions, statements, and hoisted
//! declarations all keep their order of first appearance.

use std::collections::HashMap;

use crate::frontend::ast::*;
use crate::frontend::semantic::SymbolTable;
use crate::stdlib::BuiltinRegistry;
use crate::types::Type;

/// Built-ins emitted as a host expression at the call site instead of an
/// adapter method
const DIRECT_BUILTINS: &[&str] = &["get_username", "get_wd", "get_user_home_dir", "get_env"];

/// Helper routines, in emission order, keyed by the built-in that needs them
const HELPERS: &[(&str, &str)] = &[
    ("factorial", "factorial"),
    ("is_prime", "isPrime"),
    ("digit_sum", "digitSum"),
    ("is_palindrome", "isPalindrome"),
    ("is_numeric", "isNumeric"),
    ("repeat_string", "repeatString"),
];

/// Java code generator
pub struct JavaCodeGen<'a> {
    symbols: &'a SymbolTable,
    builtins: BuiltinRegistry,
    /// Names of user-defined functions; these shadow built-ins
    user_functions: Vec<String>,
    output: String,
    indent: usize,
}

impl<'a> JavaCodeGen<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            builtins: BuiltinRegistry::new(),
            user_functions: Vec::new(),
            output: String::new(),
            indent: 0,
        }
    }

    /// Generate the complete translation unit
    pub fn generate(mut self, program: &Program) -> String {
        let functions = dedup_functions(program);
        self.user_functions = functions.iter().map(|f| f.name.clone()).collect();

        let adapters = self.referenced_adapters(program);
        let helpers: Vec<&str> = HELPERS
            .iter()
            .filter(|(builtin, _)| adapters.iter().any(|name| name == builtin))
            .map(|(_, helper)| *helper)
            .collect();

        self.writeln("public class CompilerOutput {");
        self.indent += 1;

        for func in &functions {
            self.generate_function(func);
        }
        for name in &adapters {
            self.generate_adapter(name);
        }
        for helper in &helpers {
            self.generate_helper(helper);
        }

        self.writeln("public static void main(String[] args) {");
        self.indent += 1;
        let top_level: Vec<&Stmt> = program
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Stmt(stmt) => Some(stmt),
                Item::Function(_) => None,
            })
            .collect();
        self.hoist_declarations(&top_level, &[]);
        for stmt in &top_level {
            self.generate_stmt(stmt);
        }
        self.indent -= 1;
        self.writeln("}");

        self.indent -= 1;
        self.writeln("}");
        self.output
    }

    // ==================== Writer ====================

    fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn blank(&mut self) {
        self.output.push('\n');
    }

    // ==================== Functions ====================

    fn generate_function(&mut self, func: &Function) {
        let ret = self.symbols.get_type(&func.name).java_name();
        let param_types = self.symbols.get_function_params(&func.name);
        let params: Vec<String> = func
            .params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let ty = param_types.get(i).copied().unwrap_or(Type::Double);
                format!("{} {}", ty.java_name(), param.name)
            })
            .collect();
        self.writeln(&format!(
            "public static {} {}({}) {{",
            ret,
            func.name,
            params.join(", ")
        ));
        self.indent += 1;

        let param_names: Vec<String> = func.params.iter().map(|p| p.name.clone()).collect();
        let body: Vec<&Stmt> = func.body.iter().collect();
        self.hoist_declarations(&body, &param_names);
        for stmt in &body {
            self.generate_stmt(stmt);
        }

        self.indent -= 1;
        self.writeln("}");
        self.blank();
    }

    /// Declare every assignment target and declared variable once, before
    /// any statement runs
    fn hoist_declarations(&mut self, stmts: &[&Stmt], exclude: &[String]) {
        let mut names: Vec<&str> = Vec::new();
        for stmt in stmts {
            collect_locals(stmt, &mut names);
        }
        names.retain(|name| !exclude.iter().any(|p| p == name));
        for name in names {
            let ty = self.symbols.get_type(name).java_name();
            self.writeln(&format!("{} {};", ty, name));
        }
    }

    // ==================== Statements ====================

    fn generate_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            // Already hoisted
            Stmt::VarDecl { .. } => {}
            Stmt::Assignment(assign) => {
                let value = self.expr_to_java(&assign.value);
                self.writeln(&format!("{} = {};", assign.target, value));
            }
            Stmt::Call { callee, args, .. } => {
                if callee == "print" && !self.is_user_function(callee) {
                    self.generate_print(args);
                } else {
                    let call = self.call_to_java(callee, args);
                    self.writeln(&format!("{};", call));
                }
            }
            Stmt::Return { value, .. } => match value {
                Some(expr) => {
                    let rendered = self.expr_to_java(expr);
                    self.writeln(&format!("return {};", rendered));
                }
                None => self.writeln("return;"),
            },
            Stmt::If {
                cond,
                then_body,
                else_body,
                ..
            } => {
                let cond = self.expr_to_java(cond);
                self.writeln(&format!("if ({}) {{", cond));
                self.indent += 1;
                for stmt in then_body {
                    self.generate_stmt(stmt);
                }
                self.indent -= 1;
                match else_body {
                    Some(body) => {
                        self.writeln("} else {");
                        self.indent += 1;
                        for stmt in body {
                            self.generate_stmt(stmt);
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
                let header = format!(
                    "for ({} = {}; {}; {} = {}) {{",
                    init.target,
                    self.expr_to_java(&init.value),
                    self.expr_to_java(cond),
                    update.target,
                    self.expr_to_java(&update.value),
                );
                self.writeln(&header);
                self.indent += 1;
                for stmt in body {
                    self.generate_stmt(stmt);
                }
                self.indent -= 1;
                self.writeln("}");
            }
        }
    }

    /// `print` joins its arguments with single spaces into one println
    fn generate_print(&mut self, args: &[Expr]) {
        if args.is_empty() {
            self.writeln("System.out.println();");
            return;
        }
        if args.len() == 1 {
            let arg = self.expr_to_java(&args[0]);
            self.writeln(&format!("System.out.println({});", arg));
            return;
        }
        // Joined arguments are parenthesized so the string concatenation
        // does not swallow nested arithmetic
        let parts: Vec<String> = args.iter().map(|arg| self.joined_arg(arg)).collect();
        self.writeln(&format!(
            "System.out.println({});",
            parts.join(" + \" \" + ")
        ));
    }

    fn joined_arg(&self, arg: &Expr) -> String {
        let rendered = self.expr_to_java(arg);
        match arg {
            Expr::Binary { .. } | Expr::Comparison { .. } | Expr::Logical { .. } => {
                format!("({})", rendered)
            }
            _ => rendered,
        }
    }

    // ==================== Expressions ====================

    fn expr_to_java(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal { text, .. } => literal_to_java(text),
            Expr::Variable { name, .. } => name.clone(),
            Expr::Call { callee, args, .. } => self.call_to_java(callee, args),
            Expr::StringIndex { target, index, .. } => {
                let index = self.expr_to_java(index);
                format!(
                    "String.valueOf({}.charAt((int) (double) ({})))",
                    target, index
                )
            }
            Expr::Binary {
                op, left, right, ..
            } => self.infix_to_java(expr, op.symbol(), left, right, false),
            Expr::Logical {
                op, left, right, ..
            } => self.infix_to_java(expr, op.symbol(), left, right, false),
            Expr::Comparison {
                op, left, right, ..
            } => self.infix_to_java(expr, op.symbol(), left, right, true),
        }
    }

    fn infix_to_java(
        &self,
        parent: &Expr,
        symbol: &str,
        left: &Expr,
        right: &Expr,
        non_assoc: bool,
    ) -> String {
        let prec = parent.precedence();
        // L gives && and || one flat level; Java does not, so a mixed
        // logical child keeps its parentheses
        let left_parens = left.precedence() < prec
            || (non_assoc && left.precedence() == prec)
            || mixed_logical(parent, left);
        let right_parens = right.precedence() <= prec;
        format!(
            "{} {} {}",
            self.maybe_wrapped(left, left_parens),
            symbol,
            self.maybe_wrapped(right, right_parens)
        )
    }

    fn maybe_wrapped(&self, expr: &Expr, parens: bool) -> String {
        let rendered = self.expr_to_java(expr);
        if parens {
            format!("({})", rendered)
        } else {
            rendered
        }
    }

    fn call_to_java(&self, callee: &str, args: &[Expr]) -> String {
        let rendered: Vec<String> = args.iter().map(|arg| self.expr_to_java(arg)).collect();
        if !self.is_user_function(callee) {
            match callee {
                "get_username" => return "System.getProperty(\"user.name\")".to_string(),
                "get_wd" => return "System.getProperty(\"user.dir\")".to_string(),
                "get_user_home_dir" => return "System.getProperty(\"user.home\")".to_string(),
                "get_env" => return format!("System.getenv({})", rendered.join(", ")),
                _ => {}
            }
        }
        // Unknown callees pass through unchanged; a user function of that
        // name is assumed to exist
        format!("{}({})", callee, rendered.join(", "))
    }

    fn is_user_function(&self, name: &str) -> bool {
        self.user_functions.iter().any(|f| f == name)
    }

    // ==================== Built-in adapters ====================

    /// Built-ins referenced by the program that need an adapter method, in
    /// order of first reference
    fn referenced_adapters(&self, program: &Program) -> Vec<String> {
        let mut callees: Vec<&str> = Vec::new();
        for item in &program.items {
            match item {
                Item::Function(func) => {
                    for stmt in &func.body {
                        collect_callees_stmt(stmt, &mut callees);
                    }
                }
                Item::Stmt(stmt) => collect_callees_stmt(stmt, &mut callees),
            }
        }
        callees
            .into_iter()
            .filter(|name| {
                *name != "print"
                    && self.builtins.is_builtin(name)
                    && !DIRECT_BUILTINS.contains(name)
                    && !self.is_user_function(name)
            })
            .map(str::to_string)
            .collect()
    }

    fn generate_adapter(&mut self, name: &str) {
        let lines: &[&str] = match name {
            "length" => &[
                "public static Double length(String s) {",
                "    return (double) s.length();",
                "}",
            ],
            "capitalize" => &[
                "public static String capitalize(String s) {",
                "    return s.isEmpty() ? s : s.substring(0, 1).toUpperCase() + s.substring(1);",
                "}",
            ],
            "uppercase" => &[
                "public static String uppercase(String s) {",
                "    return s.toUpperCase();",
                "}",
            ],
            "lowercase" => &[
                "public static String lowercase(String s) {",
                "    return s.toLowerCase();",
                "}",
            ],
            "is_empty" => &[
                "public static Boolean is_empty(String s) {",
                "    return s.isEmpty();",
                "}",
            ],
            "is_numeric" => &[
                "public static Boolean is_numeric(String s) {",
                "    return isNumeric(s);",
                "}",
            ],
            "concat" => &[
                "public static String concat(String a, String b) {",
                "    return a + b;",
                "}",
            ],
            "contains" => &[
                "public static Boolean contains(String s, String part) {",
                "    return s.contains(part);",
                "}",
            ],
            "index_of" => &[
                "public static Double index_of(String s, String part) {",
                "    return (double) s.indexOf(part);",
                "}",
            ],
            "repeat_string" => &[
                "public static String repeat_string(String s, Double count) {",
                "    return repeatString(s, count.intValue());",
                "}",
            ],
            "reverse" => &[
                "public static String reverse(String s) {",
                "    return new StringBuilder(s).reverse().toString();",
                "}",
            ],
            "is_palindrome" => &[
                "public static Boolean is_palindrome(String s) {",
                "    return isPalindrome(s);",
                "}",
            ],
            "add" => &[
                "public static Double add(Double a, Double b) {",
                "    return a + b;",
                "}",
            ],
            "subtract" => &[
                "public static Double subtract(Double a, Double b) {",
                "    return a - b;",
                "}",
            ],
            "multiply" => &[
                "public static Double multiply(Double a, Double b) {",
                "    return a * b;",
                "}",
            ],
            "divide" => &[
                "public static Double divide(Double a, Double b) {",
                "    return a / b;",
                "}",
            ],
            "max" => &[
                "public static Double max(Double a, Double b) {",
                "    return Math.max(a, b);",
                "}",
            ],
            "min" => &[
                "public static Double min(Double a, Double b) {",
                "    return Math.min(a, b);",
                "}",
            ],
            "abs" => &[
                "public static Double abs(Double n) {",
                "    return Math.abs(n);",
                "}",
            ],
            "compare" => &[
                "public static Double compare(Double a, Double b) {",
                "    return (double) Double.compare(a, b);",
                "}",
            ],
            "factorial" => &[
                "public static Double factorial(Double n) {",
                "    return (double) factorial(n.longValue());",
                "}",
            ],
            "is_prime" => &[
                "public static Boolean is_prime(Double n) {",
                "    return isPrime(n.longValue());",
                "}",
            ],
            "average" => &[
                "public static Double average(Double a, Double b) {",
                "    return (a + b) / 2.0;",
                "}",
            ],
            "round" => &[
                "public static Double round(Double n) {",
                "    return (double) Math.round(n);",
                "}",
            ],
            "floor" => &[
                "public static Double floor(Double n) {",
                "    return Math.floor(n);",
                "}",
            ],
            "ceil" => &[
                "public static Double ceil(Double n) {",
                "    return Math.ceil(n);",
                "}",
            ],
            "is_even" => &[
                "public static Boolean is_even(Double n) {",
                "    return n % 2.0 == 0.0;",
                "}",
            ],
            "is_odd" => &[
                "public static Boolean is_odd(Double n) {",
                "    return n % 2.0 != 0.0;",
                "}",
            ],
            "digit_sum" => &[
                "public static Double digit_sum(Double n) {",
                "    return (double) digitSum(n.longValue());",
                "}",
            ],
            "is_divisible" => &[
                "public static Boolean is_divisible(Double a, Double b) {",
                "    return a % b == 0.0;",
                "}",
            ],
            "modulus" => &[
                "public static Double modulus(Double a, Double b) {",
                "    return a % b;",
                "}",
            ],
            "in_range" => &[
                "public static Boolean in_range(Double n, Double low, Double high) {",
                "    return n >= low && n <= high;",
                "}",
            ],
            "random_num" => &[
                "public static Double random_num(Double low, Double high) {",
                "    return Math.floor(Math.random() * (high - low + 1.0)) + low;",
                "}",
            ],
            "square" => &[
                "public static Double square(Double n) {",
                "    return n * n;",
                "}",
            ],
            "cube" => &[
                "public static Double cube(Double n) {",
                "    return n * n * n;",
                "}",
            ],
            "percent_of" => &[
                "public static Double percent_of(Double value, Double percent) {",
                "    return value * percent / 100.0;",
                "}",
            ],
            "roll_dice" => &[
                "public static Double roll_dice() {",
                "    return Math.floor(Math.random() * 6.0) + 1.0;",
                "}",
            ],
            "distance" => &[
                "public static Double distance(Double x1, Double y1, Double x2, Double y2) {",
                "    return Math.sqrt((x2 - x1) * (x2 - x1) + (y2 - y1) * (y2 - y1));",
                "}",
            ],
            "is_positive" => &[
                "public static Boolean is_positive(Double n) {",
                "    return n > 0.0;",
                "}",
            ],
            "is_greater" => &[
                "public static Boolean is_greater(Double a, Double b) {",
                "    return a > b;",
                "}",
            ],
            "create_file" => &[
                "public static Boolean create_file(String path) {",
                "    try {",
                "        return new java.io.File(path).createNewFile();",
                "    } catch (java.io.IOException e) {",
                "        return false;",
                "    }",
                "}",
            ],
            "delete_file" => &[
                "public static Boolean delete_file(String path) {",
                "    return new java.io.File(path).delete();",
                "}",
            ],
            "copy_file" => &[
                "public static Boolean copy_file(String from, String to) {",
                "    try {",
                "        java.nio.file.Files.copy(java.nio.file.Paths.get(from), java.nio.file.Paths.get(to), java.nio.file.StandardCopyOption.REPLACE_EXISTING);",
                "        return true;",
                "    } catch (java.io.IOException e) {",
                "        return false;",
                "    }",
                "}",
            ],
            "move_file" => &[
                "public static Boolean move_file(String from, String to) {",
                "    try {",
                "        java.nio.file.Files.move(java.nio.file.Paths.get(from), java.nio.file.Paths.get(to), java.nio.file.StandardCopyOption.REPLACE_EXISTING);",
                "        return true;",
                "    } catch (java.io.IOException e) {",
                "        return false;",
                "    }",
                "}",
            ],
            "exec" => &[
                "public static String exec(String command) {",
                "    try {",
                "        Process process = Runtime.getRuntime().exec(command);",
                "        java.util.Scanner scanner = new java.util.Scanner(process.getInputStream()).useDelimiter(\"\\\\A\");",
                "        return scanner.hasNext() ? scanner.next() : \"\";",
                "    } catch (java.io.IOException e) {",
                "        return \"\";",
                "    }",
                "}",
            ],
            "change_dir" => &[
                "public static Boolean change_dir(String path) {",
                "    java.io.File dir = new java.io.File(path);",
                "    if (dir.isDirectory()) {",
                "        System.setProperty(\"user.dir\", dir.getAbsolutePath());",
                "        return true;",
                "    }",
                "    return false;",
                "}",
            ],
            _ => return,
        };
        for line in lines {
            self.writeln(line);
        }
        self.blank();
    }

    // ==================== Helper routines ====================

    fn generate_helper(&mut self, name: &str) {
        let lines: &[&str] = match name {
            "factorial" => &[
                "static long factorial(long n) {",
                "    long result = 1;",
                "    for (long i = 2; i <= n; i++) {",
                "        result = result * i;",
                "    }",
                "    return result;",
                "}",
            ],
            "isPrime" => &[
                "static boolean isPrime(long n) {",
                "    if (n < 2) {",
                "        return false;",
                "    }",
                "    for (long i = 2; i * i <= n; i++) {",
                "        if (n % i == 0) {",
                "            return false;",
                "        }",
                "    }",
                "    return true;",
                "}",
            ],
            "digitSum" => &[
                "static long digitSum(long n) {",
                "    long sum = 0;",
                "    for (long rest = Math.abs(n); rest > 0; rest = rest / 10) {",
                "        sum = sum + rest % 10;",
                "    }",
                "    return sum;",
                "}",
            ],
            "isPalindrome" => &[
                "static boolean isPalindrome(String s) {",
                "    return new StringBuilder(s).reverse().toString().equals(s);",
                "}",
            ],
            "isNumeric" => &[
                "static boolean isNumeric(String s) {",
                "    if (s.isEmpty()) {",
                "        return false;",
                "    }",
                "    try {",
                "        Double.parseDouble(s);",
                "        return true;",
                "    } catch (NumberFormatException e) {",
                "        return false;",
                "    }",
                "}",
            ],
            "repeatString" => &[
                "static String repeatString(String s, int count) {",
                "    StringBuilder builder = new StringBuilder();",
                "    for (int i = 0; i < count; i++) {",
                "        builder.append(s);",
                "    }",
                "    return builder.toString();",
                "}",
            ],
            _ => return,
        };
        for line in lines {
            self.writeln(line);
        }
        self.blank();
    }
}

// ==================== Free helpers ====================

fn mixed_logical(parent: &Expr, child: &Expr) -> bool {
    match (parent, child) {
        (Expr::Logical { op: outer, .. }, Expr::Logical { op: inner, .. }) => outer != inner,
        _ => false,
    }
}

/// One function per name; the last definition's body wins, emitted at the
/// source position of the first occurrence
fn dedup_functions(program: &Program) -> Vec<&Function> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_name: HashMap<&str, &Function> = HashMap::new();
    for item in &program.items {
        if let Item::Function(func) = item {
            if !by_name.contains_key(func.name.as_str()) {
                order.push(&func.name);
            }
            by_name.insert(&func.name, func);
        }
    }
    order.into_iter().map(|name| by_name[name]).collect()
}

/// A Number literal without a decimal point gains `.0` so Java types it as
/// floating point
fn literal_to_java(text: &str) -> String {
    let is_integer = !text.is_empty() && text.chars().all(|c| c.is_ascii_digit());
    if is_integer {
        format!("{}.0", text)
    } else {
        text.to_string()
    }
}

/// Collect assignment targets and declared names in order of appearance
fn collect_locals<'p>(stmt: &'p Stmt, names: &mut Vec<&'p str>) {
    let mut push = |name: &'p str, names: &mut Vec<&'p str>| {
        if !names.contains(&name) {
            names.push(name);
        }
    };
    match stmt {
        Stmt::VarDecl { name, .. } => push(name, names),
        Stmt::Assignment(assign) => push(&assign.target, names),
        Stmt::Call { .. } | Stmt::Return { .. } => {}
        Stmt::If {
            then_body,
            else_body,
            ..
        } => {
            for stmt in then_body {
                collect_locals(stmt, names);
            }
            if let Some(body) = else_body {
                for stmt in body {
                    collect_locals(stmt, names);
                }
            }
        }
        Stmt::For {
            init, update, body, ..
        } => {
            push(&init.target, names);
            push(&update.target, names);
            for stmt in body {
                collect_locals(stmt, names);
            }
        }
    }
}

fn collect_callees_stmt<'p>(stmt: &'p Stmt, callees: &mut Vec<&'p str>) {
    match stmt {
        Stmt::VarDecl { .. } => {}
        Stmt::Assignment(assign) => collect_callees_expr(&assign.value, callees),
        Stmt::Call { callee, args, .. } => {
            if !callees.contains(&callee.as_str()) {
                callees.push(callee);
            }
            for arg in args {
                collect_callees_expr(arg, callees);
            }
        }
        Stmt::Return { value, .. } => {
            if let Some(expr) = value {
                collect_callees_expr(expr, callees);
            }
        }
        Stmt::If {
            cond,
            then_body,
            else_body,
            ..
        } => {
            collect_callees_expr(cond, callees);
            for stmt in then_body {
                collect_callees_stmt(stmt, callees);
            }
            if let Some(body) = else_body {
                for stmt in body {
                    collect_callees_stmt(stmt, callees);
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
            collect_callees_expr(&init.value, callees);
            collect_callees_expr(cond, callees);
            collect_callees_expr(&update.value, callees);
            for stmt in body {
                collect_callees_stmt(stmt, callees);
            }
        }
    }
}

fn collect_callees_expr<'p>(expr: &'p Expr, callees: &mut Vec<&'p str>) {
    match expr {
        Expr::Literal { .. } | Expr::Variable { .. } => {}
        Expr::Call { callee, args, .. } => {
            if !callees.contains(&callee.as_str()) {
                callees.push(callee);
            }
            for arg in args {
                collect_callees_expr(arg, callees);
            }
        }
        Expr::StringIndex { index, .. } => collect_callees_expr(index, callees),
        Expr::Binary { left, right, .. }
        | Expr::Comparison { left, right, .. }
        | Expr::Logical { left, right, .. } => {
            collect_callees_expr(left, callees);
            collect_callees_expr(right, callees);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::parser::Parser;
    use crate::frontend::semantic::SemanticAnalyzer;

    fn generate(source: &str) -> String {
        let (tokens, lex_diags) = Lexer::new().tokenize(source);
        assert!(lex_diags.is_empty());
        let (program, parse_diags) = Parser::new(tokens).parse();
        assert!(parse_diags.is_empty(), "{:?}", parse_diags);
        let (symbols, sem_diags) = SemanticAnalyzer::new().analyze(&program);
        assert!(sem_diags.is_empty(), "{:?}", sem_diags);
        JavaCodeGen::new(&symbols).generate(&program)
    }

    #[test]
    fn test_arithmetic_and_print() {
        let java = generate("x = 2 + 3 * 4;\ncall print(x);");
        assert!(java.contains("public class CompilerOutput {"));
        assert!(java.contains("Double x;"));
        assert!(java.contains("x = 2.0 + 3.0 * 4.0;"));
        assert!(java.contains("System.out.println(x);"));
    }

    #[test]
    fn test_user_function_signature() {
        let java = generate("square(n) { return n * n; }\ny = square(5);\ncall print(y);");
        assert!(java.contains("public static Double square(Double n) {"));
        assert!(java.contains("return n * n;"));
        assert!(java.contains("y = square(5.0);"));
    }

    #[test]
    fn test_declarations_hoisted_once() {
        let java = generate("x = 1;\nx = x + 1;\nx = x + 2;");
        assert_eq!(java.matches("Double x;").count(), 1);
        assert!(java.contains("x = 1.0;"));
        assert!(java.contains("x = x + 1.0;"));
    }

    #[test]
    fn test_for_loop_emission() {
        let java = generate("s = 0;\nfor (i = 0; i < 5; i = i + 1) { s = s + i; }\ncall print(s);");
        assert!(java.contains("Double s;"));
        assert!(java.contains("Double i;"));
        assert!(java.contains("for (i = 0.0; i < 5.0; i = i + 1.0) {"));
        assert!(java.contains("s = s + i;"));
    }

    #[test]
    fn test_if_else_emission() {
        let java = generate("x = 1;\nif (x < 2) { x = 3; } else { x = 4; }");
        assert!(java.contains("if (x < 2.0) {"));
        assert!(java.contains("} else {"));
    }

    #[test]
    fn test_print_join_with_spaces() {
        let java = generate("a = 1;\nb = 2;\ncall print(a, b + 1, \"end\");");
        assert!(java.contains("System.out.println(a + \" \" + (b + 1.0) + \" \" + \"end\");"));
    }

    #[test]
    fn test_empty_print() {
        let java = generate("call print();");
        assert!(java.contains("System.out.println();"));
    }

    #[test]
    fn test_adapter_emitted_only_when_referenced() {
        let java = generate("x = square(3);\ncall print(x);");
        assert!(java.contains("public static Double square(Double n) {"));
        assert!(!java.contains("public static Double cube"));
    }

    #[test]
    fn test_helper_emitted_for_builtin() {
        let java = generate("x = factorial(5);\ncall print(x);");
        assert!(java.contains("public static Double factorial(Double n) {"));
        assert!(java.contains("static long factorial(long n) {"));
    }

    #[test]
    fn test_direct_builtin_emission() {
        let java = generate("name = get_username();\ncall print(name);");
        assert!(java.contains("name = System.getProperty(\"user.name\");"));
        assert!(!java.contains("public static String get_username"));
    }

    #[test]
    fn test_user_function_shadows_builtin() {
        let java = generate("square(n) { return n + 1; }\nx = square(2);");
        // The user definition wins; no adapter is emitted
        assert_eq!(java.matches("public static Double square(Double n) {").count(), 1);
        assert!(java.contains("return n + 1.0;"));
    }

    #[test]
    fn test_string_index_emission() {
        let java = generate("s = \"abc\";\nc = s[1];\ncall print(c);");
        assert!(java.contains("c = String.valueOf(s.charAt((int) (double) (1.0)));"));
    }

    #[test]
    fn test_logical_operator_grouping() {
        let java = generate("a = 1;\nok = \"\";\nif (a < 1 || a > 2 && a < 4) { a = 2; }");
        // L groups left-to-right; the emitted Java must keep that grouping
        assert!(java.contains("if ((a < 1.0 || a > 2.0) && a < 4.0) {"));
    }

    #[test]
    fn test_parenthesized_arithmetic_survives() {
        let java = generate("x = (1 + 2) * 3;");
        assert!(java.contains("x = (1.0 + 2.0) * 3.0;"));
    }

    #[test]
    fn test_deterministic_output() {
        let source = "f(a) { return a * 2; }\nx = f(2) + factorial(3);\np = is_prime(7);\ncall print(x);";
        let first = generate(source);
        let second = generate(source);
        assert_eq!(first, second);
    }

    #[test]
    fn test_last_duplicate_definition_wins_in_first_position() {
        let java = generate("f() { return 1; }\ng() { return 2; }\nf() { return 3; }");
        let f_pos = java.find("public static Double f()").unwrap();
        let g_pos = java.find("public static Double g()").unwrap();
        assert!(f_pos < g_pos);
        assert!(java.contains("return 3.0;"));
        assert!(!java.contains("return 1.0;"));
    }
}
