//! End-to-end compilation scenarios

use ljc::utils::DiagnosticKind;
use ljc::{compile, compile_source};

#[test]
fn arithmetic_and_print() {
    let output = compile_source("x = 2 + 3 * 4;\ncall print(x);");
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let java = output.java.unwrap();
    assert!(java.contains("Double x;"));
    assert!(java.contains("x = 2.0 + 3.0 * 4.0;"));
    assert!(java.contains("System.out.println(x);"));
}

#[test]
fn user_function_with_return() {
    let output = compile_source("square(n) { return n * n; }\ny = square(5);\ncall print(y);");
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let java = output.java.unwrap();
    assert!(java.contains("public static Double square(Double n) {"));
    assert!(java.contains("return n * n;"));
    assert!(java.contains("y = square(5.0);"));
    assert!(java.contains("System.out.println(y);"));
}

#[test]
fn type_mismatch_in_call() {
    let output = compile_source("f(a) { return a + 1; }\ncall f(\"hello\");");
    assert!(output.java.is_none());
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(
        output.diagnostics[0].to_string(),
        "Error at line 2, column 8: Type mismatch in argument 1 of function 'f'. Expected Double, got String"
    );
}

#[test]
fn undefined_function() {
    let report = compile("call mystery(1);");
    assert_eq!(
        report,
        "Compilation failed due to the following errors:\n\
         Error at line 1, column 6: Undefined function 'mystery'\n"
    );
}

#[test]
fn if_and_for_control_flow() {
    let source = "s = 0;\nfor (i = 0; i < 5; i = i + 1) { s = s + i; }\ncall print(s);";
    let output = compile_source(source);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let java = output.java.unwrap();
    assert!(java.contains("Double s;"));
    assert!(java.contains("Double i;"));
    assert!(java.contains("for (i = 0.0; i < 5.0; i = i + 1.0) {"));
    assert!(java.contains("s = s + i;"));
    assert!(java.contains("System.out.println(s);"));
}

#[test]
fn unterminated_string_reported_first() {
    let output = compile_source("msg = \"hello;");
    assert!(output.java.is_none());
    assert!(!output.diagnostics.is_empty());
    // The lexical diagnostic leads the report regardless of what the later
    // stages add
    assert_eq!(
        output.diagnostics[0].to_string(),
        "Error at line 1, column 7: Unterminated string literal"
    );
}

#[test]
fn compilation_is_deterministic() {
    let source = "double_it(n) { return n * 2; }\n\
                  Double x;\n\
                  x = double_it(21);\n\
                  if (x > 10 && x < 100) { call print(x, \"ok\"); } else { call print(x); }";
    assert_eq!(compile(source), compile(source));
}

#[test]
fn builtin_adapters_and_helpers() {
    let output = compile_source("x = factorial(5);\ns = uppercase(\"abc\");\ncall print(x, s);");
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let java = output.java.unwrap();
    assert!(java.contains("public static Double factorial(Double n) {"));
    assert!(java.contains("static long factorial(long n) {"));
    assert!(java.contains("public static String uppercase(String s) {"));
    // Unreferenced built-ins stay out of the output
    assert!(!java.contains("public static Double cube"));
}

#[test]
fn declarations_and_assignments_are_split() {
    let output = compile_source("Double x;\nx = 3;\nString s;\ns = \"hi\";");
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let java = output.java.unwrap();
    assert_eq!(java.matches("Double x;").count(), 1);
    assert_eq!(java.matches("String s;").count(), 1);
    assert!(java.contains("x = 3.0;"));
    assert!(java.contains("s = \"hi\";"));
}

#[test]
fn report_concatenates_stages_in_order() {
    // line 1: semantic (undefined variable), line 2: lexical, line 3: syntax
    let output = compile_source("x = missing;\ny = 1 @ 2;\nz = ;");
    assert!(output.java.is_none());
    let kinds: Vec<_> = output.diagnostics.iter().map(|d| &d.kind).collect();
    let lex_pos = kinds
        .iter()
        .position(|k| matches!(k, DiagnosticKind::UnexpectedCharacter('@')))
        .unwrap();
    let sem_pos = kinds
        .iter()
        .position(|k| matches!(k, DiagnosticKind::UndefinedVariable { .. }))
        .unwrap();
    assert!(lex_pos < sem_pos, "lexical diagnostics come before semantic");
}

#[test]
fn tokens_are_exposed_for_tooling() {
    let output = compile_source("x = 1;");
    let lexemes: Vec<&str> = output.tokens.iter().map(|t| t.lexeme.as_str()).collect();
    assert_eq!(lexemes, vec!["x", "=", "1", ";"]);
}
