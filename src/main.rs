//! ljc - L to Java source compiler CLI
//!
//! Reads one L source file, writes the generated Java (or prints the error
//! report). The pipeline core lives in the library; this binary only does
//! argument parsing and file I/O.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ljc::frontend::token::dump_tokens;
use ljc::utils::FileLog;

/// L Compiler
#[derive(Parser, Debug)]
#[command(name = "ljc")]
#[command(version = "0.1.0")]
#[command(about = "Compiles L programs to Java source")]
struct Cli {
    /// Input source file
    #[arg(value_name = "FILE", default_value = "input.txt")]
    input: PathBuf,

    /// Output file for the generated Java
    #[arg(short, long, value_name = "FILE", default_value = "CompilerOutput.java")]
    output: PathBuf,

    /// Also write the token dump to tokens.txt
    #[arg(long)]
    emit_tokens: bool,

    /// Append every diagnostic to this log file
    #[arg(long, value_name = "FILE")]
    error_log: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading {}: {}", cli.input.display(), err);
            return ExitCode::from(2);
        }
    };

    let output = match &cli.error_log {
        Some(path) => {
            let mut sink = FileLog::new(path);
            ljc::compile_with_sink(&source, &mut sink)
        }
        None => ljc::compile_source(&source),
    };

    if cli.emit_tokens {
        if let Err(err) = fs::write("tokens.txt", dump_tokens(&output.tokens)) {
            eprintln!("Error writing tokens.txt: {}", err);
            return ExitCode::from(2);
        }
    }

    if !output.succeeded() {
        eprint!("{}", output.report());
        return ExitCode::from(1);
    }

    let java = output.report();
    if let Err(err) = fs::write(&cli.output, &java) {
        eprintln!("Error writing {}: {}", cli.output.display(), err);
        return ExitCode::from(2);
    }
    log::info!("compilation complete, output written to {}", cli.output.display());
    println!("{}", java);
    ExitCode::SUCCESS
}
