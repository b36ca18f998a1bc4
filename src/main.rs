use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use humble::{Error, Interpreter, Object, logging};

/// Runs Humble lisp programs.
#[derive(Parser)]
#[command(author, version, about = "Humble lisp script runner")]
struct Args {
    /// Files to load, in order, into one session
    files: Vec<PathBuf>,
    /// Expression to evaluate after the files are loaded
    #[arg(short, long, value_name = "EXPR")]
    eval: Option<String>,
    /// Print the value of the last form of each file
    #[arg(short, long)]
    print: bool,
}

fn print_value(value: Option<Object>) {
    if let Some(value) = value {
        println!("{}", value);
    }
}

// Reports the error against the text it came from.
fn fail(error: Error, name: &str, source: &str) -> ExitCode {
    if let Err(io_error) = error.report(name, source) {
        eprintln!("Error: {} ({})", error, io_error);
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    logging::init_tracing();
    let args = Args::parse();
    let mut interpreter = Interpreter::new();

    for path in &args.files {
        let name = path.display().to_string();
        let (source, result) = interpreter.load_file(path);
        match result {
            Ok(value) if args.print => print_value(value),
            Ok(_) => {}
            Err(error) => return fail(error, &name, &source),
        }
    }

    if let Some(expr) = &args.eval {
        match interpreter.eval_source(expr) {
            Ok(value) => print_value(value),
            Err(error) => return fail(error, "eval", expr),
        }
    } else if args.files.is_empty() {
        let mut source = String::new();
        if let Err(source_error) = io::stdin().read_to_string(&mut source) {
            eprintln!("Error: failed to read stdin: {}", source_error);
            return ExitCode::FAILURE;
        }
        match interpreter.eval_source(&source) {
            Ok(value) => print_value(value),
            Err(error) => return fail(error, "stdin", &source),
        }
    }

    ExitCode::SUCCESS
}
