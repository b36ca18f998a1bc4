use crate::{EnvError, Error, EvalError, ParseError};
use ariadne::{Label, Report, ReportKind, Source};
use std::io;

impl EvalError {
    /// Prints an error report labelled against `input` to stderr. `name`
    /// identifies the source (a file path or "REPL").
    pub fn report(&self, name: &str, input: &str) -> io::Result<()> {
        let span = self.span().to_range();
        let builder = Report::build(ReportKind::Error, (name, span.clone()));
        let report = match self {
            EvalError::Env(EnvError::UnboundName(symbol, _)) => builder
                .with_message(format!("Unknown name `{}`", symbol))
                .with_label(
                    Label::new((name, span))
                        .with_message("This name is not bound in any enclosing scope"),
                ),
            EvalError::EmptyApplication(_) => builder
                .with_message("Empty list expression")
                .with_label(Label::new((name, span)).with_message("There is nothing to call here")),
            EvalError::MalformedSpecialForm { form, message, .. } => builder
                .with_message(format!("Malformed `{}`", form))
                .with_label(Label::new((name, span)).with_message(message)),
            EvalError::NotCallable { found, .. } => builder
                .with_message(format!("Not callable: {}", found))
                .with_label(
                    Label::new((name, span))
                        .with_message("This expression cannot be called as a procedure"),
                ),
            EvalError::ArityMismatch {
                name: callee,
                expected,
                found,
                ..
            } => builder
                .with_message(format!("Wrong number of arguments for `{}`", callee))
                .with_label(
                    Label::new((name, span))
                        .with_message(format!("Expected {}, got {}", expected, found)),
                ),
            EvalError::TypeMismatch {
                name: callee,
                position,
                found,
                ..
            } => builder
                .with_message(format!("Type mismatch in `{}`", callee))
                .with_label(Label::new((name, span)).with_message(format!(
                    "Argument {} should be a number, found {}",
                    position, found
                ))),
            EvalError::DivisionByZero { name: callee, .. } => builder
                .with_message(format!("Division by zero in `{}`", callee))
                .with_label(Label::new((name, span)).with_message("The divisor is zero")),
        };
        report.finish().eprint((name, Source::from(input)))
    }
}

impl ParseError {
    pub fn report(&self, name: &str, input: &str) -> io::Result<()> {
        let report = match self {
            ParseError::UnexpectedEndOfInput => {
                let idx = input.len();
                Report::build(ReportKind::Error, (name, idx..idx))
                    .with_message("Unexpected end of input")
                    .with_label(Label::new((name, idx..idx)).with_message("Expected an expression"))
            }
            ParseError::UnexpectedCloseParen(span) => {
                Report::build(ReportKind::Error, (name, span.to_range()))
                    .with_message("Unexpected ')'")
                    .with_label(
                        Label::new((name, span.to_range()))
                            .with_message("This paren closes nothing"),
                    )
            }
            ParseError::UnbalancedExpression(span) => {
                Report::build(ReportKind::Error, (name, span.to_range()))
                    .with_message("Unbalanced expression")
                    .with_label(
                        Label::new((name, span.to_range()))
                            .with_message("This paren is never closed"),
                    )
            }
        };
        report.finish().eprint((name, Source::from(input)))
    }
}

impl Error {
    pub fn report(&self, name: &str, input: &str) -> io::Result<()> {
        match self {
            Error::Parse(parse_error) => parse_error.report(name, input),
            Error::Eval(eval_error) => eval_error.report(name, input),
            Error::Io { .. } => {
                eprintln!("Error: {}", self);
                Ok(())
            }
        }
    }
}
