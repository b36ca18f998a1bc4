use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use humble::evaluator::special_form_identifiers;
use humble::{EnvRef, Interpreter, TokenKind, logging, tokenize};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{
    Cmd, Completer, Context, EditMode, Editor, EventHandler, KeyCode, KeyEvent, Modifiers,
};
use rustyline::{Helper, Highlighter, Hinter, Validator};

/// Interactive Humble lisp session.
#[derive(Parser)]
#[command(author, version, about = "Humble lisp REPL")]
struct Args {
    /// Files evaluated before the first prompt
    prelude: Vec<PathBuf>,
    /// Where line history is kept between sessions
    #[arg(long, default_value = "humble_history.txt")]
    history: PathBuf,
    /// Neither load nor save line history
    #[arg(long)]
    no_history: bool,
    /// Use vi key bindings instead of emacs
    #[arg(long)]
    vi: bool,
}

struct HumbleCompleter {
    env: EnvRef,
}

impl HumbleCompleter {
    fn new(env: EnvRef) -> Self {
        HumbleCompleter { env }
    }
}

impl rustyline::completion::Completer for HumbleCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        // Only complete an atom that ends right at the cursor
        let prefix = match tokenize(&line[..pos]).pop() {
            Some(token) if token.span.end == pos => match token.kind {
                TokenKind::Atom(prefix) => prefix,
                _ => return Ok((pos, vec![])),
            },
            _ => return Ok((pos, vec![])),
        };
        let mut candidates: Vec<String> = self
            .env
            .borrow()
            .get_identifiers()
            .union(&special_form_identifiers())
            .filter_map(|id| id.strip_prefix(prefix.as_str()).map(str::to_string))
            .filter(|suffix| !suffix.is_empty())
            .collect();
        candidates.sort();
        Ok((pos, candidates))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputHelper {
    #[rustyline(Validator)]
    validator: ParenValidator,
    #[rustyline(Highlighter)]
    highlighter: ParenHighlighter,
    #[rustyline(Completer)]
    completer: HumbleCompleter,
}

/// Keeps reading lines while a '(' is open; rejects a stray ')'.
struct ParenValidator;

impl Validator for ParenValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let mut depth = 0usize;
        for (i, c) in ctx.input().char_indices() {
            match c {
                '(' => depth += 1,
                ')' if depth == 0 => {
                    return Ok(ValidationResult::Invalid(Some(format!(
                        "  - Unexpected ')' at position {}",
                        i
                    ))));
                }
                ')' => depth -= 1,
                _ => {}
            }
        }
        if depth > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Shows the pair of parens next to the cursor in blue and stray ')' in red.
struct ParenHighlighter;

impl Highlighter for ParenHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        let mut open = Vec::new();
        let mut pairs = Vec::new();
        let mut stray = Vec::new();
        for (i, c) in line.char_indices() {
            match c {
                '(' => open.push(i),
                ')' => match open.pop() {
                    Some(start) => pairs.push((start, i)),
                    None => stray.push(i),
                },
                _ => {}
            }
        }
        let active = pairs
            .into_iter()
            .find(|&(start, end)| pos == start + 1 || pos == end + 1);
        if active.is_none() && stray.is_empty() {
            return Cow::Borrowed(line);
        }

        let mut highlighted = String::with_capacity(line.len() + 16);
        for (i, c) in line.char_indices() {
            if stray.contains(&i) {
                // Red for unmatched closing parens
                highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c));
            } else if active.is_some_and(|(start, end)| i == start || i == end) {
                // Blue for the matching pair
                highlighted.push_str(&format!("\x1b[1;34m{}\x1b[0m", c));
            } else {
                highlighted.push(c);
            }
        }
        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn load_prelude(interpreter: &mut Interpreter, path: &Path) {
    let name = path.display().to_string();
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: failed to read {}: {}", name, e);
            return;
        }
    };
    if let Err(e) = interpreter.eval_source(&source)
        && e.report(&name, &source).is_err()
    {
        eprintln!("Error: {}", e);
    }
}

fn main() -> rustyline::Result<()> {
    logging::init_tracing();
    let args = Args::parse();

    println!("Welcome to Humble lisp (hit CTRL-D to quit)");

    let mut interpreter = Interpreter::new();
    for path in &args.prelude {
        load_prelude(&mut interpreter, path);
    }

    let helper = InputHelper {
        highlighter: ParenHighlighter,
        validator: ParenValidator,
        completer: HumbleCompleter::new(interpreter.global_env().clone()),
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(if args.vi { EditMode::Vi } else { EditMode::Emacs })
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if !args.no_history && let Err(e) = rl.load_history(&args.history) {
        tracing::debug!(error = %e, path = %args.history.display(), "no previous history");
    }

    loop {
        match rl.readline("» ") {
            Ok(line) => {
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed_input)?;
                if trimmed_input.eq_ignore_ascii_case("exit") {
                    break;
                }

                match interpreter.eval_source(trimmed_input) {
                    Ok(Some(value)) => println!("{}", value),
                    Ok(None) => {}
                    Err(e) => {
                        if e.report("REPL", trimmed_input).is_err() {
                            eprintln!("Error: {}", e);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }

    println!("\nkthxbai ☺");
    if !args.no_history && let Err(e) = rl.save_history(&args.history) {
        tracing::debug!(error = %e, path = %args.history.display(), "failed to save history");
    }
    Ok(())
}
