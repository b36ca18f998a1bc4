use crate::environment::{EnvRef, Environment};
use crate::evaluator::{EvalError, evaluate};
use crate::lexer::tokenize;
use crate::parser::{ParseError, Parser};
use crate::types::Object;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// One interpreter session. Sessions never share state: each owns its own
/// global environment.
pub struct Interpreter {
    global_env: EnvRef,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            global_env: Environment::new_global_populated(),
        }
    }

    pub fn global_env(&self) -> &EnvRef {
        &self.global_env
    }

    /// Reads and evaluates every top-level form in `source`, in order.
    /// Returns the value of the last one, or `None` if there was nothing to
    /// evaluate. The first error stops the run; definitions made before it
    /// stay in place.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn eval_source(&mut self, source: &str) -> Result<Option<Object>, Error> {
        let tokens = tokenize(source);
        let mut last = None;
        let mut forms = 0usize;
        for node in Parser::new(&tokens) {
            let node = node?;
            last = Some(evaluate(&node, &self.global_env)?);
            forms += 1;
        }
        tracing::debug!(tokens = tokens.len(), forms, "evaluated source");
        Ok(last)
    }

    /// Evaluates a whole file against the global environment. Returns the
    /// file text alongside the result so callers can report errors against it.
    pub fn load_file(&mut self, path: &Path) -> (String, Result<Option<Object>, Error>) {
        tracing::info!(path = %path.display(), "loading file");
        match fs::read_to_string(path) {
            Ok(source) => {
                let result = self.eval_source(&source);
                (source, result)
            }
            Err(source) => (
                String::new(),
                Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                }),
            ),
        }
    }
}
