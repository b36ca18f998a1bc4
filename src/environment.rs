use crate::source::Span;
use crate::types::{Builtin, Object, Procedure};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

// --- Environment Error ---
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("unknown name - {0:?}")]
    UnboundName(String, Span), // Symbol name, span where lookup happened
}

impl EnvError {
    pub fn span(&self) -> Span {
        match self {
            EnvError::UnboundName(_, span) => *span,
        }
    }
}

// --- Environment Definition ---

/// Frames are shared: a lambda keeps its defining frame alive after the call
/// that created it returns.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    outer: Option<EnvRef>,
    bindings: HashMap<String, Object>,
}

impl Environment {
    /// Creates a new, top-level (global) environment.
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Creates the root environment with every builtin installed. Each call
    /// returns an independent chain.
    pub fn new_global_populated() -> EnvRef {
        let env_ptr = Environment::new();
        {
            let mut env = env_ptr.borrow_mut();
            for builtin in crate::primitives::builtins() {
                env.add_builtin(builtin);
            }
        }
        env_ptr
    }

    /// Creates a new environment enclosed within an outer one.
    pub fn new_enclosed(outer_env: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            outer: Some(outer_env),
            bindings: HashMap::new(),
        }))
    }

    /// Returns the innermost frame, starting at `env`, that binds `name`.
    pub fn find(env: &EnvRef, name: &str) -> Option<EnvRef> {
        let mut current = Rc::clone(env);
        loop {
            if current.borrow().bindings.contains_key(name) {
                return Some(current);
            }
            let outer = current.borrow().outer.clone()?;
            current = outer;
        }
    }

    /// Returns the value bound to `name` in this frame only.
    pub fn get(&self, name: &str) -> Option<Object> {
        self.bindings.get(name).cloned()
    }

    /// Binds `name` in this frame, replacing any existing binding here.
    /// Never touches outer frames.
    pub fn set(&mut self, name: impl Into<String>, value: Object) {
        self.bindings.insert(name.into(), value);
    }

    /// Resolves `name` through the chain. `lookup_span` is where the name
    /// was referenced, used for error reporting.
    pub fn lookup(env: &EnvRef, name: &str, lookup_span: Span) -> Result<Object, EnvError> {
        let value = Environment::find(env, name).and_then(|frame| {
            let value = frame.borrow().get(name);
            value
        });
        value.ok_or_else(|| EnvError::UnboundName(name.to_string(), lookup_span))
    }

    fn add_builtin(&mut self, builtin: Builtin) {
        self.set(builtin.name, Object::Procedure(Procedure::Builtin(builtin)));
    }

    fn add_identifiers(&self, mut identifiers: HashSet<String>) -> HashSet<String> {
        identifiers.extend(self.bindings.keys().cloned());
        match self.outer {
            Some(ref outer_env_ptr) => outer_env_ptr.borrow().add_identifiers(identifiers),
            None => identifiers,
        }
    }

    /// Gets every identifier visible from this frame
    pub fn get_identifiers(&self) -> HashSet<String> {
        self.add_identifiers(HashSet::new())
    }
}
