use crate::environment::EnvRef;
use crate::evaluator::EvalResult;
use crate::source::Span;
use std::fmt; // For custom display formatting
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: Expr, // The syntax node
    pub span: Span, // The source span it covers
}

impl Node {
    pub fn new(kind: Expr, span: Span) -> Self {
        Node { kind, span }
    }

    pub fn new_number(n: f64, span: Span) -> Self {
        Node::new(Expr::Number(n), span)
    }

    pub fn new_symbol(name: impl Into<String>, span: Span) -> Self {
        Node::new(Expr::Symbol(name.into()), span)
    }

    pub fn new_list(children: Vec<Node>, span: Span) -> Self {
        Node::new(Expr::List(children), span)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Delegate to Expr's Display implementation
        write!(f, "{}", self.kind)
    }
}

/// Syntax produced by the reader. Never mutated during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),     // 3.14
    Symbol(String),  // pi, +, set!
    List(Vec<Node>), // (* 4 5), () is legal syntax
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::List(children) => {
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Number(f64),
    Procedure(Procedure),
}

impl Object {
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Number(_) => "number",
            Object::Procedure(Procedure::Builtin(_)) => "builtin",
            Object::Procedure(Procedure::Lambda(_)) => "lambda",
        }
    }

    /// Truthiness used by `or` and `and`: zero is false, everything else
    /// (procedures included) is true. `if` uses its own rule.
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Number(n) => *n != 0.0,
            Object::Procedure(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Object::Number(n) => Some(*n),
            Object::Procedure(_) => None,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Number(n) => write!(f, "{}", n),
            Object::Procedure(procedure) => write!(f, "{}", procedure),
        }
    }
}

/// Anything that can sit at the head of an application.
pub trait Callable {
    /// Applies the callable to already-evaluated arguments. `span` is the
    /// whole application, used for error reporting.
    fn call(&self, args: Vec<Object>, span: Span) -> EvalResult<Object>;
}

#[derive(Debug, Clone)]
pub enum Procedure {
    Builtin(Builtin),
    Lambda(Rc<Lambda>),
}

impl Callable for Procedure {
    fn call(&self, args: Vec<Object>, span: Span) -> EvalResult<Object> {
        match self {
            Procedure::Builtin(builtin) => builtin.call(args, span),
            Procedure::Lambda(lambda) => lambda.call(args, span),
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Procedure::Builtin(builtin) => write!(f, "#<builtin:{}>", builtin.name),
            Procedure::Lambda(lambda) => write!(f, "{}", lambda),
        }
    }
}

// Builtins compare by name, lambdas by identity.
impl PartialEq for Procedure {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Procedure::Builtin(a), Procedure::Builtin(b)) => a.name == b.name,
            (Procedure::Lambda(a), Procedure::Lambda(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

pub type PrimitiveFunc = fn(Vec<Object>, Span) -> EvalResult<Object>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Arity {
    Variadic,
    Exactly(usize),
}

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub func: PrimitiveFunc,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({}, {:?})", self.name, self.arity)
    }
}

/// A user procedure: parameters, one body expression, and the frame that
/// was active when the `lambda` form was evaluated.
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Node,
    pub env: EnvRef,
}

// The captured environment can hold this very lambda, so Debug must not
// walk into it.
impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(lambda ({}) {})", self.params.join(" "), self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;

    fn sym(s: &str) -> Node {
        Node::new_symbol(s, Span::default())
    }

    fn num(n: f64) -> Node {
        Node::new_number(n, Span::default())
    }

    #[test]
    fn test_expr_display() {
        let node = Node::new_list(
            vec![sym("+"), num(1.0), Node::new_list(vec![sym("f"), num(2.5)], Span::default())],
            Span::default(),
        );
        assert_eq!(node.to_string(), "(+ 1 (f 2.5))");
        assert_eq!(Node::new_list(vec![], Span::default()).to_string(), "()");
    }

    #[test]
    fn test_object_display() {
        assert_eq!(Object::Number(7.0).to_string(), "7");
        assert_eq!(Object::Number(3.5).to_string(), "3.5");
        assert_eq!(Object::Number(-0.25).to_string(), "-0.25");

        let lambda = Lambda {
            params: vec!["n".to_string(), "m".to_string()],
            body: Node::new_list(vec![sym("+"), sym("n"), sym("m")], Span::default()),
            env: Environment::new(),
        };
        let object = Object::Procedure(Procedure::Lambda(Rc::new(lambda)));
        assert_eq!(object.to_string(), "(lambda (n m) (+ n m))");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Object::Number(0.0).is_truthy());
        assert!(!Object::Number(-0.0).is_truthy());
        assert!(Object::Number(2.0).is_truthy());
        assert!(Object::Number(-1.0).is_truthy());

        let lambda = Lambda {
            params: vec![],
            body: num(0.0),
            env: Environment::new(),
        };
        assert!(Object::Procedure(Procedure::Lambda(Rc::new(lambda))).is_truthy());
    }

    #[test]
    fn test_lambda_equality_is_identity() {
        let make = || {
            Rc::new(Lambda {
                params: vec![],
                body: num(1.0),
                env: Environment::new(),
            })
        };
        let a = make();
        let b = make();
        assert_eq!(Procedure::Lambda(a.clone()), Procedure::Lambda(a.clone()));
        assert_ne!(Procedure::Lambda(a), Procedure::Lambda(b));
    }
}
