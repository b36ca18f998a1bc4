use crate::environment::{EnvError, EnvRef, Environment};
use crate::source::Span;
use crate::types::{Callable, Expr, Lambda, Node, Object, Procedure};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

// --- Evaluation Error ---
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Env(#[from] EnvError), // Unbound names, from lookup and set!
    #[error("empty list expression")]
    EmptyApplication(Span),
    #[error("malformed '{form}' - {message}")]
    MalformedSpecialForm {
        form: SpecialForm,
        message: String,
        span: Span,
    },
    #[error("{found} is not callable")]
    NotCallable { found: String, span: Span },
    #[error("{name} - wrong number of arguments (want {expected}, got {found})")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("{name} - argument {position}: expected a number, got {found}")]
    TypeMismatch {
        name: String,
        position: usize,
        found: &'static str,
        span: Span,
    },
    #[error("{name} - division by zero")]
    DivisionByZero { name: String, span: Span },
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::Env(env_error) => env_error.span(),
            EvalError::EmptyApplication(span)
            | EvalError::MalformedSpecialForm { span, .. }
            | EvalError::NotCallable { span, .. }
            | EvalError::ArityMismatch { span, .. }
            | EvalError::TypeMismatch { span, .. }
            | EvalError::DivisionByZero { span, .. } => *span,
        }
    }
}

// Result type alias for convenience
pub type EvalResult<T = Object> = Result<T, EvalError>;

// --- Special Forms ---

/// Keywords evaluated by their own rules instead of ordinary application.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpecialForm {
    Define,
    Set,
    If,
    Or,
    And,
    Lambda,
}

impl SpecialForm {
    pub const ALL: [SpecialForm; 6] = [
        SpecialForm::Define,
        SpecialForm::Set,
        SpecialForm::If,
        SpecialForm::Or,
        SpecialForm::And,
        SpecialForm::Lambda,
    ];

    pub fn from_symbol(name: &str) -> Option<Self> {
        SpecialForm::ALL
            .into_iter()
            .find(|form| form.keyword() == name)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SpecialForm::Define => "define",
            SpecialForm::Set => "set!",
            SpecialForm::If => "if",
            SpecialForm::Or => "or",
            SpecialForm::And => "and",
            SpecialForm::Lambda => "lambda",
        }
    }
}

impl fmt::Display for SpecialForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

pub fn special_form_identifiers() -> HashSet<String> {
    SpecialForm::ALL
        .iter()
        .map(|form| form.keyword().to_string())
        .collect()
}

// --- Evaluate Function ---

/// Evaluates a given AST Node within the specified environment.
pub fn evaluate(node: &Node, env: &EnvRef) -> EvalResult {
    match &node.kind {
        Expr::Number(n) => Ok(Object::Number(*n)),

        // Use the symbol's span for error reporting if lookup fails
        Expr::Symbol(name) => Ok(Environment::lookup(env, name, node.span)?),

        Expr::List(elements) => match &elements[..] {
            [] => Err(EvalError::EmptyApplication(node.span)),
            [first, rest @ ..] => {
                // Keywords are syntax: dispatch before evaluating the head
                if let Expr::Symbol(name) = &first.kind
                    && let Some(form) = SpecialForm::from_symbol(name)
                {
                    return evaluate_special_form(form, rest, env, node.span);
                }
                evaluate_procedure(first, rest, env, node.span)
            }
        },
    }
}

fn evaluate_special_form(
    form: SpecialForm,
    operands: &[Node],
    env: &EnvRef,
    span: Span,
) -> EvalResult {
    match form {
        SpecialForm::Define => evaluate_define(operands, env, span),
        SpecialForm::Set => evaluate_set(operands, env, span),
        SpecialForm::If => evaluate_if(operands, env, span),
        SpecialForm::Or => evaluate_or(operands, env),
        SpecialForm::And => evaluate_and(operands, env),
        SpecialForm::Lambda => evaluate_lambda(operands, env, span),
    }
}

fn malformed(form: SpecialForm, message: &str, span: Span) -> EvalError {
    EvalError::MalformedSpecialForm {
        form,
        message: message.to_string(),
        span,
    }
}

// Splits `(form name value)` into its symbol name and value expression.
fn expect_binding<'a>(
    form: SpecialForm,
    operands: &'a [Node],
    span: Span,
) -> EvalResult<(&'a str, &'a Node)> {
    match operands {
        [
            Node {
                kind: Expr::Symbol(name),
                ..
            },
            value,
        ] => Ok((name.as_str(), value)),
        [_, _] => Err(malformed(form, "bad name", span)),
        _ => Err(malformed(form, "expects a name and a value", span)),
    }
}

fn evaluate_define(operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    // (define n 27)
    let (name, value_node) = expect_binding(SpecialForm::Define, operands, span)?;
    let value = evaluate(value_node, env)?;
    env.borrow_mut().set(name, value.clone());
    Ok(value)
}

fn evaluate_set(operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    // (set! n 27)
    let (name, value_node) = expect_binding(SpecialForm::Set, operands, span)?;
    let owner = Environment::find(env, name)
        .ok_or_else(|| EnvError::UnboundName(name.to_string(), operands[0].span))?;
    // The right-hand side sees the caller's scope, not the owner's
    let value = evaluate(value_node, env)?;
    owner.borrow_mut().set(name, value.clone());
    Ok(value)
}

fn evaluate_if(operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    // (if (< x 0) 0 x)
    let [condition, consequent, alternate] = operands else {
        return Err(malformed(
            SpecialForm::If,
            "expects condition, consequent, and alternate",
            span,
        ));
    };
    // Only the number 1 selects the consequent
    match evaluate(condition, env)? {
        Object::Number(n) if n == 1.0 => evaluate(consequent, env),
        _ => evaluate(alternate, env),
    }
}

fn evaluate_or(operands: &[Node], env: &EnvRef) -> EvalResult {
    // (or), (or 0 1)
    for operand in operands {
        let value = evaluate(operand, env)?;
        if value.is_truthy() {
            return Ok(value);
        }
    }
    Ok(Object::Number(0.0))
}

fn evaluate_and(operands: &[Node], env: &EnvRef) -> EvalResult {
    // (and), (and 0 1)
    let mut last = Object::Number(1.0);
    for operand in operands {
        last = evaluate(operand, env)?;
        if !last.is_truthy() {
            return Ok(last);
        }
    }
    Ok(last)
}

fn evaluate_lambda(operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    // (lambda (n) (+ n 1))
    let [
        Node {
            kind: Expr::List(param_nodes),
            ..
        },
        body,
    ] = operands
    else {
        return Err(malformed(
            SpecialForm::Lambda,
            "expects a parameter list and a body",
            span,
        ));
    };
    let params = param_nodes
        .iter()
        .map(|param| match &param.kind {
            Expr::Symbol(name) => Ok(name.clone()),
            _ => Err(malformed(
                SpecialForm::Lambda,
                &format!("parameter {} is not a symbol", param),
                param.span,
            )),
        })
        .collect::<EvalResult<Vec<String>>>()?;

    Ok(Object::Procedure(Procedure::Lambda(Rc::new(Lambda {
        params,
        body: body.clone(),
        env: Rc::clone(env),
    }))))
}

fn evaluate_procedure(operator: &Node, operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    // 1. Evaluate the operator and check it is a procedure
    let procedure = match evaluate(operator, env)? {
        Object::Procedure(procedure) => procedure,
        other => {
            return Err(EvalError::NotCallable {
                found: other.to_string(),
                span: operator.span,
            });
        }
    };

    // 2. Evaluate the operands, strictly left to right
    let args = operands
        .iter()
        .map(|operand| evaluate(operand, env))
        .collect::<EvalResult<Vec<Object>>>()?;

    // 3. Apply the procedure
    procedure.call(args, span)
}

impl Callable for Lambda {
    fn call(&self, args: Vec<Object>, span: Span) -> EvalResult<Object> {
        if args.len() != self.params.len() {
            return Err(EvalError::ArityMismatch {
                name: "lambda".to_string(),
                expected: self.params.len(),
                found: args.len(),
                span,
            });
        }
        // One fresh frame per call, enclosed by the captured environment
        let frame = Environment::new_enclosed(Rc::clone(&self.env));
        {
            let mut bindings = frame.borrow_mut();
            for (param, arg) in self.params.iter().zip(args) {
                bindings.set(param.as_str(), arg);
            }
        }
        evaluate(&self.body, &frame)
    }
}
