use crate::evaluator::{EvalError, EvalResult};
use crate::source::Span;
use crate::types::{Arity, Builtin, Callable, Object};

/// The builtin table installed into every root environment.
pub fn builtins() -> [Builtin; 8] {
    [
        builtin("+", Arity::Variadic, prim_add),
        builtin("*", Arity::Variadic, prim_mul),
        builtin("-", Arity::Exactly(2), prim_sub),
        builtin("/", Arity::Exactly(2), prim_div),
        builtin("%", Arity::Exactly(2), prim_rem),
        builtin("<", Arity::Exactly(2), prim_less_than),
        builtin("eq?", Arity::Exactly(2), prim_equals),
        builtin("begin", Arity::Variadic, prim_begin),
    ]
}

fn builtin(name: &'static str, arity: Arity, func: crate::types::PrimitiveFunc) -> Builtin {
    Builtin { name, arity, func }
}

impl Callable for Builtin {
    fn call(&self, args: Vec<Object>, span: Span) -> EvalResult<Object> {
        if let Arity::Exactly(expected) = self.arity
            && args.len() != expected
        {
            return Err(EvalError::ArityMismatch {
                name: self.name.to_string(),
                expected,
                found: args.len(),
                span,
            });
        }
        (self.func)(args, span)
    }
}

// Extracts every argument as a number, or reports the first that isn't one.
fn expect_numbers(args: &[Object], span: Span, name: &str) -> EvalResult<Vec<f64>> {
    args.iter()
        .enumerate()
        .map(|(i, arg)| {
            arg.as_number().ok_or_else(|| EvalError::TypeMismatch {
                name: name.to_string(),
                position: i + 1,
                found: arg.type_name(),
                span,
            })
        })
        .collect()
}

// `Builtin::call` has already checked the count; the arity arm only fires
// when a `prim_*` function is called directly.
fn expect_two_numbers(args: &[Object], span: Span, name: &str) -> EvalResult<(f64, f64)> {
    let numbers = expect_numbers(args, span, name)?;
    match numbers.as_slice() {
        [left, right] => Ok((*left, *right)),
        other => Err(EvalError::ArityMismatch {
            name: name.to_string(),
            expected: 2,
            found: other.len(),
            span,
        }),
    }
}

fn fold_numbers<F: Fn(f64, f64) -> f64>(
    args: Vec<Object>,
    span: Span,
    start: f64,
    func: F,
    operator: &str,
) -> EvalResult<Object> {
    let numbers = expect_numbers(&args, span, operator)?;
    Ok(Object::Number(numbers.into_iter().fold(start, func)))
}

fn boolean(value: bool) -> Object {
    Object::Number(if value { 1.0 } else { 0.0 })
}

pub fn prim_add(args: Vec<Object>, span: Span) -> EvalResult<Object> {
    // (+) -> 0
    // (+ 1 2 3) -> 6
    fold_numbers(args, span, 0.0, |acc, val| acc + val, "+")
}

pub fn prim_mul(args: Vec<Object>, span: Span) -> EvalResult<Object> {
    // (*) -> 1
    // (* 1 2 3) -> 6
    fold_numbers(args, span, 1.0, |acc, val| acc * val, "*")
}

pub fn prim_sub(args: Vec<Object>, span: Span) -> EvalResult<Object> {
    let (left, right) = expect_two_numbers(&args, span, "-")?;
    Ok(Object::Number(left - right))
}

pub fn prim_div(args: Vec<Object>, span: Span) -> EvalResult<Object> {
    let (left, right) = expect_two_numbers(&args, span, "/")?;
    if right == 0.0 {
        return Err(EvalError::DivisionByZero {
            name: "/".to_string(),
            span,
        });
    }
    Ok(Object::Number(left / right))
}

pub fn prim_rem(args: Vec<Object>, span: Span) -> EvalResult<Object> {
    // Both operands are truncated first: (% 7.9 2.5) -> (% 7 2) -> 1
    let (left, right) = expect_two_numbers(&args, span, "%")?;
    if left.is_nan() || right.is_nan() {
        return Ok(Object::Number(f64::NAN));
    }
    let (left, right) = (left.trunc() as i64, right.trunc() as i64);
    if right == 0 {
        return Err(EvalError::DivisionByZero {
            name: "%".to_string(),
            span,
        });
    }
    Ok(Object::Number(left.wrapping_rem(right) as f64))
}

pub fn prim_less_than(args: Vec<Object>, span: Span) -> EvalResult<Object> {
    let (left, right) = expect_two_numbers(&args, span, "<")?;
    Ok(boolean(left < right))
}

pub fn prim_equals(args: Vec<Object>, span: Span) -> EvalResult<Object> {
    let (left, right) = expect_two_numbers(&args, span, "eq?")?;
    Ok(boolean(left == right))
}

pub fn prim_begin(mut args: Vec<Object>, _span: Span) -> EvalResult<Object> {
    // Arguments were already evaluated left to right; keep the last one.
    Ok(args.pop().unwrap_or(Object::Number(0.0)))
}
