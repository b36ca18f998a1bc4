use std::path::PathBuf;

use humble::{Error, EvalError, Interpreter, Object};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
}

fn load(interpreter: &mut Interpreter, name: &str) -> Option<Object> {
    let (_, result) = interpreter.load_file(&demo(name));
    result.unwrap_or_else(|e| panic!("loading {} failed: {}", name, e))
}

#[test]
fn load_file_returns_the_text_it_ran() {
    let mut interpreter = Interpreter::new();
    let (source, result) = interpreter.load_file(&demo("fact.scm"));
    assert!(result.is_ok());
    assert!(source.contains("define"));
}

fn eval_number(interpreter: &mut Interpreter, source: &str) -> f64 {
    match interpreter.eval_source(source) {
        Ok(Some(Object::Number(n))) => n,
        other => panic!("'{}' gave {:?}", source, other),
    }
}

#[test]
fn factorial_of_ten() {
    let mut interpreter = Interpreter::new();
    load(&mut interpreter, "fact.scm");
    assert_eq!(eval_number(&mut interpreter, "(fact 10)"), 3628800.0);
    assert_eq!(eval_number(&mut interpreter, "(fact 0)"), 1.0);
}

#[test]
fn collatz_step() {
    let mut interpreter = Interpreter::new();
    load(&mut interpreter, "collatz.scm");
    assert_eq!(eval_number(&mut interpreter, "(collatz 7)"), 22.0);
    assert_eq!(eval_number(&mut interpreter, "(collatz 22)"), 11.0);
}

#[test]
fn adder_closure_outlives_its_frame() {
    let mut interpreter = Interpreter::new();
    assert_eq!(
        load(&mut interpreter, "adder.scm"),
        Some(Object::Number(7.0))
    );
    assert_eq!(eval_number(&mut interpreter, "(add3 10)"), 13.0);
}

#[test]
fn account_keeps_its_balance() {
    let mut interpreter = Interpreter::new();
    load(&mut interpreter, "account.scm");
    assert_eq!(eval_number(&mut interpreter, "(acct 10)"), 110.0);
    assert_eq!(eval_number(&mut interpreter, "(acct -30)"), 80.0);
    assert_eq!(eval_number(&mut interpreter, "(acct 70)"), 150.0);

    // A second account has its own balance
    assert_eq!(
        eval_number(&mut interpreter, "(define other (make-account 5)) (other 1)"),
        6.0
    );
    assert_eq!(eval_number(&mut interpreter, "(acct 0)"), 150.0);
}

#[test]
fn or_short_circuits_before_division_by_zero() {
    let mut interpreter = Interpreter::new();
    assert_eq!(load(&mut interpreter, "short.scm"), Some(Object::Number(1.0)));

    let result = interpreter.eval_source("(eq? (div x 0) 0)");
    assert!(matches!(
        result,
        Err(Error::Eval(EvalError::DivisionByZero { .. }))
    ));
}

#[test]
fn programs_share_one_session() {
    let mut interpreter = Interpreter::new();
    load(&mut interpreter, "fact.scm");
    load(&mut interpreter, "collatz.scm");
    assert_eq!(eval_number(&mut interpreter, "(collatz (fact 3))"), 3.0);
}

#[test]
fn define_and_set_scoping() {
    let mut interpreter = Interpreter::new();
    eval_number(&mut interpreter, "(define x 1)");

    eval_number(&mut interpreter, "((lambda () (define x 2)))");
    assert_eq!(eval_number(&mut interpreter, "x"), 1.0);

    eval_number(&mut interpreter, "((lambda () (set! x 2)))");
    assert_eq!(eval_number(&mut interpreter, "x"), 2.0);
}
