use crate::Span;
use crate::lexer::{Token, TokenKind};
use crate::types::{Expr, Node};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Nothing left to read. Hosts treat this as "nothing to evaluate".
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("unexpected ')'")]
    UnexpectedCloseParen(Span),
    /// Span of the '(' that was never closed.
    #[error("unbalanced expression")]
    UnbalancedExpression(Span),
}

// Result type alias for convenience
pub type ParseResult<T> = Result<T, ParseError>;

/// Reads one expression from the front of `tokens`, returning it together
/// with the tokens it did not consume.
pub fn read(tokens: &[Token]) -> ParseResult<(Node, &[Token])> {
    let Some((first, rest)) = tokens.split_first() else {
        return Err(ParseError::UnexpectedEndOfInput);
    };
    match &first.kind {
        TokenKind::LParen => read_list(first.span, rest),
        TokenKind::RParen => Err(ParseError::UnexpectedCloseParen(first.span)),
        TokenKind::Atom(text) => Ok((parse_atom(text, first.span), rest)),
    }
}

/// Parses an atom: anything that reads as an f64 is a number, the rest are
/// symbols.
fn parse_atom(text: &str, span: Span) -> Node {
    match text.parse::<f64>() {
        Ok(n) => Node::new_number(n, span),
        Err(_) => Node::new_symbol(text, span),
    }
}

/// Reads list children up to the matching ')'. `open` is the span of the
/// '(' already consumed.
fn read_list(open: Span, mut tokens: &[Token]) -> ParseResult<(Node, &[Token])> {
    let mut children = Vec::new();
    loop {
        match tokens.split_first() {
            None => return Err(ParseError::UnbalancedExpression(open)),
            Some((
                Token {
                    kind: TokenKind::RParen,
                    span: close,
                },
                rest,
            )) => return Ok((Node::new(Expr::List(children), open.merge(*close)), rest)),
            Some(_) => {
                let (child, rest) = read(tokens)?;
                children.push(child);
                tokens = rest;
            }
        }
    }
}

/// Reads every top-level expression from a token slice, in order. Stops
/// after the first error.
pub struct Parser<'a> {
    tokens: &'a [Token],
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens }
    }

    /// Tokens not yet consumed.
    pub fn remaining(&self) -> &'a [Token] {
        self.tokens
    }
}

impl Iterator for Parser<'_> {
    type Item = ParseResult<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.tokens.is_empty() {
            return None;
        }
        match read(self.tokens) {
            Ok((node, rest)) => {
                self.tokens = rest;
                Some(Ok(node))
            }
            Err(e) => {
                self.tokens = &[];
                Some(Err(e))
            }
        }
    }
}

// Helper function to lex and parse every expression in a string (useful for tests and the REPL)
pub fn parse_str(input: &str) -> ParseResult<Vec<Node>> {
    let tokens = crate::lexer::tokenize(input);
    Parser::new(&tokens).collect()
}

#[cfg(test)]
mod tests {
    use super::*; // Import items from parent module (read, Parser, ParseError, parse_str)
    use crate::lexer::tokenize;

    // Helper for asserting successful parsing of a single expression
    fn assert_parse(input: &str, expected: Node) {
        match parse_str(input) {
            Ok(result) => assert_eq!(result, vec![expected], "Input: '{}'", input),
            Err(e) => panic!("Parsing failed for input '{}': {}", input, e),
        }
    }

    // Helper for asserting parse errors
    fn assert_parse_error(input: &str, expected: ParseError) {
        match parse_str(input) {
            Ok(result) => panic!(
                "Expected parsing to fail for input '{}', but got: {:?}",
                input, result
            ),
            Err(e) => assert_eq!(e, expected, "Input: '{}'", input),
        }
    }

    fn assert_parsed_string(input: &str, expected_output: &str) {
        let nodes = match parse_str(input) {
            Ok(result) => result,
            Err(e) => panic!("Parsing failed for input '{}': {}", input, e),
        };
        let printed: Vec<String> = nodes.iter().map(|n| n.to_string()).collect();
        assert_eq!(printed.join(" "), expected_output, "Input: '{}'", input);
    }

    fn node_number(n: f64, start: usize, end: usize) -> Node {
        Node::new_number(n, Span::new(start, end))
    }

    fn node_symbol(s: &str, start: usize, end: usize) -> Node {
        Node::new_symbol(s, Span::new(start, end))
    }

    fn node_list(nodes: Vec<Node>, start: usize, end: usize) -> Node {
        Node::new_list(nodes, Span::new(start, end))
    }

    #[test]
    fn test_parse_atoms() {
        assert_parse("123", node_number(123.0, 0, 3));
        assert_parse("-4.5", node_number(-4.5, 0, 4));
        assert_parse("+10", node_number(10.0, 0, 3));
        assert_parse(".5", node_number(0.5, 0, 2));
        assert_parse("1e3", node_number(1000.0, 0, 3));
        assert_parse("symbol", node_symbol("symbol", 0, 6));
        assert_parse("+", node_symbol("+", 0, 1));
        assert_parse("set!", node_symbol("set!", 0, 4));
    }

    #[test]
    fn test_number_like_symbols() {
        // These fail f64 parsing and become symbols
        assert_parse("1-2", node_symbol("1-2", 0, 3));
        assert_parse("1.2.3", node_symbol("1.2.3", 0, 5));
        assert_parse("--5", node_symbol("--5", 0, 3));
        assert_parse("1e", node_symbol("1e", 0, 2));
    }

    #[test]
    fn test_parse_empty_list() {
        assert_parse("()", node_list(vec![], 0, 2));
        assert_parse("( )", node_list(vec![], 0, 3)); // With space
    }

    #[test]
    fn test_parse_simple_list() {
        assert_parse(
            "(+ 10 20)",
            node_list(
                vec![
                    node_symbol("+", 1, 2),
                    node_number(10.0, 3, 5),
                    node_number(20.0, 6, 8),
                ],
                0,
                9,
            ),
        );
    }

    #[test]
    fn test_parse_nested_list() {
        assert_parse(
            "(a (b c) d)",
            node_list(
                vec![
                    node_symbol("a", 1, 2),
                    node_list(vec![node_symbol("b", 4, 5), node_symbol("c", 6, 7)], 3, 8),
                    node_symbol("d", 9, 10),
                ],
                0,
                11,
            ),
        );
        assert_parse(
            "(()())",
            node_list(vec![node_list(vec![], 1, 3), node_list(vec![], 3, 5)], 0, 6),
        );
    }

    #[test]
    fn test_read_returns_remainder() {
        let tokens = tokenize("(define x 10) (+ x 1) y");
        let (first, rest) = read(&tokens).expect("first form");
        assert_eq!(first.to_string(), "(define x 10)");
        assert_eq!(rest.len(), 6);

        let (second, rest) = read(rest).expect("second form");
        assert_eq!(second.to_string(), "(+ x 1)");

        let (third, rest) = read(rest).expect("third form");
        assert_eq!(third, node_symbol("y", 22, 23));
        assert!(rest.is_empty());

        assert_eq!(read(rest), Err(ParseError::UnexpectedEndOfInput));
    }

    #[test]
    fn test_read_consumes_exactly_a_balanced_expression() {
        for input in [
            "42",
            "x",
            "()",
            "(f)",
            "(define fact (lambda (n) (if (< n 2) 1 (* n (fact (- n 1))))))",
            "((lambda (x) (x x)) (lambda (x) (x x)))",
        ] {
            let tokens = tokenize(input);
            let (_, rest) = read(&tokens).expect(input);
            assert!(rest.is_empty(), "Input: '{}' left {:?}", input, rest);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_parse_error(")", ParseError::UnexpectedCloseParen(Span::new(0, 1)));
        assert_parse_error("(1 2", ParseError::UnbalancedExpression(Span::new(0, 1)));
        assert_parse_error("(", ParseError::UnbalancedExpression(Span::new(0, 1)));
        // The innermost unclosed '(' is reported
        assert_parse_error("(a (b", ParseError::UnbalancedExpression(Span::new(3, 4)));
        // A trailing ')' is a stray paren for the next read
        assert_parse_error("(1))", ParseError::UnexpectedCloseParen(Span::new(3, 4)));
    }

    #[test]
    fn test_read_empty_is_end_of_input() {
        assert_eq!(read(&[]), Err(ParseError::UnexpectedEndOfInput));
    }

    #[test]
    fn test_parser_reads_all_forms() {
        assert_parsed_string(
            "(define x 10)\n(set! x (+ x 1))\nx",
            "(define x 10) (set! x (+ x 1)) x",
        );
        assert_eq!(parse_str(""), Ok(vec![]));
        assert_eq!(parse_str("   "), Ok(vec![]));
    }

    #[test]
    fn test_parser_stops_after_error() {
        let tokens = tokenize("1 ) 2");
        let mut parser = Parser::new(&tokens);
        assert_eq!(parser.next(), Some(Ok(node_number(1.0, 0, 1))));
        assert_eq!(parser.remaining().len(), 2);
        assert_eq!(
            parser.next(),
            Some(Err(ParseError::UnexpectedCloseParen(Span::new(2, 3))))
        );
        assert_eq!(parser.next(), None);
    }

    #[test]
    fn test_number_display_round_trip() {
        assert_parsed_string("(f 1.0 2.50 -0.5)", "(f 1 2.5 -0.5)");
    }
}
