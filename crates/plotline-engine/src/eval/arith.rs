//! Built-in scalar arithmetic evaluator.
//!
//! A small lexer + precedence-climbing parser over `+ - * / ( )`, numeric
//! literals, and bare identifiers, with an AST-walking evaluator. Division by
//! zero is an error rather than an infinity so the zero-binding trial run in
//! [`super::numeric_output_is_valid`] rejects label-only denominators.

use std::collections::HashMap;

use super::{EvalError, ScalarEvaluator};

/// Parenthesis/operator nesting ceiling.
///
/// Expressions are user-typed one-liners; the cap keeps adversarial input
/// (e.g. from the fuzz harness) from overflowing the parser's recursion.
const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn lex(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        let kind = match ch {
            ' ' => {
                chars.next();
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '0'..='9' | '.' => {
                let mut end = offset;
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        end = idx + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &input[offset..end];
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| EvalError::UnexpectedToken(offset))?;
                tokens.push(Token {
                    kind: TokenKind::Number(number),
                    offset,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() => {
                let mut end = offset;
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() {
                        end = idx + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(input[offset..end].to_string()),
                    offset,
                });
                continue;
            }
            other => return Err(EvalError::UnexpectedChar(other)),
        };
        chars.next();
        tokens.push(Token { kind, offset });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: input.len(),
    });
    Ok(tokens)
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Var(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Left/right binding powers; multiplication binds tighter than addition.
fn binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Add | BinaryOp::Sub => (1, 2),
        BinaryOp::Mul | BinaryOp::Div => (3, 4),
    }
}

/// Binding power of a prefix sign, above every binary operator.
const UNARY_BINDING_POWER: u8 = 5;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn parse(input: &str) -> Result<Expr, EvalError> {
        let tokens = lex(input)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_expression(0)?;
        match parser.peek().kind {
            TokenKind::Eof => Ok(expr),
            _ => Err(EvalError::UnexpectedToken(parser.peek().offset)),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        // Never advance past Eof.
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, EvalError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(EvalError::TooDeep);
        }
        self.depth += 1;

        let mut left = self.parse_prefix()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            let (left_bp, right_bp) = binding_power(op);
            if left_bp < min_bp {
                break;
            }
            self.bump();
            let right = self.parse_expression(right_bp)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth -= 1;
        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, EvalError> {
        let token = self.bump();
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::Ident(name) => Ok(Expr::Var(name)),
            TokenKind::Plus => {
                let operand = self.parse_expression(UNARY_BINDING_POWER)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Plus,
                    operand: Box::new(operand),
                })
            }
            TokenKind::Minus => {
                let operand = self.parse_expression(UNARY_BINDING_POWER)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Minus,
                    operand: Box::new(operand),
                })
            }
            TokenKind::LParen => {
                let inner = self.parse_expression(0)?;
                match self.bump().kind {
                    TokenKind::RParen => Ok(inner),
                    _ => Err(EvalError::UnexpectedToken(token.offset)),
                }
            }
            _ => Err(EvalError::UnexpectedToken(token.offset)),
        }
    }
}

fn eval_expr(expr: &Expr, bindings: &HashMap<String, f64>) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Var(name) => bindings
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
        Expr::Unary { op, operand } => {
            let value = eval_expr(operand, bindings)?;
            Ok(match op {
                UnaryOp::Plus => value,
                UnaryOp::Minus => -value,
            })
        }
        Expr::Binary { op, left, right } => {
            let left = eval_expr(left, bindings)?;
            let right = eval_expr(right, bindings)?;
            match op {
                BinaryOp::Add => Ok(left + right),
                BinaryOp::Sub => Ok(left - right),
                BinaryOp::Mul => Ok(left * right),
                BinaryOp::Div => {
                    if right == 0.0 {
                        Err(EvalError::DivisionByZero)
                    } else {
                        Ok(left / right)
                    }
                }
            }
        }
    }
}

/// The default [`ScalarEvaluator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticEvaluator;

impl ScalarEvaluator for ArithmeticEvaluator {
    fn evaluate(&self, expr: &str, bindings: &HashMap<String, f64>) -> Result<f64, EvalError> {
        let parsed = Parser::parse(expr)?;
        eval_expr(&parsed, bindings)
    }
}
