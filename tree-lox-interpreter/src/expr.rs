use tree_lox_ast::{
    expr::Expr,
    scanner::{Token, TokenWithLocation},
    visitor::Visitor,
};

use crate::{
    value::{CallError, Value},
    Interpreter,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("[line {}] Error at '{}' with operand {operand:?}: Operand must be a number.", .operator.location.line, .operator.lexeme)]
    InvalidUnaryOpOperandError {
        operand: Value,
        operator: TokenWithLocation,
    },
    #[error("[line {}] Error at '{}' with operands {lhs:?} and {rhs:?}: Operands must be {expected}.", .operator.location.line, .operator.lexeme)]
    InvalidBinaryOpOperandError {
        expected: &'static str,
        lhs: Value,
        rhs: Value,
        operator: TokenWithLocation,
    },
    #[error("[line {}] Error at '{}': Undefined variable '{}'.", .0.location.line, .0.lexeme, .0.lexeme)]
    UndefinedVariableError(TokenWithLocation),
    #[error("[line {}] Error at ')' with callee {callee:?}: Can only call functions and classes.", .paren.location.line)]
    NotCallableError {
        callee: Value,
        paren: TokenWithLocation,
    },
    #[error("[line {}] Error at ')': Expected {expected} arguments but got {actual}.", .paren.location.line)]
    ArityMismatchError {
        expected: usize,
        actual: usize,
        paren: TokenWithLocation,
    },
    #[error("[line {}] Error at ')': Native function '{name}' failed: {source}", .paren.location.line)]
    NativeFunctionCallError {
        name: String,
        paren: TokenWithLocation,
        source: CallError,
    },
    #[error("Error: failed to write program output: {0}")]
    OutputError(#[from] std::io::Error),
}

impl Error {
    /// Source line the error was detected on, if it came from the program itself.
    pub fn line(&self) -> Option<usize> {
        use Error::*;
        match self {
            InvalidUnaryOpOperandError { operator, .. }
            | InvalidBinaryOpOperandError { operator, .. } => Some(operator.location.line),
            UndefinedVariableError(token) => Some(token.location.line),
            NotCallableError { paren, .. }
            | ArityMismatchError { paren, .. }
            | NativeFunctionCallError { paren, .. } => Some(paren.location.line),
            OutputError(_) => None,
        }
    }
}

fn handle_binary_op(
    left_expr: Value,
    right_expr: Value,
    operator: &TokenWithLocation,
) -> Result<Value, Error> {
    match (left_expr, right_expr, &operator.token) {
        (Value::Number(l), Value::Number(r), Token::Plus) => Ok(Value::Number(l + r)),
        (Value::String(mut l), Value::String(r), Token::Plus) => {
            l.push_str(&r);
            Ok(Value::String(l))
        }
        (lhs, rhs, Token::Plus) => Err(Error::InvalidBinaryOpOperandError {
            expected: "two numbers or two strings",
            lhs,
            rhs,
            operator: operator.clone(),
        }),
        (Value::Number(l), Value::Number(r), Token::Minus) => Ok(Value::Number(l - r)),
        (Value::Number(l), Value::Number(r), Token::Slash) => Ok(Value::Number(l / r)),
        (Value::Number(l), Value::Number(r), Token::Star) => Ok(Value::Number(l * r)),
        (Value::Number(l), Value::Number(r), Token::Greater) => Ok(Value::Bool(l > r)),
        (Value::Number(l), Value::Number(r), Token::GreaterEqual) => Ok(Value::Bool(l >= r)),
        (Value::Number(l), Value::Number(r), Token::Less) => Ok(Value::Bool(l < r)),
        (Value::Number(l), Value::Number(r), Token::LessEqual) => Ok(Value::Bool(l <= r)),
        (
            lhs,
            rhs,
            Token::Minus
            | Token::Slash
            | Token::Star
            | Token::Greater
            | Token::GreaterEqual
            | Token::Less
            | Token::LessEqual,
        ) => Err(Error::InvalidBinaryOpOperandError {
            expected: "numbers",
            lhs,
            rhs,
            operator: operator.clone(),
        }),
        (l, r, Token::BangEqual) => Ok(Value::Bool(l != r)),
        (l, r, Token::EqualEqual) => Ok(Value::Bool(l == r)),
        (_, _, t) => unreachable!("Token {:?} is found when visiting Binary expr.", t),
    }
}

impl<'a> Interpreter<'a> {
    fn call_value(
        &mut self,
        callee: Value,
        arguments: Vec<Value>,
        paren: &TokenWithLocation,
    ) -> Result<Value, Error> {
        let function = match callee {
            Value::Callable(function) => function,
            callee => {
                return Err(Error::NotCallableError {
                    callee,
                    paren: paren.clone(),
                })
            }
        };
        if arguments.len() != function.arity() {
            return Err(Error::ArityMismatchError {
                expected: function.arity(),
                actual: arguments.len(),
                paren: paren.clone(),
            });
        }
        function
            .call(self, arguments)
            .map_err(|source| Error::NativeFunctionCallError {
                name: function.name().to_string(),
                paren: paren.clone(),
                source,
            })
    }
}

impl<'a> Visitor<Result<Value, Error>> for Interpreter<'a> {
    fn visit_expr(&mut self, expr: &Expr) -> Result<Value, Error> {
        use Expr::*;
        match expr {
            LiteralBool(b, _) => Ok(Value::Bool(*b)),
            LiteralNil(_) => Ok(Value::Nil),
            LiteralNumber(v, _) => Ok(Value::Number(*v)),
            LiteralString(s, _) => Ok(Value::String(s.clone())),
            Grouping(e, _) => self.visit_expr(e),
            Ternary { cond, left, right } => {
                if self.visit_expr(cond)?.is_truthy() {
                    self.visit_expr(left)
                } else {
                    self.visit_expr(right)
                }
            }
            Binary {
                left,
                operator,
                right,
            } => {
                let le = self.visit_expr(left)?;
                let re = self.visit_expr(right)?;
                handle_binary_op(le, re, operator)
            }
            Logical {
                left,
                operator,
                right,
            } => {
                let le = self.visit_expr(left)?;
                let short_circuits = match operator.token {
                    Token::Or => le.is_truthy(),
                    _ => !le.is_truthy(),
                };
                if short_circuits {
                    Ok(le)
                } else {
                    self.visit_expr(right)
                }
            }
            Unary { operator, right } => {
                let r = self.visit_expr(right)?;
                match (&operator.token, r) {
                    (Token::Minus, Value::Number(v)) => Ok(Value::Number(-v)),
                    (Token::Minus, operand) => Err(Error::InvalidUnaryOpOperandError {
                        operand,
                        operator: operator.clone(),
                    }),
                    (Token::Bang, r) => Ok(Value::Bool(!r.is_truthy())),
                    (t, _) => unreachable!("Token {:?} is found when visiting Unary expr.", t),
                }
            }
            Variable(t) => self.environment.get(t),
            Assign { name, expr } => {
                let value = self.visit_expr(expr)?;
                self.environment.assign(name, value)
            }
            Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.visit_expr(callee)?;
                let arguments = arguments
                    .iter()
                    .map(|argument| self.visit_expr(argument))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call_value(callee, arguments, paren)
            }
        }
    }
}
