use crate::scanner::{Location, TokenWithLocation};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ternary {
        cond: Box<Expr>,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: TokenWithLocation,
        right: Box<Expr>,
    },
    // `and` / `or`. Kept apart from Binary because the right operand may not be evaluated.
    Logical {
        left: Box<Expr>,
        operator: TokenWithLocation,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: TokenWithLocation,
        arguments: Vec<Expr>,
    },
    Grouping(Box<Expr>, Location),
    LiteralNumber(f64, Location),
    LiteralString(String, Location),
    LiteralBool(bool, Location),
    LiteralNil(Location),
    Unary {
        operator: TokenWithLocation,
        right: Box<Expr>,
    },
    Variable(TokenWithLocation),
    Assign {
        name: TokenWithLocation,
        expr: Box<Expr>,
    },
}
