use crate::{expr::Expr, scanner::TokenWithLocation};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Box<Expr>),
    Print(Box<Expr>),
    Var(TokenWithLocation, Option<Box<Expr>>),
    Block(Vec<Stmt>),
    Function {
        name: TokenWithLocation,
        params: Vec<TokenWithLocation>,
        body: Vec<Stmt>,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Box<Expr>,
        body: Box<Stmt>,
    },
}

pub trait Evaluator<R> {
    fn evaluate_stmt(&mut self, stmt: &Stmt) -> R;
}
