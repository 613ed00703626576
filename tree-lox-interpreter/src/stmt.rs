use log::{debug, trace};
use tree_lox_ast::{
    stmt::{Evaluator, Stmt},
    visitor::Visitor,
};

use crate::{
    expr::Error,
    value::Value,
    Interpreter,
};

/// What executing a statement asks the interpreter to do once it finished.
pub enum Action {
    Print(Value),
    Eval(Value),
    Define(String, Value),
    Nothing,
}

impl<'a> Evaluator<Result<Action, Error>> for Interpreter<'a> {
    fn evaluate_stmt(&mut self, stmt: &Stmt) -> Result<Action, Error> {
        trace!("executing {:?}", stmt);
        match stmt {
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.visit_expr(condition)?.is_truthy() {
                    self.evaluate_stmt(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.evaluate_stmt(else_stmt)
                } else {
                    Ok(Action::Nothing)
                }
            }
            Stmt::Print(e) => Ok(Action::Print(self.visit_expr(e)?)),
            Stmt::While { condition, body } => {
                while self.visit_expr(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(Action::Nothing)
            }
            Stmt::Expression(e) => Ok(Action::Eval(self.visit_expr(e)?)),
            Stmt::Var(t, expr) => {
                let value = match expr {
                    Some(e) => self.visit_expr(e)?,
                    None => Value::Nil,
                };
                Ok(Action::Define(t.token.id_name().to_string(), value))
            }
            Stmt::Block(stmts) => {
                let guard = self.enter();
                for stmt in stmts {
                    guard.interpreter.execute(stmt)?;
                }
                Ok(Action::Nothing)
            }
            Stmt::Function { name, params, .. } => {
                debug!(
                    "[line {}] function '{}' with {} parameter(s) is declared but never bound",
                    name.location.line,
                    name.lexeme,
                    params.len()
                );
                Ok(Action::Nothing)
            }
        }
    }
}
