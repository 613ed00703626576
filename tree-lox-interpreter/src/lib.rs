mod environment;
mod expr;
mod globals;
mod stmt;
mod value;

use std::{io::Write, rc::Rc};

use crate::stmt::Action;
use environment::Environment;
use log::debug;
use tree_lox_ast::stmt::{Evaluator, Stmt};

pub use expr::Error;
pub use value::{CallError, Callable, Value};

pub struct Interpreter<'a> {
    environment: Environment,
    out: &'a mut dyn Write,
}

/// Keeps a block frame alive; the frame is popped when the guard is dropped,
/// including when a statement inside the block fails.
pub(crate) struct EnvGuard<'a, 'b> {
    interpreter: &'a mut Interpreter<'b>,
}

impl<'a, 'b> Drop for EnvGuard<'a, 'b> {
    fn drop(&mut self) {
        self.interpreter.environment.exit();
    }
}

impl<'a> Interpreter<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        let mut environment = Environment::default();
        globals::register_globals(&mut environment);
        Self { environment, out }
    }

    /// Executes `stmts` in order and stops at the first runtime error.
    ///
    /// `print` output goes straight to the output sink. The returned string
    /// collects the values of top-level expression statements, one per line,
    /// which is what a prompt echoes back.
    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<String, Error> {
        let mut result = String::new();
        for stmt in stmts {
            if let Some(value) = self.execute(stmt)? {
                let text = value.to_string();
                if !text.is_empty() {
                    result.push_str(&text);
                    result.push('\n');
                }
            }
        }
        Ok(result)
    }

    /// Makes a host function visible to scripts as a global.
    pub fn define_native(&mut self, native: Rc<dyn Callable>) {
        debug!("registering native function '{}'", native.name());
        self.environment
            .define(native.name().to_string(), Value::Callable(native));
    }

    /// Number of block scopes currently entered.
    pub fn scope_depth(&self) -> usize {
        self.environment.depth()
    }

    pub fn out(&mut self) -> &mut (dyn Write + 'a) {
        &mut *self.out
    }

    pub(crate) fn enter(&mut self) -> EnvGuard<'_, 'a> {
        self.environment.enter();
        EnvGuard { interpreter: self }
    }

    fn handle_side_effect(&mut self, action: Action) -> Result<Option<Value>, Error> {
        match action {
            Action::Print(v) => {
                writeln!(self.out, "{}", v)?;
                Ok(None)
            }
            Action::Eval(v) => Ok(Some(v)),
            Action::Define(name, v) => {
                self.environment.define(name, v);
                Ok(None)
            }
            Action::Nothing => Ok(None),
        }
    }

    // Returns the value of an expression statement, which callers may echo.
    fn execute(&mut self, stmt: &Stmt) -> Result<Option<Value>, Error> {
        let action = self.evaluate_stmt(stmt)?;
        self.handle_side_effect(action)
    }
}
