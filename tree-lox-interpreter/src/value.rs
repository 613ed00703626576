use std::{
    fmt::{self, Debug, Display, Formatter},
    rc::Rc,
};

use crate::Interpreter;

/// Failure reported by a native function body.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CallError(pub String);

/// A host-provided function that scripts can call.
pub trait Callable {
    fn name(&self) -> &str;
    fn arity(&self) -> usize;
    fn call(
        &self,
        interpreter: &mut Interpreter<'_>,
        arguments: Vec<Value>,
    ) -> Result<Value, CallError>;
}

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Callable(Rc<dyn Callable>),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

// Values of different types are never equal. Callables compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Bool(l), Bool(r)) => l == r,
            (Number(l), Number(r)) => l == r,
            (String(l), String(r)) => l == r,
            (Callable(l), Callable(r)) => std::ptr::addr_eq(Rc::as_ptr(l), Rc::as_ptr(r)),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use Value::*;
        match self {
            Nil => write!(f, "nil"),
            Bool(b) => write!(f, "{}", b),
            // f64's Display is the shortest round-trip form and never uses an exponent.
            Number(v) => write!(f, "{}", v),
            String(s) => write!(f, "{}", s),
            Callable(c) => write!(f, "<native fn {}>", c.name()),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            v => write!(f, "{}", v),
        }
    }
}
