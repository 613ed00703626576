use std::collections::HashMap;

use tree_lox_ast::scanner::TokenWithLocation;

use crate::{expr::Error, value::Value};

#[derive(Debug, Default)]
struct Frame {
    values: HashMap<String, Value>,
    enclosing: Option<usize>,
}

/// Scope chain stored as an arena of frames.
///
/// Each frame refers to its parent by index. Frames are only ever pushed by
/// `enter` and popped by `exit`, so the innermost frame is always the last one
/// and the global frame (index 0) is never removed.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
    current: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            frames: vec![Frame::default()],
            current: 0,
        }
    }
}

impl Environment {
    pub fn enter(&mut self) {
        self.frames.push(Frame {
            values: HashMap::new(),
            enclosing: Some(self.current),
        });
        self.current = self.frames.len() - 1;
    }

    pub fn exit(&mut self) {
        debug_assert_eq!(self.current, self.frames.len() - 1);
        if self.frames.len() == 1 {
            return;
        }
        if let Some(frame) = self.frames.pop() {
            self.current = frame.enclosing.unwrap_or(0);
        }
    }

    /// Number of block frames above the global one.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn define(&mut self, name: String, val: Value) -> Option<Value> {
        self.frames[self.current].values.insert(name, val)
    }

    pub fn get(&self, token: &TokenWithLocation) -> Result<Value, Error> {
        self.get_internal(token.token.id_name())
            .ok_or_else(|| Error::UndefinedVariableError(token.clone()))
    }

    pub fn get_internal(&self, name: &str) -> Option<Value> {
        self.resolve(name)
            .and_then(|index| self.frames[index].values.get(name).cloned())
    }

    pub fn assign(&mut self, token: &TokenWithLocation, val: Value) -> Result<Value, Error> {
        let name = token.token.id_name();
        let slot = self
            .resolve(name)
            .and_then(|index| self.frames[index].values.get_mut(name))
            .ok_or_else(|| Error::UndefinedVariableError(token.clone()))?;
        *slot = val.clone();
        Ok(val)
    }

    // Index of the innermost frame binding `name`.
    fn resolve(&self, name: &str) -> Option<usize> {
        let mut frame = Some(self.current);
        while let Some(index) = frame {
            if self.frames[index].values.contains_key(name) {
                return Some(index);
            }
            frame = self.frames[index].enclosing;
        }
        None
    }
}
