use std::{rc::Rc, time::SystemTime};

use log::debug;

use crate::{
    environment::Environment,
    value::{CallError, Callable, Value},
    Interpreter,
};

struct Clock;

impl Callable for Clock {
    fn name(&self) -> &str {
        "clock"
    }

    fn arity(&self) -> usize {
        0
    }

    fn call(&self, _: &mut Interpreter<'_>, _: Vec<Value>) -> Result<Value, CallError> {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|duration| Value::Number(duration.as_secs_f64()))
            .map_err(|e| CallError(format!("Failed to get time: {}", e)))
    }
}

pub fn register_globals(environment: &mut Environment) {
    let natives: [Rc<dyn Callable>; 1] = [Rc::new(Clock)];
    for native in natives {
        debug!("registering native function '{}'", native.name());
        environment.define(native.name().to_string(), Value::Callable(native));
    }
}
