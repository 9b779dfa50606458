use crate::class::Class;
use crate::error::{ErrorType, RuntimeError};
use crate::object::{Closure, Context, ObjectHolder};
use log::debug;
use std::cell::RefCell;
use std::fmt;
use std::fmt::Write as _;
use std::rc::Rc;

/// An object created from a class. Clones share the same field table, so a
/// holder obtained anywhere observes field mutations made anywhere else.
#[derive(Clone, Debug)]
pub struct ClassInstance {
    data: Rc<RefCell<InstanceData>>,
}

#[derive(Debug)]
struct InstanceData {
    class: Class,
    fields: Closure,
}

impl ClassInstance {
    pub fn new(class: Class) -> ClassInstance {
        ClassInstance {
            data: Rc::new(RefCell::new(InstanceData {
                class,
                fields: Closure::new(),
            })),
        }
    }

    pub fn class(&self) -> Class {
        self.data.borrow().class.clone()
    }

    pub fn field(&self, name: &str) -> Option<ObjectHolder> {
        self.data.borrow().fields.get(name).cloned()
    }

    pub fn set_field(&self, name: impl Into<String>, value: ObjectHolder) {
        self.data.borrow_mut().fields.insert(name.into(), value);
    }

    pub fn has_method(&self, method: &str, arity: usize) -> bool {
        self.class().get_method(method, arity).is_some()
    }

    /// Dispatches `method` on this instance. The body runs in a fresh closure
    /// holding `self` and one entry per formal parameter.
    pub fn call(
        &self,
        method: &str,
        args: &[ObjectHolder],
        context: &mut dyn Context,
    ) -> Result<ObjectHolder, ErrorType> {
        let class = self.class();
        debug!("dispatch {}.{}/{}", class.name(), method, args.len());
        let resolved = class
            .get_method(method, args.len())
            .ok_or_else(|| RuntimeError::new(format!("Unknown method name: {}", method)))?;
        let mut closure = Closure::new();
        closure.insert("self".to_string(), ObjectHolder::share(self));
        for (param, arg) in resolved.formal_params.iter().zip(args) {
            closure.insert(param.clone(), arg.clone());
        }
        resolved.body.execute(&mut closure, context)
    }

    /// Instances with a parameterless `__str__` render through it; everything
    /// else falls back to a generic tag.
    pub fn print(
        &self,
        out: &mut dyn fmt::Write,
        context: &mut dyn Context,
    ) -> Result<(), ErrorType> {
        if self.has_method("__str__", 0) {
            let value = self.call("__str__", &[], context)?;
            match value.get() {
                Some(object) => object.print(out, context)?,
                None => write!(out, "None")?,
            }
        } else {
            write!(out, "{} instance", self.class().name())?;
        }
        Ok(())
    }
}
