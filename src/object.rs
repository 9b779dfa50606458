use crate::class::Class;
use crate::error::ErrorType;
use crate::instance::ClassInstance;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::io;
use std::rc::Rc;

/// The variable environment of one evaluation frame: a flat map from name to
/// value. Instance field tables reuse the same shape.
pub type Closure = BTreeMap<String, ObjectHolder>;

/// Execution environment handed through every evaluation. Supplies the sink
/// that `print` statements write to.
pub trait Context {
    fn output(&mut self) -> &mut dyn io::Write;
}

pub struct SimpleContext<'a> {
    output: &'a mut dyn io::Write,
}

impl<'a> SimpleContext<'a> {
    pub fn new(output: &'a mut dyn io::Write) -> SimpleContext<'a> {
        SimpleContext { output }
    }
}

impl Context for SimpleContext<'_> {
    fn output(&mut self) -> &mut dyn io::Write {
        &mut *self.output
    }
}

#[derive(Clone, Debug)]
pub enum Object {
    Number(i64),
    String(String),
    Bool(bool),
    Class(Class),
    Instance(ClassInstance),
}

impl Object {
    /// Renders the value. `out` is a plain text sink; `context` is still
    /// needed because instances may render through their `__str__` method.
    pub fn print(
        &self,
        out: &mut dyn fmt::Write,
        context: &mut dyn Context,
    ) -> Result<(), ErrorType> {
        match self {
            Object::Number(value) => write!(out, "{}", value)?,
            Object::String(value) => write!(out, "{}", value)?,
            Object::Bool(true) => write!(out, "True")?,
            Object::Bool(false) => write!(out, "False")?,
            Object::Class(class) => write!(out, "Class {}", class.name())?,
            Object::Instance(instance) => instance.print(out, context)?,
        }
        Ok(())
    }
}

/// Handle to a runtime value. Either empty (the language-level `None`) or a
/// shared reference to a heap-allocated object; clones alias the same object.
#[derive(Clone, Debug, Default)]
pub struct ObjectHolder {
    data: Option<Rc<Object>>,
}

impl ObjectHolder {
    /// Moves `object` onto the heap and takes shared ownership of it.
    pub fn own(object: Object) -> ObjectHolder {
        ObjectHolder {
            data: Some(Rc::new(object)),
        }
    }

    /// A holder aliasing an instance owned elsewhere. Used for the `self`
    /// binding inside method calls; the instance state stays shared.
    pub fn share(instance: &ClassInstance) -> ObjectHolder {
        ObjectHolder::own(Object::Instance(instance.clone()))
    }

    pub fn none() -> ObjectHolder {
        ObjectHolder { data: None }
    }

    pub fn get(&self) -> Option<&Object> {
        self.data.as_deref()
    }

    pub fn is_some(&self) -> bool {
        self.data.is_some()
    }

    pub fn try_as_number(&self) -> Option<i64> {
        match self.get() {
            Some(Object::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn try_as_string(&self) -> Option<&str> {
        match self.get() {
            Some(Object::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn try_as_bool(&self) -> Option<bool> {
        match self.get() {
            Some(Object::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn try_as_class(&self) -> Option<&Class> {
        match self.get() {
            Some(Object::Class(class)) => Some(class),
            _ => None,
        }
    }

    pub fn try_as_instance(&self) -> Option<&ClassInstance> {
        match self.get() {
            Some(Object::Instance(instance)) => Some(instance),
            _ => None,
        }
    }
}

/// Boolean coercion. Empty holders, classes and instances are always false.
pub fn is_true(object: &ObjectHolder) -> bool {
    match object.get() {
        Some(Object::Number(value)) => *value != 0,
        Some(Object::String(value)) => !value.is_empty(),
        Some(Object::Bool(value)) => *value,
        _ => false,
    }
}
