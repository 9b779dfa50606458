use crate::statement::Statement;
use std::rc::Rc;

/// A named, parameter-bearing body owned by a class. `self` is not listed in
/// `formal_params`; it is bound separately at call time.
#[derive(Debug)]
pub struct Method {
    pub name: String,
    pub formal_params: Vec<String>,
    pub body: Statement,
}

/// A user-defined class: an ordered method table plus an optional parent.
/// Cheap to clone; all copies share the same definition.
#[derive(Clone, Debug)]
pub struct Class {
    data: Rc<ClassData>,
}

#[derive(Debug)]
struct ClassData {
    name: String,
    methods: Vec<Method>,
    parent: Option<Class>,
}

impl Class {
    pub fn new(name: impl Into<String>, methods: Vec<Method>, parent: Option<Class>) -> Class {
        Class {
            data: Rc::new(ClassData {
                name: name.into(),
                methods,
                parent,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Resolves `name` with exactly `arity` formal parameters. The own method
    /// table wins over ancestors; the parent chain is searched recursively.
    pub fn get_method(&self, name: &str, arity: usize) -> Option<&Method> {
        self.data
            .methods
            .iter()
            .find(|method| method.name == name && method.formal_params.len() == arity)
            .or_else(|| {
                self.data
                    .parent
                    .as_ref()
                    .and_then(|parent| parent.get_method(name, arity))
            })
    }
}
