use crate::class::Class;
use crate::compare::Comparator;
use crate::error::{ErrorType, RuntimeError};
use crate::instance::ClassInstance;
use crate::object::{is_true, Closure, Context, Object, ObjectHolder};
use log::debug;
use std::cell::RefCell;
use std::io::Write as _;

/// A (possibly dotted) name resolving through the closure and then through
/// instance fields: `a.b.c` reads `a` from the closure, then field `b` of
/// that instance, then field `c`.
#[derive(Clone, Debug)]
pub struct VariableValue {
    dotted_ids: Vec<String>,
}

impl VariableValue {
    pub fn new(name: impl Into<String>) -> VariableValue {
        VariableValue {
            dotted_ids: vec![name.into()],
        }
    }

    pub fn dotted(dotted_ids: Vec<String>) -> VariableValue {
        VariableValue { dotted_ids }
    }

    pub fn execute(&self, closure: &Closure) -> Result<ObjectHolder, ErrorType> {
        let first = self
            .dotted_ids
            .first()
            .ok_or_else(|| RuntimeError::new("Not find variable"))?;
        let mut value = closure
            .get(first)
            .cloned()
            .ok_or_else(|| RuntimeError::new("Not find variable"))?;
        for name in &self.dotted_ids[1..] {
            let instance = value
                .try_as_instance()
                .ok_or_else(|| RuntimeError::new("Not find variable"))?
                .clone();
            value = instance
                .field(name)
                .ok_or_else(|| RuntimeError::new("Not find variable"))?;
        }
        Ok(value)
    }
}

/// One AST node. Statements and expressions share the node kind: every node
/// evaluates to an `ObjectHolder` (possibly empty).
#[derive(Debug)]
pub enum Statement {
    NumericConst(i64),
    StringConst(String),
    BoolConst(bool),
    NoneConst,
    Variable(VariableValue),
    Assignment {
        var: String,
        rhs: Box<Statement>,
    },
    FieldAssignment {
        object: VariableValue,
        field: String,
        rhs: Box<Statement>,
    },
    Print {
        args: Vec<Statement>,
    },
    Stringify {
        arg: Box<Statement>,
    },
    MethodCall {
        object: Box<Statement>,
        method: String,
        args: Vec<Statement>,
    },
    Add {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    Sub {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    Mult {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    Div {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    And {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    Or {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    Not {
        arg: Box<Statement>,
    },
    Compound {
        statements: Vec<Statement>,
    },
    /// Frame boundary of a method. Absorbs the return signal raised anywhere
    /// inside `body` and yields the carried value; a body that completes
    /// normally yields `None`.
    MethodBody {
        body: Box<Statement>,
    },
    Return {
        statement: Box<Statement>,
    },
    ClassDefinition {
        class: Class,
    },
    IfElse {
        condition: Box<Statement>,
        if_body: Box<Statement>,
        else_body: Option<Box<Statement>>,
    },
    Comparison {
        cmp: Comparator,
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    /// Instantiation site. The node owns its instance: the first execution
    /// allocates it, later executions re-run `__init__` on the same object
    /// and hand out another holder to it.
    NewInstance {
        class: Class,
        args: Vec<Statement>,
        instance: RefCell<Option<ClassInstance>>,
    },
}

impl Statement {
    pub fn new_instance(class: Class, args: Vec<Statement>) -> Statement {
        Statement::NewInstance {
            class,
            args,
            instance: RefCell::new(None),
        }
    }

    pub fn execute(
        &self,
        closure: &mut Closure,
        context: &mut dyn Context,
    ) -> Result<ObjectHolder, ErrorType> {
        match self {
            Statement::NumericConst(value) => Ok(ObjectHolder::own(Object::Number(*value))),
            Statement::StringConst(value) => Ok(ObjectHolder::own(Object::String(value.clone()))),
            Statement::BoolConst(value) => Ok(ObjectHolder::own(Object::Bool(*value))),
            Statement::NoneConst => Ok(ObjectHolder::none()),
            Statement::Variable(variable) => variable.execute(closure),
            Statement::Assignment { var, rhs } => {
                let value = rhs.execute(closure, context)?;
                closure.insert(var.clone(), value.clone());
                Ok(value)
            }
            Statement::FieldAssignment { object, field, rhs } => {
                let target = object.execute(closure)?;
                let instance = target
                    .try_as_instance()
                    .ok_or_else(|| {
                        RuntimeError::new("Field assignment target is not a class instance")
                    })?
                    .clone();
                let value = rhs.execute(closure, context)?;
                instance.set_field(field.clone(), value.clone());
                Ok(value)
            }
            Statement::Print { args } => {
                for (i, arg) in args.iter().enumerate() {
                    let value = arg.execute(closure, context)?;
                    let piece = render(&value, context)?;
                    if i > 0 {
                        context.output().write_all(b" ")?;
                    }
                    context.output().write_all(piece.as_bytes())?;
                }
                context.output().write_all(b"\n")?;
                Ok(ObjectHolder::none())
            }
            Statement::Stringify { arg } => {
                let value = arg.execute(closure, context)?;
                Ok(ObjectHolder::own(Object::String(render(&value, context)?)))
            }
            Statement::MethodCall {
                object,
                method,
                args,
            } => {
                let receiver = object.execute(closure, context)?;
                let instance = receiver
                    .try_as_instance()
                    .ok_or_else(|| {
                        RuntimeError::new("Method call receiver is not a class instance")
                    })?
                    .clone();
                let mut actual = Vec::new();
                for arg in args {
                    actual.push(arg.execute(closure, context)?);
                }
                instance.call(method, &actual, context)
            }
            Statement::Add { lhs, rhs } => {
                let left = lhs.execute(closure, context)?;
                let right = rhs.execute(closure, context)?;
                match (left.get(), right.get()) {
                    (Some(Object::Number(a)), Some(Object::Number(b))) => {
                        Ok(ObjectHolder::own(Object::Number(a + b)))
                    }
                    (Some(Object::String(a)), Some(Object::String(b))) => {
                        let mut joined = a.clone();
                        joined.push_str(b);
                        Ok(ObjectHolder::own(Object::String(joined)))
                    }
                    (Some(Object::Instance(instance)), _)
                        if instance.has_method("__add__", 1) =>
                    {
                        instance.call("__add__", &[right.clone()], context)
                    }
                    _ => Err(RuntimeError::new("No __add__ method")),
                }
            }
            Statement::Sub { lhs, rhs } => {
                arithmetic(closure, context, lhs, rhs, |a, b| Ok(a - b))
            }
            Statement::Mult { lhs, rhs } => {
                arithmetic(closure, context, lhs, rhs, |a, b| Ok(a * b))
            }
            Statement::Div { lhs, rhs } => arithmetic(closure, context, lhs, rhs, |a, b| {
                if b == 0 {
                    Err(RuntimeError::new("Division by zero"))
                } else {
                    Ok(a / b)
                }
            }),
            Statement::And { lhs, rhs } => {
                // Both sides always evaluate; there is no short-circuit.
                let left = lhs.execute(closure, context)?;
                let right = rhs.execute(closure, context)?;
                Ok(ObjectHolder::own(Object::Bool(
                    is_true(&left) && is_true(&right),
                )))
            }
            Statement::Or { lhs, rhs } => {
                let left = lhs.execute(closure, context)?;
                let right = rhs.execute(closure, context)?;
                Ok(ObjectHolder::own(Object::Bool(
                    is_true(&left) || is_true(&right),
                )))
            }
            Statement::Not { arg } => {
                let value = arg.execute(closure, context)?;
                Ok(ObjectHolder::own(Object::Bool(!is_true(&value))))
            }
            Statement::Compound { statements } => {
                for statement in statements {
                    statement.execute(closure, context)?;
                }
                Ok(ObjectHolder::none())
            }
            Statement::MethodBody { body } => match body.execute(closure, context) {
                Ok(_) => Ok(ObjectHolder::none()),
                Err(ErrorType::Return(value)) => Ok(value),
                Err(other) => Err(other),
            },
            Statement::Return { statement } => {
                Err(ErrorType::Return(statement.execute(closure, context)?))
            }
            Statement::ClassDefinition { class } => {
                debug!("defining class {}", class.name());
                let holder = ObjectHolder::own(Object::Class(class.clone()));
                closure.insert(class.name().to_string(), holder.clone());
                Ok(holder)
            }
            Statement::IfElse {
                condition,
                if_body,
                else_body,
            } => {
                if is_true(&condition.execute(closure, context)?) {
                    if_body.execute(closure, context)
                } else if let Some(else_body) = else_body {
                    else_body.execute(closure, context)
                } else {
                    Ok(ObjectHolder::none())
                }
            }
            Statement::Comparison { cmp, lhs, rhs } => {
                let left = lhs.execute(closure, context)?;
                let right = rhs.execute(closure, context)?;
                Ok(ObjectHolder::own(Object::Bool(cmp(
                    &left, &right, context,
                )?)))
            }
            Statement::NewInstance {
                class,
                args,
                instance,
            } => {
                let mut actual = Vec::new();
                for arg in args {
                    actual.push(arg.execute(closure, context)?);
                }
                // The slot borrow must end before __init__ runs user code.
                let instance = instance
                    .borrow_mut()
                    .get_or_insert_with(|| ClassInstance::new(class.clone()))
                    .clone();
                if instance.has_method("__init__", actual.len()) {
                    instance.call("__init__", &actual, context)?;
                }
                Ok(ObjectHolder::share(&instance))
            }
        }
    }
}

// Renders a holder the way `print` shows it; empty holders read as `None`.
fn render(value: &ObjectHolder, context: &mut dyn Context) -> Result<String, ErrorType> {
    let mut buffer = String::new();
    match value.get() {
        Some(object) => object.print(&mut buffer, context)?,
        None => buffer.push_str("None"),
    }
    Ok(buffer)
}

fn arithmetic(
    closure: &mut Closure,
    context: &mut dyn Context,
    lhs: &Statement,
    rhs: &Statement,
    op: fn(i64, i64) -> Result<i64, ErrorType>,
) -> Result<ObjectHolder, ErrorType> {
    let left = lhs.execute(closure, context)?;
    let right = rhs.execute(closure, context)?;
    match (left.try_as_number(), right.try_as_number()) {
        (Some(a), Some(b)) => Ok(ObjectHolder::own(Object::Number(op(a, b)?))),
        _ => Err(RuntimeError::new("lhs or rhs not Number")),
    }
}
