use crate::error::{ErrorType, RuntimeError};
use crate::object::{is_true, Context, Object, ObjectHolder};
use strum_macros::Display;

/// Comparison callback consumed by the `Comparison` AST node.
pub type Comparator = fn(&ObjectHolder, &ObjectHolder, &mut dyn Context) -> Result<bool, ErrorType>;

#[derive(Clone, Copy, Debug, Display)]
enum CompareMethod {
    #[strum(serialize = "__eq__")]
    Equal,
    #[strum(serialize = "__lt__")]
    Less,
}

fn apply<T: PartialOrd>(op: CompareMethod, lhs: &T, rhs: &T) -> bool {
    match op {
        CompareMethod::Equal => lhs == rhs,
        CompareMethod::Less => lhs < rhs,
    }
}

// Instances dispatch to their own comparison method; primitive kinds compare
// directly when both sides share a kind.
fn make_comparison(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
    op: CompareMethod,
) -> Result<bool, ErrorType> {
    if let (Some(l), Some(r)) = (lhs.get(), rhs.get()) {
        if let Object::Instance(instance) = l {
            let name = op.to_string();
            if instance.has_method(&name, 1) {
                let result = instance.call(&name, &[rhs.clone()], context)?;
                return Ok(is_true(&result));
            }
        }
        match (l, r) {
            (Object::String(a), Object::String(b)) => return Ok(apply(op, a, b)),
            (Object::Number(a), Object::Number(b)) => return Ok(apply(op, a, b)),
            (Object::Bool(a), Object::Bool(b)) => return Ok(apply(op, a, b)),
            _ => {}
        }
    }
    Err(RuntimeError::new(format!(
        "Cannot compare objects for {}",
        op
    )))
}

pub fn equal(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> Result<bool, ErrorType> {
    if !lhs.is_some() && !rhs.is_some() {
        return Ok(true);
    }
    make_comparison(lhs, rhs, context, CompareMethod::Equal)
}

pub fn less(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> Result<bool, ErrorType> {
    make_comparison(lhs, rhs, context, CompareMethod::Less)
}

pub fn not_equal(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> Result<bool, ErrorType> {
    Ok(!equal(lhs, rhs, context)?)
}

pub fn greater(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> Result<bool, ErrorType> {
    Ok(!less(lhs, rhs, context)? && !equal(lhs, rhs, context)?)
}

pub fn less_or_equal(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> Result<bool, ErrorType> {
    Ok(!greater(lhs, rhs, context)?)
}

pub fn greater_or_equal(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> Result<bool, ErrorType> {
    Ok(!less(lhs, rhs, context)?)
}

#[cfg(test)]
mod compare_tests {
    use crate::class::{Class, Method};
    use crate::compare;
    use crate::instance::ClassInstance;
    use crate::object::{Object, ObjectHolder, SimpleContext};
    use crate::statement::{Statement, VariableValue};

    fn number(value: i64) -> ObjectHolder {
        ObjectHolder::own(Object::Number(value))
    }

    fn string(value: &str) -> ObjectHolder {
        ObjectHolder::own(Object::String(value.to_string()))
    }

    fn boolean(value: bool) -> ObjectHolder {
        ObjectHolder::own(Object::Bool(value))
    }

    fn with_context<T>(f: impl FnOnce(&mut SimpleContext) -> T) -> T {
        let mut sink = Vec::new();
        let mut context = SimpleContext::new(&mut sink);
        f(&mut context)
    }

    #[test]
    fn primitive_equality() {
        with_context(|ctx| {
            assert!(compare::equal(&number(3), &number(3), ctx).unwrap());
            assert!(!compare::equal(&number(3), &number(4), ctx).unwrap());
            assert!(compare::equal(&string("a"), &string("a"), ctx).unwrap());
            assert!(!compare::equal(&string("a"), &string("b"), ctx).unwrap());
            assert!(compare::equal(&boolean(true), &boolean(true), ctx).unwrap());
            assert!(!compare::equal(&boolean(true), &boolean(false), ctx).unwrap());
        });
    }

    #[test]
    fn none_equals_none() {
        with_context(|ctx| {
            assert!(compare::equal(&ObjectHolder::none(), &ObjectHolder::none(), ctx).unwrap());
            assert!(compare::equal(&ObjectHolder::none(), &number(1), ctx).is_err());
        });
    }

    #[test]
    fn primitive_ordering() {
        with_context(|ctx| {
            assert!(compare::less(&number(1), &number(2), ctx).unwrap());
            assert!(!compare::less(&number(2), &number(1), ctx).unwrap());
            assert!(compare::less(&string("ab"), &string("b"), ctx).unwrap());
            assert!(compare::less(&boolean(false), &boolean(true), ctx).unwrap());
            assert!(compare::greater(&number(2), &number(1), ctx).unwrap());
            assert!(compare::less_or_equal(&number(2), &number(2), ctx).unwrap());
            assert!(compare::greater_or_equal(&number(2), &number(2), ctx).unwrap());
            assert!(compare::not_equal(&number(1), &number(2), ctx).unwrap());
        });
    }

    #[test]
    fn mismatched_kinds_cannot_compare() {
        with_context(|ctx| {
            let error = compare::equal(&number(1), &string("1"), ctx).unwrap_err();
            assert_eq!(error.to_string(), "Cannot compare objects for __eq__");
            let error = compare::less(&boolean(true), &number(1), ctx).unwrap_err();
            assert_eq!(error.to_string(), "Cannot compare objects for __lt__");
        });
    }

    #[test]
    fn equality_is_symmetric_for_primitives() {
        with_context(|ctx| {
            let values = [number(0), number(1), number(2)];
            for a in &values {
                for b in &values {
                    assert_eq!(
                        compare::equal(a, b, ctx).unwrap(),
                        compare::equal(b, a, ctx).unwrap()
                    );
                    assert!(
                        compare::less(a, b, ctx).unwrap()
                            == !compare::less_or_equal(b, a, ctx).unwrap()
                            || compare::equal(a, b, ctx).unwrap()
                    );
                }
            }
        });
    }

    #[test]
    fn instances_dispatch_to_dunder_methods() {
        // __eq__ compares the receiver's field against the argument.
        let class = Class::new(
            "Cell",
            vec![Method {
                name: "__eq__".to_string(),
                formal_params: vec!["other".to_string()],
                body: Statement::MethodBody {
                    body: Box::new(Statement::Return {
                        statement: Box::new(Statement::Comparison {
                            cmp: compare::equal,
                            lhs: Box::new(Statement::Variable(VariableValue::dotted(vec![
                                "self".to_string(),
                                "value".to_string(),
                            ]))),
                            rhs: Box::new(Statement::Variable(VariableValue::new("other"))),
                        }),
                    }),
                },
            }],
            None,
        );
        let instance = ClassInstance::new(class);
        instance.set_field("value", number(5));
        let holder = ObjectHolder::own(Object::Instance(instance));
        with_context(|ctx| {
            assert!(compare::equal(&holder, &number(5), ctx).unwrap());
            assert!(!compare::equal(&holder, &number(6), ctx).unwrap());
        });
    }

    #[test]
    fn instance_without_comparison_method_fails() {
        let holder = ObjectHolder::own(Object::Instance(ClassInstance::new(Class::new(
            "Plain",
            Vec::new(),
            None,
        ))));
        with_context(|ctx| {
            let error = compare::less(&holder, &number(1), ctx).unwrap_err();
            assert_eq!(error.to_string(), "Cannot compare objects for __lt__");
        });
    }
}
