//! Lexically nested name → value bindings (§3, §4.4 of the language spec).

use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

struct Inner {
    store: HashMap<String, Value>,
    constants: HashSet<String>,
    parent: Option<Environment>,
}

/// A mapping from name to value, plus a set of names marked constant, plus
/// an optional parent. Cheaply cloneable (shares the underlying store via
/// `Rc`), so closures can hold on to the environment they were defined in
/// without copying it.
#[derive(Clone)]
pub struct Environment(Rc<RefCell<Inner>>);

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment {{ .. }}")
    }
}

pub enum AssignError {
    Undefined,
    Constant,
}

impl Environment {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Inner {
            store: HashMap::new(),
            constants: HashSet::new(),
            parent: None,
        })))
    }

    pub fn child(parent: &Environment) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            store: HashMap::new(),
            constants: HashSet::new(),
            parent: Some(parent.clone()),
        })))
    }

    /// Look up a name by walking the chain from innermost outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        let inner = self.0.borrow();
        if let Some(value) = inner.store.get(name) {
            return Some(value.clone());
        }
        inner.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Bind `name` in the current (innermost) scope, shadowing any outer
    /// binding. Fails if `name` is already a constant in this exact scope.
    pub fn declare(&self, name: &str, value: Value, is_const: bool) -> Result<(), ()> {
        let mut inner = self.0.borrow_mut();
        if inner.constants.contains(name) {
            return Err(());
        }
        inner.store.insert(name.to_string(), value);
        if is_const {
            inner.constants.insert(name.to_string());
        }
        Ok(())
    }

    /// Update an existing binding by walking parent scopes. Fails if no such
    /// binding exists, or if it is marked constant anywhere along the chain.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), AssignError> {
        let mut inner = self.0.borrow_mut();
        if inner.store.contains_key(name) {
            if inner.constants.contains(name) {
                return Err(AssignError::Constant);
            }
            inner.store.insert(name.to_string(), value);
            return Ok(());
        }
        match &inner.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(AssignError::Undefined),
        }
    }

    /// Top-level bindings only, for the REPL's `:env` command.
    pub fn local_bindings(&self) -> Vec<(String, Value, bool)> {
        let inner = self.0.borrow();
        inner
            .store
            .iter()
            .map(|(name, value)| (name.clone(), value.clone(), inner.constants.contains(name)))
            .collect()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_resolves_through_parent() {
        let parent = Environment::new();
        parent.declare("x", Value::Integer(10), false).unwrap();

        let child = Environment::child(&parent);
        assert_eq!(child.get("x"), Some(Value::Integer(10)));
    }

    #[test]
    fn test_shadowing_does_not_affect_parent() {
        let parent = Environment::new();
        parent.declare("x", Value::Integer(1), false).unwrap();

        let child = Environment::child(&parent);
        child.declare("x", Value::Integer(2), false).unwrap();

        assert_eq!(child.get("x"), Some(Value::Integer(2)));
        assert_eq!(parent.get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn test_const_rejects_reassignment() {
        let env = Environment::new();
        env.declare("k", Value::Integer(1), true).unwrap();

        assert!(matches!(
            env.assign("k", Value::Integer(2)),
            Err(AssignError::Constant)
        ));
    }

    #[test]
    fn test_const_rejects_redeclaration() {
        let env = Environment::new();
        env.declare("k", Value::Integer(1), true).unwrap();

        assert!(env.declare("k", Value::Integer(2), false).is_err());
    }

    #[test]
    fn test_assign_walks_parent_chain() {
        let parent = Environment::new();
        parent.declare("x", Value::Integer(1), false).unwrap();
        let child = Environment::child(&parent);

        child.assign("x", Value::Integer(99)).unwrap();
        assert_eq!(parent.get("x"), Some(Value::Integer(99)));
    }

    #[test]
    fn test_assign_undefined_fails() {
        let env = Environment::new();
        assert!(matches!(
            env.assign("nope", Value::Null),
            Err(AssignError::Undefined)
        ));
    }
}
