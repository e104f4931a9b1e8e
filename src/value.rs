//! Runtime value model shared by the evaluator and the built-in library.

use std::cell::RefCell;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::Block;
use crate::environment::Environment;

pub type Array = Rc<RefCell<Vec<Value>>>;
pub type Dict = Rc<RefCell<IndexMap<Value, Value>>>;

#[derive(Debug, Clone)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: Block,
    pub env: Environment,
    pub name: Option<String>,
}

impl Function {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }
}

/// A native function exposed to Kira programs under a fixed name. The
/// registry living in [`crate::builtins`] maps names to these.
#[derive(Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub func: Rc<dyn Fn(Vec<Value>) -> Result<Value, String>>,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<builtin function {}>", self.name)
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Str(Rc<str>),
    Array(Array),
    Dict(Dict),
    Builtin(Builtin),
    Function(Rc<Function>),
}

impl Value {
    pub fn str(value: impl Into<Rc<str>>) -> Self {
        Value::Str(value.into())
    }

    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(values)))
    }

    pub fn dict(pairs: IndexMap<Value, Value>) -> Self {
        Value::Dict(Rc::new(RefCell::new(pairs)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin",
        }
    }

    /// Truthiness per the Language's rules: `null`/`false` are falsy,
    /// numbers are falsy iff zero, strings/arrays/dicts iff empty,
    /// everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(a) => !a.borrow().is_empty(),
            Value::Dict(d) => !d.borrow().is_empty(),
            Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    /// Whether this value may be used as a dict key. Kept narrow on purpose:
    /// arrays and dicts are mutable reference types and hashing them would
    /// make the hash unstable across mutation, which is exactly the hazard
    /// the language's own design notes warn about.
    pub fn is_hashable(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Dict(_))
    }

    /// `str`-form: what `print` emits. Strings unquoted, containers recurse
    /// with `repr`-form for their elements.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            _ => self.to_repr_string(),
        }
    }

    /// `repr`-form: quotes strings with double quotes; used for container
    /// elements and REPL echoing.
    pub fn to_repr_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) => format!("\"{}\"", escape_for_repr(s)),
            Value::Array(a) => {
                let items: Vec<String> = a.borrow().iter().map(Value::to_repr_string).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Dict(d) => {
                let items: Vec<String> = d
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.to_repr_string(), v.to_repr_string()))
                    .collect();
                format!("{{{}}}", items.join(", "))
            }
            Value::Function(f) => format!("<function {}>", f.display_name()),
            Value::Builtin(b) => format!("<builtin function {}>", b.name),
        }
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.is_finite() {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn escape_for_repr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

/// Structural equality across all value kinds. `null` equals only `null`;
/// numbers compare by mathematical value regardless of integer/float tag;
/// containers compare element-wise.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(a), Float(b)) | (Float(b), Integer(a)) => *a as f64 == *b,
            (Str(a), Str(b)) => a == b,
            (Array(a), Array(b)) => *a.borrow() == *b.borrow(),
            (Dict(a), Dict(b)) => *a.borrow() == *b.borrow(),
            (Function(a), Function(b)) => Rc::ptr_eq(a, b),
            (Builtin(a), Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Hash consistent with [`PartialEq`]: numeric values hash via their `f64`
/// representation so that `Integer(2) == Float(2.0)` implies equal hashes.
/// Only called for values that pass [`Value::is_hashable`].
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Boolean(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Integer(i) => {
                2u8.hash(state);
                (*i as f64).to_bits().hash(state);
            }
            Value::Float(f) => {
                2u8.hash(state);
                f.to_bits().hash(state);
            }
            Value::Str(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Value::Function(f) => {
                4u8.hash(state);
                Rc::as_ptr(f).hash(state);
            }
            Value::Builtin(b) => {
                5u8.hash(state);
                b.name.hash(state);
            }
            Value::Array(_) | Value::Dict(_) => {
                unreachable!("unhashable value used as dict key; checked by the evaluator")
            }
        }
    }
}
