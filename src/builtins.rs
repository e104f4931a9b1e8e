//! The standard library of native functions available to every program
//! without an explicit import, looked up by the evaluator whenever an
//! identifier resolves to nothing in the environment chain.

use std::io::{self, Write};
use std::rc::Rc;

use crate::value::{Builtin, Value};

type BuiltinResult = Result<Value, String>;

/// Resolve `name` to a builtin, if one by that name exists.
pub fn lookup(name: &str) -> Option<Value> {
    builtin(name).map(Value::Builtin)
}

fn builtin(name: &str) -> Option<Builtin> {
    let (name, func): (&'static str, Rc<dyn Fn(Vec<Value>) -> BuiltinResult>) = match name {
        "print" => ("print", Rc::new(print_values)),
        "println" => ("println", Rc::new(println_values)),
        "input" => ("input", Rc::new(input)),
        "len" => ("len", Rc::new(len)),
        "type" => ("type", Rc::new(type_of)),
        "str" => ("str", Rc::new(to_str)),
        "int" => ("int", Rc::new(to_int)),
        "float" => ("float", Rc::new(to_float)),
        "range" => ("range", Rc::new(range)),
        "push" => ("push", Rc::new(push)),
        "pop" => ("pop", Rc::new(pop)),
        "first" => ("first", Rc::new(first)),
        "last" => ("last", Rc::new(last)),
        "rest" => ("rest", Rc::new(rest)),
        "keys" => ("keys", Rc::new(keys)),
        "values" => ("values", Rc::new(values)),
        "abs" => ("abs", Rc::new(abs)),
        "min" => ("min", Rc::new(min)),
        "max" => ("max", Rc::new(max)),
        "sum" => ("sum", Rc::new(sum)),
        "sorted" => ("sorted", Rc::new(sorted)),
        "reversed" => ("reversed", Rc::new(reversed)),
        "join" => ("join", Rc::new(join)),
        "split" => ("split", Rc::new(split)),
        "upper" => ("upper", Rc::new(upper)),
        "lower" => ("lower", Rc::new(lower)),
        "strip" => ("strip", Rc::new(strip)),
        "replace" => ("replace", Rc::new(replace)),
        "contains" => ("contains", Rc::new(contains)),
        _ => return None,
    };
    Some(Builtin { name, func })
}

fn arity_error(name: &str, expected: &str, got: usize) -> String {
    format!("{name} expects {expected}, got {got} argument(s)")
}

fn one_arg(name: &str, args: Vec<Value>) -> Result<Value, String> {
    let mut args = args;
    if args.len() != 1 {
        return Err(arity_error(name, "1 argument", args.len()));
    }
    Ok(args.remove(0))
}

fn print_values(args: Vec<Value>) -> BuiltinResult {
    let text = args
        .iter()
        .map(Value::to_display_string)
        .collect::<Vec<_>>()
        .join(" ");
    print!("{text}");
    io::stdout().flush().map_err(|e| e.to_string())?;
    Ok(Value::Null)
}

fn println_values(args: Vec<Value>) -> BuiltinResult {
    let text = args
        .iter()
        .map(Value::to_display_string)
        .collect::<Vec<_>>()
        .join(" ");
    println!("{text}");
    Ok(Value::Null)
}

fn input(args: Vec<Value>) -> BuiltinResult {
    if !args.is_empty() {
        print_values(args)?;
    }
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .map_err(|e| e.to_string())?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::str(line))
}

fn len(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("len", args)?;
    match value {
        Value::Str(s) => Ok(Value::Integer(s.chars().count() as i64)),
        Value::Array(a) => Ok(Value::Integer(a.borrow().len() as i64)),
        Value::Dict(d) => Ok(Value::Integer(d.borrow().len() as i64)),
        other => Err(format!("len() does not accept a {}", other.type_name())),
    }
}

fn type_of(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("type", args)?;
    Ok(Value::str(value.type_name()))
}

fn to_str(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("str", args)?;
    Ok(Value::str(value.to_display_string()))
}

fn to_int(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("int", args)?;
    match value {
        Value::Integer(i) => Ok(Value::Integer(i)),
        Value::Float(f) => Ok(Value::Integer(f as i64)),
        Value::Boolean(b) => Ok(Value::Integer(b as i64)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| format!("cannot convert \"{s}\" to an integer")),
        other => Err(format!("cannot convert a {} to an integer", other.type_name())),
    }
}

fn to_float(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("float", args)?;
    match value {
        Value::Integer(i) => Ok(Value::Float(i as f64)),
        Value::Float(f) => Ok(Value::Float(f)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| format!("cannot convert \"{s}\" to a float")),
        other => Err(format!("cannot convert a {} to a float", other.type_name())),
    }
}

/// `range(stop)`, `range(start, stop)`, or `range(start, stop, step)`,
/// mirroring the three-argument forms of the scripting language's model.
fn range(args: Vec<Value>) -> BuiltinResult {
    let ints: Vec<i64> = args
        .iter()
        .map(|v| match v {
            Value::Integer(i) => Ok(*i),
            other => Err(format!(
                "range() arguments must be integers, got {}",
                other.type_name()
            )),
        })
        .collect::<Result<_, _>>()?;

    let (start, stop, step) = match ints[..] {
        [stop] => (0, stop, 1),
        [start, stop] => (start, stop, 1),
        [start, stop, step] => (start, stop, step),
        _ => return Err(arity_error("range", "1 to 3 arguments", args.len())),
    };

    if step == 0 {
        return Err("range() step must not be zero".to_string());
    }

    let mut values = vec![];
    let mut i = start;
    if step > 0 {
        while i < stop {
            values.push(Value::Integer(i));
            i += step;
        }
    } else {
        while i > stop {
            values.push(Value::Integer(i));
            i += step;
        }
    }
    Ok(Value::array(values))
}

fn push(args: Vec<Value>) -> BuiltinResult {
    if args.len() != 2 {
        return Err(arity_error("push", "2 arguments", args.len()));
    }
    let Value::Array(array) = &args[0] else {
        return Err(format!("push() expects an array, got {}", args[0].type_name()));
    };
    array.borrow_mut().push(args[1].clone());
    Ok(args[0].clone())
}

fn pop(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("pop", args)?;
    let Value::Array(array) = &value else {
        return Err(format!("pop() expects an array, got {}", value.type_name()));
    };
    array
        .borrow_mut()
        .pop()
        .ok_or_else(|| "pop() called on an empty array".to_string())
}

fn first(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("first", args)?;
    match &value {
        Value::Array(a) => a
            .borrow()
            .first()
            .cloned()
            .ok_or_else(|| "first() called on an empty array".to_string()),
        other => Err(format!("first() expects an array, got {}", other.type_name())),
    }
}

fn last(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("last", args)?;
    match &value {
        Value::Array(a) => a
            .borrow()
            .last()
            .cloned()
            .ok_or_else(|| "last() called on an empty array".to_string()),
        other => Err(format!("last() expects an array, got {}", other.type_name())),
    }
}

fn rest(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("rest", args)?;
    match &value {
        Value::Array(a) => {
            let items = a.borrow();
            Ok(Value::array(items.iter().skip(1).cloned().collect()))
        }
        other => Err(format!("rest() expects an array, got {}", other.type_name())),
    }
}

fn keys(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("keys", args)?;
    match &value {
        Value::Dict(d) => Ok(Value::array(d.borrow().keys().cloned().collect())),
        other => Err(format!("keys() expects a dict, got {}", other.type_name())),
    }
}

fn values(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("values", args)?;
    match &value {
        Value::Dict(d) => Ok(Value::array(d.borrow().values().cloned().collect())),
        other => Err(format!("values() expects a dict, got {}", other.type_name())),
    }
}

fn abs(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("abs", args)?;
    match value {
        Value::Integer(i) => Ok(Value::Integer(i.abs())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(format!("abs() expects a number, got {}", other.type_name())),
    }
}

fn numeric_elements(name: &str, values: &[Value]) -> Result<Vec<f64>, String> {
    values
        .iter()
        .map(|v| match v {
            Value::Integer(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            other => Err(format!(
                "{name}() expects numbers, found a {}",
                other.type_name()
            )),
        })
        .collect()
}

/// Accepts either a single array argument or multiple positional numeric
/// arguments, mirroring Python's `min`.
fn min(args: Vec<Value>) -> BuiltinResult {
    if args.is_empty() {
        return Err(arity_error("min", "at least 1 argument", 0));
    }
    let values = match &args[..] {
        [Value::Array(a)] => a.borrow().clone(),
        _ => args.clone(),
    };
    let nums = numeric_elements("min", &values)?;
    nums.into_iter()
        .reduce(f64::min)
        .map(wrap_number_like(&values))
        .ok_or_else(|| "min() called on an empty array".to_string())
}

/// Accepts either a single array argument or multiple positional numeric
/// arguments, mirroring Python's `max`.
fn max(args: Vec<Value>) -> BuiltinResult {
    if args.is_empty() {
        return Err(arity_error("max", "at least 1 argument", 0));
    }
    let values = match &args[..] {
        [Value::Array(a)] => a.borrow().clone(),
        _ => args.clone(),
    };
    let nums = numeric_elements("max", &values)?;
    nums.into_iter()
        .reduce(f64::max)
        .map(wrap_number_like(&values))
        .ok_or_else(|| "max() called on an empty array".to_string())
}

fn sum(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("sum", args)?;
    let Value::Array(a) = &value else {
        return Err(format!("sum() expects an array, got {}", value.type_name()));
    };
    let items = a.borrow().clone();
    let nums = numeric_elements("sum", &items)?;
    let total: f64 = nums.iter().sum();
    Ok(wrap_number_like(&items)(total))
}

/// All-integer inputs stay integers through `min`/`max`/`sum`; any float
/// in the mix promotes the result to a float, matching how the
/// arithmetic operators themselves behave.
fn wrap_number_like(values: &[Value]) -> impl Fn(f64) -> Value {
    let all_integers = values.iter().all(|v| matches!(v, Value::Integer(_)));
    move |n: f64| {
        if all_integers {
            Value::Integer(n as i64)
        } else {
            Value::Float(n)
        }
    }
}

fn sorted(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("sorted", args)?;
    let Value::Array(a) = &value else {
        return Err(format!("sorted() expects an array, got {}", value.type_name()));
    };
    let mut items = a.borrow().clone();
    items.sort_by(|a, b| compare_values(a, b));
    Ok(Value::array(items))
}

fn reversed(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("reversed", args)?;
    let Value::Array(a) = &value else {
        return Err(format!("reversed() expects an array, got {}", value.type_name()));
    };
    let mut items = a.borrow().clone();
    items.reverse();
    Ok(Value::array(items))
}

fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (a, b) => {
            let (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) =
                (a, b)
            else {
                return Ordering::Equal;
            };
            let as_f = |v: &Value| match v {
                Value::Integer(i) => *i as f64,
                Value::Float(f) => *f,
                _ => 0.0,
            };
            as_f(a).partial_cmp(&as_f(b)).unwrap_or(Ordering::Equal)
        }
    }
}

fn join(args: Vec<Value>) -> BuiltinResult {
    if args.len() != 2 {
        return Err(arity_error("join", "2 arguments", args.len()));
    }
    let Value::Array(array) = &args[0] else {
        return Err(format!("join() expects an array, got {}", args[0].type_name()));
    };
    let Value::Str(sep) = &args[1] else {
        return Err(format!(
            "join() expects a string separator, got {}",
            args[1].type_name()
        ));
    };
    let parts: Vec<String> = array.borrow().iter().map(Value::to_display_string).collect();
    Ok(Value::str(parts.join(sep)))
}

fn split(args: Vec<Value>) -> BuiltinResult {
    if args.len() != 2 {
        return Err(arity_error("split", "2 arguments", args.len()));
    }
    let Value::Str(s) = &args[0] else {
        return Err(format!("split() expects a string, got {}", args[0].type_name()));
    };
    let Value::Str(sep) = &args[1] else {
        return Err(format!(
            "split() expects a string separator, got {}",
            args[1].type_name()
        ));
    };
    let parts = if sep.is_empty() {
        s.chars().map(|c| Value::str(c.to_string())).collect()
    } else {
        s.split(sep.as_ref()).map(Value::str).collect()
    };
    Ok(Value::array(parts))
}

fn upper(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("upper", args)?;
    let Value::Str(s) = &value else {
        return Err(format!("upper() expects a string, got {}", value.type_name()));
    };
    Ok(Value::str(s.to_uppercase()))
}

fn lower(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("lower", args)?;
    let Value::Str(s) = &value else {
        return Err(format!("lower() expects a string, got {}", value.type_name()));
    };
    Ok(Value::str(s.to_lowercase()))
}

fn strip(args: Vec<Value>) -> BuiltinResult {
    let value = one_arg("strip", args)?;
    let Value::Str(s) = &value else {
        return Err(format!("strip() expects a string, got {}", value.type_name()));
    };
    Ok(Value::str(s.trim().to_string()))
}

fn replace(args: Vec<Value>) -> BuiltinResult {
    if args.len() != 3 {
        return Err(arity_error("replace", "3 arguments", args.len()));
    }
    let (Value::Str(s), Value::Str(from), Value::Str(to)) = (&args[0], &args[1], &args[2]) else {
        return Err("replace() expects three strings".to_string());
    };
    Ok(Value::str(s.replace(from.as_ref(), to)))
}

fn contains(args: Vec<Value>) -> BuiltinResult {
    if args.len() != 2 {
        return Err(arity_error("contains", "2 arguments", args.len()));
    }
    match &args[0] {
        Value::Str(s) => match &args[1] {
            Value::Str(needle) => Ok(Value::Boolean(s.contains(needle.as_ref()))),
            other => Err(format!(
                "contains() on a string expects a string needle, got {}",
                other.type_name()
            )),
        },
        Value::Array(a) => Ok(Value::Boolean(a.borrow().iter().any(|v| v == &args[1]))),
        Value::Dict(d) => {
            if !args[1].is_hashable() {
                return Ok(Value::Boolean(false));
            }
            Ok(Value::Boolean(d.borrow().contains_key(&args[1])))
        }
        other => Err(format!(
            "contains() does not accept a {}",
            other.type_name()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Vec<Value>) -> BuiltinResult {
        (builtin(name).expect("builtin exists").func)(args)
    }

    #[test]
    fn test_len_on_string_and_array() {
        assert_eq!(call("len", vec![Value::str("hello")]), Ok(Value::Integer(5)));
        assert_eq!(
            call("len", vec![Value::array(vec![Value::Integer(1), Value::Integer(2)])]),
            Ok(Value::Integer(2))
        );
    }

    #[test]
    fn test_range_one_two_three_args() {
        assert_eq!(
            call("range", vec![Value::Integer(3)]).unwrap(),
            Value::array(vec![Value::Integer(0), Value::Integer(1), Value::Integer(2)])
        );
        assert_eq!(
            call("range", vec![Value::Integer(1), Value::Integer(4)]).unwrap(),
            Value::array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
        assert_eq!(
            call(
                "range",
                vec![Value::Integer(10), Value::Integer(0), Value::Integer(-2)]
            )
            .unwrap(),
            Value::array(vec![
                Value::Integer(10),
                Value::Integer(8),
                Value::Integer(6),
                Value::Integer(4),
                Value::Integer(2),
            ])
        );
    }

    #[test]
    fn test_push_mutates_and_returns_array() {
        let array = Value::array(vec![Value::Integer(1)]);
        let result = call("push", vec![array.clone(), Value::Integer(2)]).unwrap();
        assert_eq!(result, Value::array(vec![Value::Integer(1), Value::Integer(2)]));
        assert_eq!(array, Value::array(vec![Value::Integer(1), Value::Integer(2)]));
    }

    #[test]
    fn test_pop_on_empty_array_errors() {
        assert!(call("pop", vec![Value::array(vec![])]).is_err());
    }

    #[test]
    fn test_sorted_and_reversed_do_not_mutate() {
        let array = Value::array(vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)]);
        let sorted_result = call("sorted", vec![array.clone()]).unwrap();
        assert_eq!(
            sorted_result,
            Value::array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
        assert_eq!(
            array,
            Value::array(vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)])
        );
    }

    #[test]
    fn test_sum_promotes_to_float_when_mixed() {
        assert_eq!(
            call(
                "sum",
                vec![Value::array(vec![Value::Integer(1), Value::Float(1.5)])]
            ),
            Ok(Value::Float(2.5))
        );
        assert_eq!(
            call(
                "sum",
                vec![Value::array(vec![Value::Integer(1), Value::Integer(2)])]
            ),
            Ok(Value::Integer(3))
        );
    }

    #[test]
    fn test_join_and_split_roundtrip() {
        let array = Value::array(vec![Value::str("a"), Value::str("b"), Value::str("c")]);
        let joined = call("join", vec![array, Value::str(",")]).unwrap();
        assert_eq!(joined, Value::str("a,b,c"));

        let split_result = call("split", vec![Value::str("a,b,c"), Value::str(",")]).unwrap();
        assert_eq!(
            split_result,
            Value::array(vec![Value::str("a"), Value::str("b"), Value::str("c")])
        );
    }

    #[test]
    fn test_contains_across_types() {
        assert_eq!(
            call("contains", vec![Value::str("hello"), Value::str("ell")]),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            call(
                "contains",
                vec![
                    Value::array(vec![Value::Integer(1), Value::Integer(2)]),
                    Value::Integer(2)
                ]
            ),
            Ok(Value::Boolean(true))
        );
    }

    #[test]
    fn test_unknown_builtin_is_none() {
        assert!(builtin("does_not_exist").is_none());
    }

    #[test]
    fn test_min_max_accept_either_an_array_or_positional_args() {
        assert_eq!(
            call(
                "min",
                vec![Value::array(vec![
                    Value::Integer(3),
                    Value::Integer(1),
                    Value::Integer(2),
                ])]
            ),
            Ok(Value::Integer(1))
        );
        assert_eq!(
            call(
                "min",
                vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)]
            ),
            Ok(Value::Integer(1))
        );
        assert_eq!(
            call(
                "max",
                vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)]
            ),
            Ok(Value::Integer(3))
        );
    }
}
