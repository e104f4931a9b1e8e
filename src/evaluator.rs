//! Tree-walking evaluator: executes an [`ast::Program`] against an
//! [`Environment`].
//!
//! Non-local exits (`return`, `break`, `continue`) are modeled as an
//! [`Outcome`] threaded through every evaluation step instead of as
//! exceptions. A `return` deep inside an `if`-expression used as a plain
//! statement must still reach the enclosing function call frame, so
//! `eval_expression` produces an `Outcome` too, not just a `Value` —
//! anything that isn't `Outcome::Normal` short-circuits the rest of the
//! expression being evaluated via the local `propagate!` macro.

use std::error::Error;
use std::fmt::{self, Display};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{AssignOp, BinaryOperator, Block, Expression, Program, Statement, UnaryOperator};
use crate::builtins;
use crate::environment::{AssignError, Environment};
use crate::token::Position;
use crate::value::{Function, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub message: String,
    pub position: Option<Position>,
}

impl RuntimeError {
    fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position: Some(position),
        }
    }

    fn without_position(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "at {position}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Error for RuntimeError {}

pub type EvalResult<T> = Result<T, RuntimeError>;

/// What evaluating a statement or expression produced, beyond a plain
/// value: a signal that must propagate up to the nearest frame that knows
/// how to handle it (a loop body for `Break`/`Continue`, a function call
/// frame for `Return`).
enum Outcome {
    Normal(Value),
    Return(Value),
    Break,
    Continue,
}

/// Evaluate `$e` and bind the resulting `Value` to `$e`'s name, returning
/// early with whatever non-`Normal` `Outcome` it produced otherwise. Used
/// at every point a sub-expression's value (rather than its outcome) is
/// needed to keep building the surrounding expression or statement.
macro_rules! propagate {
    ($env:expr, $e:expr) => {
        match eval_expression($e, $env)? {
            Outcome::Normal(value) => value,
            other => return Ok(other),
        }
    };
}

/// Evaluate a whole program, returning the value of its last expression
/// statement, or `Value::Null` if the program has none.
pub fn eval_program(program: &Program, env: &Environment) -> EvalResult<Value> {
    let mut last = Value::Null;
    for statement in &program.statements {
        match eval_statement(statement, env)? {
            Outcome::Normal(value) => last = value,
            Outcome::Return(_) => {
                return Err(RuntimeError::without_position(
                    "'return' outside of a function",
                ))
            }
            Outcome::Break => {
                return Err(RuntimeError::without_position("'break' outside of a loop"))
            }
            Outcome::Continue => {
                return Err(RuntimeError::without_position(
                    "'continue' outside of a loop",
                ))
            }
        }
    }
    Ok(last)
}

fn eval_block(block: &Block, env: &Environment) -> EvalResult<Outcome> {
    let mut last = Value::Null;
    for statement in &block.statements {
        match eval_statement(statement, env)? {
            Outcome::Normal(value) => last = value,
            signal @ (Outcome::Return(_) | Outcome::Break | Outcome::Continue) => {
                return Ok(signal)
            }
        }
    }
    Ok(Outcome::Normal(last))
}

fn eval_statement(statement: &Statement, env: &Environment) -> EvalResult<Outcome> {
    match statement {
        Statement::Let { name, value } => {
            let value = propagate!(env, value);
            env.declare(name, value, false).map_err(|_| {
                RuntimeError::without_position(format!("cannot redeclare constant '{name}'"))
            })?;
            Ok(Outcome::Normal(Value::Null))
        }
        Statement::Const { name, value } => {
            let value = propagate!(env, value);
            env.declare(name, value, true).map_err(|_| {
                RuntimeError::without_position(format!("cannot redeclare constant '{name}'"))
            })?;
            Ok(Outcome::Normal(Value::Null))
        }
        Statement::Assign {
            name,
            operator,
            value,
            position,
        } => {
            let rhs = propagate!(env, value);
            let new_value = match operator {
                AssignOp::Assign => rhs,
                AssignOp::PlusAssign | AssignOp::MinusAssign => {
                    let current = env.get(name).ok_or_else(|| {
                        RuntimeError::new(format!("undefined variable '{name}'"), *position)
                    })?;
                    let op = if *operator == AssignOp::PlusAssign {
                        BinaryOperator::Add
                    } else {
                        BinaryOperator::Subtract
                    };
                    eval_binary_op(op, current, rhs, *position)?
                }
            };
            env.assign(name, new_value).map_err(|err| match err {
                AssignError::Undefined => {
                    RuntimeError::new(format!("undefined variable '{name}'"), *position)
                }
                AssignError::Constant => {
                    RuntimeError::new(format!("cannot assign to constant '{name}'"), *position)
                }
            })?;
            Ok(Outcome::Normal(Value::Null))
        }
        Statement::IndexAssign {
            object,
            index,
            value,
            position,
        } => {
            let target = propagate!(env, object);
            let index = propagate!(env, index);
            let value = propagate!(env, value);
            eval_index_assign(target, index, value, *position)?;
            Ok(Outcome::Normal(Value::Null))
        }
        Statement::Expression(expr) => eval_expression(expr, env),
        Statement::Return(value) => {
            let value = match value {
                Some(expr) => propagate!(env, expr),
                None => Value::Null,
            };
            Ok(Outcome::Return(value))
        }
        Statement::While { condition, body } => eval_while(condition, body, env),
        Statement::For {
            variable,
            iterable,
            body,
        } => eval_for(variable, iterable, body, env),
        Statement::Break => Ok(Outcome::Break),
        Statement::Continue => Ok(Outcome::Continue),
        Statement::FunctionDeclaration {
            name,
            parameters,
            body,
        } => {
            let function = Value::Function(Rc::new(Function {
                parameters: parameters.clone(),
                body: body.clone(),
                env: env.clone(),
                name: Some(name.clone()),
            }));
            env.declare(name, function, false).map_err(|_| {
                RuntimeError::without_position(format!("cannot redeclare constant '{name}'"))
            })?;
            Ok(Outcome::Normal(Value::Null))
        }
    }
}

fn eval_index_assign(
    target: Value,
    index: Value,
    value: Value,
    position: Position,
) -> EvalResult<()> {
    match target {
        Value::Array(array) => {
            let i = expect_array_index(&index, array.borrow().len(), position)?;
            array.borrow_mut()[i] = value;
            Ok(())
        }
        Value::Dict(dict) => {
            if !index.is_hashable() {
                return Err(RuntimeError::new(
                    format!("unhashable type used as dict key: {}", index.type_name()),
                    position,
                ));
            }
            dict.borrow_mut().insert(index, value);
            Ok(())
        }
        other => Err(RuntimeError::new(
            format!("cannot index assign into a {}", other.type_name()),
            position,
        )),
    }
}

fn eval_while(condition: &Expression, body: &Block, env: &Environment) -> EvalResult<Outcome> {
    loop {
        if !propagate!(env, condition).is_truthy() {
            break;
        }
        match eval_block(body, env)? {
            Outcome::Normal(_) | Outcome::Continue => continue,
            Outcome::Break => break,
            signal @ Outcome::Return(_) => return Ok(signal),
        }
    }
    Ok(Outcome::Normal(Value::Null))
}

fn eval_for(
    variable: &str,
    iterable: &Expression,
    body: &Block,
    env: &Environment,
) -> EvalResult<Outcome> {
    let position = expression_position(iterable);
    let iterable_value = propagate!(env, iterable);
    let items = iterate(&iterable_value, position)?;

    for item in items {
        env.declare(variable, item, false).map_err(|_| {
            RuntimeError::without_position(format!("cannot redeclare constant '{variable}'"))
        })?;
        match eval_block(body, env)? {
            Outcome::Normal(_) | Outcome::Continue => continue,
            Outcome::Break => break,
            signal @ Outcome::Return(_) => return Ok(signal),
        }
    }
    Ok(Outcome::Normal(Value::Null))
}

/// Produce the concrete sequence of values a `for` loop walks over. Arrays
/// iterate their elements, strings their characters (as one-character
/// strings), dicts their keys.
fn iterate(value: &Value, position: Position) -> EvalResult<Vec<Value>> {
    match value {
        Value::Array(a) => Ok(a.borrow().clone()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::str(c.to_string())).collect()),
        Value::Dict(d) => Ok(d.borrow().keys().cloned().collect()),
        other => Err(RuntimeError::new(
            format!("{} is not iterable", other.type_name()),
            position,
        )),
    }
}

fn expression_position(expr: &Expression) -> Position {
    match expr {
        Expression::Index { position, .. }
        | Expression::Binary { position, .. }
        | Expression::Call { position, .. } => *position,
        _ => Position::new(0, 0),
    }
}

fn eval_expression(expr: &Expression, env: &Environment) -> EvalResult<Outcome> {
    match expr {
        Expression::Integer(n) => Ok(Outcome::Normal(Value::Integer(*n))),
        Expression::Float(n) => Ok(Outcome::Normal(Value::Float(*n))),
        Expression::Str(s) => Ok(Outcome::Normal(Value::str(s.clone()))),
        Expression::Boolean(b) => Ok(Outcome::Normal(Value::Boolean(*b))),
        Expression::Null => Ok(Outcome::Normal(Value::Null)),
        Expression::Array(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for e in elements {
                values.push(propagate!(env, e));
            }
            Ok(Outcome::Normal(Value::array(values)))
        }
        Expression::Dict(pairs) => {
            let mut map = IndexMap::new();
            for (key_expr, value_expr) in pairs {
                let key = propagate!(env, key_expr);
                if !key.is_hashable() {
                    return Err(RuntimeError::without_position(format!(
                        "unhashable type used as dict key: {}",
                        key.type_name()
                    )));
                }
                let value = propagate!(env, value_expr);
                map.insert(key, value);
            }
            Ok(Outcome::Normal(Value::dict(map)))
        }
        Expression::Identifier(name) => env
            .get(name)
            .or_else(|| builtins::lookup(name))
            .map(Outcome::Normal)
            .ok_or_else(|| RuntimeError::without_position(format!("undefined variable '{name}'"))),
        Expression::Index {
            object,
            index,
            position,
        } => {
            let target = propagate!(env, object);
            let index_value = propagate!(env, index);
            Ok(Outcome::Normal(eval_index_value(
                target,
                index_value,
                *position,
            )?))
        }
        Expression::Unary { operator, operand } => {
            let value = propagate!(env, operand);
            Ok(Outcome::Normal(eval_unary_op(*operator, value)?))
        }
        Expression::Binary {
            operator,
            left,
            right,
            position,
        } => eval_binary(*operator, left, right, env, *position),
        Expression::If {
            condition,
            consequence,
            alternative,
        } => eval_if(condition, consequence, alternative.as_ref(), env),
        Expression::Function {
            parameters,
            body,
            name,
        } => Ok(Outcome::Normal(Value::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: env.clone(),
            name: name.clone(),
        })))),
        Expression::Call {
            function,
            arguments,
            position,
        } => eval_call(function, arguments, env, *position),
    }
}

fn eval_if(
    condition: &Expression,
    consequence: &Block,
    alternative: Option<&Block>,
    env: &Environment,
) -> EvalResult<Outcome> {
    if propagate!(env, condition).is_truthy() {
        return eval_block(consequence, env);
    }
    match alternative {
        Some(block) => eval_block(block, env),
        None => Ok(Outcome::Normal(Value::Null)),
    }
}

fn eval_index_value(target: Value, index_value: Value, position: Position) -> EvalResult<Value> {
    match &target {
        Value::Array(array) => {
            let i = expect_array_index(&index_value, array.borrow().len(), position)?;
            Ok(array.borrow()[i].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let i = expect_array_index(&index_value, chars.len(), position)?;
            Ok(Value::str(chars[i].to_string()))
        }
        Value::Dict(dict) => {
            if !index_value.is_hashable() {
                return Err(RuntimeError::new(
                    format!(
                        "unhashable type used as dict key: {}",
                        index_value.type_name()
                    ),
                    position,
                ));
            }
            dict.borrow().get(&index_value).cloned().ok_or_else(|| {
                RuntimeError::new(
                    format!("key not found: {}", index_value.to_repr_string()),
                    position,
                )
            })
        }
        other => Err(RuntimeError::new(
            format!("cannot index a {}", other.type_name()),
            position,
        )),
    }
}

fn expect_array_index(value: &Value, len: usize, position: Position) -> EvalResult<usize> {
    let Value::Integer(i) = value else {
        return Err(RuntimeError::new(
            format!("index must be an integer, got {}", value.type_name()),
            position,
        ));
    };
    let normalized = if *i < 0 { *i + len as i64 } else { *i };
    if normalized < 0 || normalized as usize >= len {
        return Err(RuntimeError::new(
            format!("index {i} out of bounds for length {len}"),
            position,
        ));
    }
    Ok(normalized as usize)
}

fn eval_unary_op(operator: UnaryOperator, value: Value) -> EvalResult<Value> {
    match (operator, &value) {
        (UnaryOperator::Negate, Value::Integer(i)) => Ok(Value::Integer(-i)),
        (UnaryOperator::Negate, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOperator::Negate, other) => Err(RuntimeError::without_position(format!(
            "cannot negate a {}",
            other.type_name()
        ))),
        (UnaryOperator::Not, _) => Ok(Value::Boolean(!value.is_truthy())),
    }
}

fn eval_binary(
    operator: BinaryOperator,
    left: &Expression,
    right: &Expression,
    env: &Environment,
    position: Position,
) -> EvalResult<Outcome> {
    // `and`/`or` short-circuit: the right operand is only evaluated (and its
    // signal only observed) if the left doesn't already decide the result.
    if operator == BinaryOperator::And {
        let lhs = propagate!(env, left);
        if !lhs.is_truthy() {
            return Ok(Outcome::Normal(lhs));
        }
        return eval_expression(right, env);
    }
    if operator == BinaryOperator::Or {
        let lhs = propagate!(env, left);
        if lhs.is_truthy() {
            return Ok(Outcome::Normal(lhs));
        }
        return eval_expression(right, env);
    }

    let lhs = propagate!(env, left);
    let rhs = propagate!(env, right);
    Ok(Outcome::Normal(eval_binary_op(operator, lhs, rhs, position)?))
}

fn eval_binary_op(
    operator: BinaryOperator,
    left: Value,
    right: Value,
    position: Position,
) -> EvalResult<Value> {
    use BinaryOperator::*;

    match operator {
        Equal => return Ok(Value::Boolean(left == right)),
        NotEqual => return Ok(Value::Boolean(left != right)),
        _ => {}
    }

    match operator {
        Add => eval_add(left, right, position),
        Multiply => eval_multiply(left, right, position),
        Subtract | Divide | Modulo | Power => eval_arithmetic(operator, left, right, position),
        Less | Greater | LessEqual | GreaterEqual => eval_compare(operator, left, right, position),
        And | Or => unreachable!("handled by eval_binary's short-circuit path"),
        Equal | NotEqual => unreachable!("handled above"),
    }
}

fn eval_add(left: Value, right: Value, position: Position) -> EvalResult<Value> {
    match (&left, &right) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{a}{b}"))),
        (Value::Array(a), Value::Array(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::array(items))
        }
        (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::str(format!(
            "{}{}",
            left.to_display_string(),
            right.to_display_string()
        ))),
        _ => eval_arithmetic(BinaryOperator::Add, left, right, position),
    }
}

/// `*` additionally accepts `(string, integer)` and `(array, integer)`,
/// repeating the left operand that many times.
fn eval_multiply(left: Value, right: Value, position: Position) -> EvalResult<Value> {
    match (&left, &right) {
        (Value::Str(s), Value::Integer(n)) | (Value::Integer(n), Value::Str(s)) => {
            Ok(Value::str(s.repeat((*n).max(0) as usize)))
        }
        (Value::Array(a), Value::Integer(n)) | (Value::Integer(n), Value::Array(a)) => {
            let item = a.borrow();
            let mut items = Vec::with_capacity(item.len() * (*n).max(0) as usize);
            for _ in 0..(*n).max(0) {
                items.extend(item.iter().cloned());
            }
            Ok(Value::array(items))
        }
        _ => eval_arithmetic(BinaryOperator::Multiply, left, right, position),
    }
}

fn eval_arithmetic(
    operator: BinaryOperator,
    left: Value,
    right: Value,
    position: Position,
) -> EvalResult<Value> {
    use BinaryOperator::*;

    match (&left, &right) {
        (Value::Integer(a), Value::Integer(b)) => match operator {
            Add => Ok(Value::Integer(a.wrapping_add(*b))),
            Subtract => Ok(Value::Integer(a.wrapping_sub(*b))),
            Multiply => Ok(Value::Integer(a.wrapping_mul(*b))),
            // `/` is always true (floating-point) division, even for two
            // integers; there is no separate integer-division operator.
            Divide => {
                if *b == 0 {
                    Err(RuntimeError::new("division by zero", position))
                } else {
                    Ok(Value::Float(*a as f64 / *b as f64))
                }
            }
            // Floor modulo: the result takes the sign of the divisor,
            // matching the host language's `%` rather than Rust's `%`.
            Modulo => {
                if *b == 0 {
                    Err(RuntimeError::new("division by zero", position))
                } else {
                    let r = a % b;
                    let r = if r != 0 && (r < 0) != (*b < 0) { r + b } else { r };
                    Ok(Value::Integer(r))
                }
            }
            Power => {
                if *b < 0 {
                    Ok(Value::Float((*a as f64).powi(*b as i32)))
                } else {
                    Ok(Value::Integer(a.pow(*b as u32)))
                }
            }
            _ => unreachable!("only arithmetic operators reach eval_arithmetic"),
        },
        (a, b) if is_numeric(a) && is_numeric(b) => {
            let a = as_f64(a);
            let b = as_f64(b);
            match operator {
                Add => Ok(Value::Float(a + b)),
                Subtract => Ok(Value::Float(a - b)),
                Multiply => Ok(Value::Float(a * b)),
                Divide => {
                    if b == 0.0 {
                        Err(RuntimeError::new("division by zero", position))
                    } else {
                        Ok(Value::Float(a / b))
                    }
                }
                Modulo => {
                    if b == 0.0 {
                        Err(RuntimeError::new("division by zero", position))
                    } else {
                        let r = a % b;
                        let r = if r != 0.0 && r.is_sign_negative() != b.is_sign_negative() {
                            r + b
                        } else {
                            r
                        };
                        Ok(Value::Float(r))
                    }
                }
                Power => Ok(Value::Float(a.powf(b))),
                _ => unreachable!("only arithmetic operators reach eval_arithmetic"),
            }
        }
        _ => Err(RuntimeError::new(
            format!(
                "unsupported operand types for arithmetic: {} and {}",
                left.type_name(),
                right.type_name()
            ),
            position,
        )),
    }
}

fn eval_compare(
    operator: BinaryOperator,
    left: Value,
    right: Value,
    position: Position,
) -> EvalResult<Value> {
    use BinaryOperator::*;

    let ordering = match (&left, &right) {
        (a, b) if is_numeric(a) && is_numeric(b) => as_f64(a).partial_cmp(&as_f64(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => None,
    };

    let Some(ordering) = ordering else {
        return Err(RuntimeError::new(
            format!(
                "unsupported operand types for comparison: {} and {}",
                left.type_name(),
                right.type_name()
            ),
            position,
        ));
    };

    use std::cmp::Ordering::*;
    let result = match operator {
        Less => ordering == Less,
        Greater => ordering == Greater,
        LessEqual => ordering != Greater,
        GreaterEqual => ordering != Less,
        _ => unreachable!("only comparison operators reach eval_compare"),
    };
    Ok(Value::Boolean(result))
}

fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Integer(_) | Value::Float(_))
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        _ => unreachable!("caller checked is_numeric first"),
    }
}

fn eval_call(
    function: &Expression,
    arguments: &[Expression],
    env: &Environment,
    position: Position,
) -> EvalResult<Outcome> {
    let callee = propagate!(env, function);
    let mut args = Vec::with_capacity(arguments.len());
    for a in arguments {
        args.push(propagate!(env, a));
    }

    let result = match callee {
        Value::Builtin(builtin) => {
            (builtin.func)(args).map_err(|message| RuntimeError::new(message, position))?
        }
        Value::Function(function) => call_function(&function, args, position)?,
        other => {
            return Err(RuntimeError::new(
                format!("{} is not callable", other.type_name()),
                position,
            ))
        }
    };
    Ok(Outcome::Normal(result))
}

fn call_function(function: &Function, args: Vec<Value>, position: Position) -> EvalResult<Value> {
    if args.len() != function.parameters.len() {
        return Err(RuntimeError::new(
            format!(
                "{} takes {} argument(s) but {} were given",
                function.display_name(),
                function.parameters.len(),
                args.len()
            ),
            position,
        ));
    }

    let call_env = Environment::child(&function.env);
    for (name, value) in function.parameters.iter().zip(args) {
        call_env
            .declare(name, value, false)
            .expect("function parameters bind in a fresh call scope");
    }

    match eval_block(&function.body, &call_env)? {
        Outcome::Normal(value) => Ok(value),
        Outcome::Return(value) => Ok(value),
        Outcome::Break => Err(RuntimeError::new("'break' outside of a loop", position)),
        Outcome::Continue => Err(RuntimeError::new("'continue' outside of a loop", position)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run(src: &str) -> EvalResult<Value> {
        let tokens = Lexer::new(src).tokenize().expect("lex");
        let program = Parser::new(tokens).parse().expect("parse");
        let env = Environment::new();
        eval_program(&program, &env)
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(run("1 + 2 * 3;").unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_power_right_associative() {
        // 2 ** (3 ** 2) == 2 ** 9 == 512, not (2 ** 3) ** 2 == 64.
        assert_eq!(run("2 ** 3 ** 2;").unwrap(), Value::Integer(512));
    }

    #[test]
    fn test_division_is_always_true_division() {
        // `/` yields a float even when the inputs divide evenly.
        assert_eq!(run("4 / 2;").unwrap(), Value::Float(2.0));
        assert_eq!(run("7 / 2;").unwrap(), Value::Float(3.5));
    }

    #[test]
    fn test_modulo_takes_sign_of_divisor() {
        assert_eq!(run("-7 % 3;").unwrap(), Value::Integer(2));
        assert_eq!(run("7 % -3;").unwrap(), Value::Integer(-2));
    }

    #[test]
    fn test_string_concat() {
        assert_eq!(run(r#""foo" + "bar";"#).unwrap(), Value::str("foobar"));
    }

    #[test]
    fn test_integer_float_equality() {
        assert_eq!(run("2 == 2.0;").unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_division_by_zero_errors() {
        assert!(run("1 / 0;").is_err());
    }

    #[test]
    fn test_closures_capture_environment() {
        let result = run(
            r#"
            fn make_adder(x) {
                fn(y) { x + y }
            }
            let add5 = make_adder(5);
            add5(10);
            "#,
        )
        .unwrap();
        assert_eq!(result, Value::Integer(15));
    }

    #[test]
    fn test_while_break_and_continue() {
        let result = run(
            r#"
            let i = 0;
            let sum = 0;
            while i < 10 {
                i = i + 1;
                if i == 5 {
                    continue;
                }
                if i == 8 {
                    break;
                }
                sum = sum + i;
            }
            sum;
            "#,
        )
        .unwrap();
        // 1+2+3+4+6+7 = 23 (5 skipped via continue, loop stops before 8 counts)
        assert_eq!(result, Value::Integer(23));
    }

    #[test]
    fn test_for_over_array() {
        let result = run(
            r#"
            let total = 0;
            for x in [1, 2, 3] {
                total = total + x;
            }
            total;
            "#,
        )
        .unwrap();
        assert_eq!(result, Value::Integer(6));
    }

    #[test]
    fn test_array_index_and_assign() {
        let result = run(
            r#"
            let a = [1, 2, 3];
            a[1] = 99;
            a[1];
            "#,
        )
        .unwrap();
        assert_eq!(result, Value::Integer(99));
    }

    #[test]
    fn test_negative_index() {
        assert_eq!(run("[1, 2, 3][-1];").unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_dict_literal_and_index() {
        let result = run(r#"{"a": 1, "b": 2}["b"];"#).unwrap();
        assert_eq!(result, Value::Integer(2));
    }

    #[test]
    fn test_const_reassignment_errors() {
        assert!(run("const x = 1; x = 2;").is_err());
    }

    #[test]
    fn test_function_arity_mismatch_errors() {
        assert!(run("fn f(a, b) { a + b } f(1);").is_err());
    }

    #[test]
    fn test_if_as_expression_value() {
        assert_eq!(
            run("let x = if true { 1 } else { 2 }; x;").unwrap(),
            Value::Integer(1)
        );
    }

    #[test]
    fn test_string_and_array_repeat() {
        assert_eq!(run(r#""ab" * 3;"#).unwrap(), Value::str("ababab"));
        assert_eq!(
            run("[1, 2] * 2;").unwrap(),
            Value::array(vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(1),
                Value::Integer(2),
            ])
        );
    }

    #[test]
    fn test_return_from_nested_block_short_circuits() {
        let result = run(
            r#"
            fn f(x) {
                if x > 0 {
                    return "positive";
                }
                "non-positive"
            }
            f(5);
            "#,
        )
        .unwrap();
        assert_eq!(result, Value::str("positive"));
    }

    #[test]
    fn test_return_inside_while_inside_function() {
        let result = run(
            r#"
            fn first_even(items) {
                for x in items {
                    if x % 2 == 0 {
                        return x;
                    }
                }
                null
            }
            first_even([1, 3, 4, 5]);
            "#,
        )
        .unwrap();
        assert_eq!(result, Value::Integer(4));
    }

    #[test]
    fn test_let_and_fn_redeclaring_a_constant_errors() {
        assert!(run("const x = 1; let x = 2;").is_err());
        assert!(run("const f = 1; fn f() { 1 }").is_err());
    }

    #[test]
    fn test_blocks_do_not_introduce_a_new_scope() {
        let result = run(
            r#"
            if true {
                let r = 5;
            }
            r;
            "#,
        )
        .unwrap();
        assert_eq!(result, Value::Integer(5));
    }

    #[test]
    fn test_while_body_bindings_escape_the_loop() {
        let result = run(
            r#"
            let i = 0;
            while i < 3 {
                let last = i;
                i = i + 1;
            }
            last;
            "#,
        )
        .unwrap();
        assert_eq!(result, Value::Integer(2));
    }

    #[test]
    fn test_plus_concatenates_when_either_operand_is_a_string() {
        assert_eq!(run(r#""count: " + 42;"#).unwrap(), Value::str("count: 42"));
        assert_eq!(run(r#"5 + "x";"#).unwrap(), Value::str("5x"));
    }
}
