//! The dynamically-typed `Value` and its operator matrix (§4.2).
//!
//! `Value` is the sum type `{Number | String}` that every program variable
//! holds. The matrix in §4.2 is this module's actual semantics; it is
//! expressed here as a small dispatch keyed on `(op, lhs kind, rhs kind)`
//! rather than as a combinatorial set of per-type-pair overloads (§9).

use core::fmt;

use crate::error::{EvalOutcome, ExecutionError};
use crate::number::Number;

/// A dynamically-typed program value: either a [`Number`] or a string.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A fixed-point number.
    Number(Number),
    /// A Unicode string.
    String(String),
}

impl Default for Value {
    /// The source language's default-initialized variable: the number
    /// zero. Not every caller wants this (see [`crate::eval::VariableLookup`]),
    /// but it is the one sensible default for the type itself.
    fn default() -> Self {
        Self::Number(Number::ZERO)
    }
}

impl Value {
    /// A human-readable type name, used only in static type-error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }

    /// Whether a value is truthy for `and`/`or`: a `Number` is false only
    /// when its raw value is zero; every `String` (including the empty
    /// string) is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => n.raw() != 0,
            Self::String(_) => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// A binary operator from §4.2's matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `^`
    Pow,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `and`
    And,
    /// `or`
    Or,
}

/// A unary operator applicable uniformly to one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// Arithmetic/string negation family member: `-`.
    Negate,
    /// Logical `not`.
    Not,
    /// `abs`
    Abs,
    /// `sqrt`
    Sqrt,
    /// `sin`
    Sin,
    /// `cos`
    Cos,
    /// `tan`
    Tan,
    /// `asin`
    ArcSin,
    /// `acos`
    ArcCos,
    /// `atan`
    ArcTan,
    /// `!` postfix factorial.
    Factorial,
}

/// Applies a binary operator to two values per the §4.2 matrix.
#[must_use]
pub fn apply_binary(op: BinOp, lhs: Value, rhs: Value) -> EvalOutcome<Value> {
    match op {
        BinOp::Add => add(lhs, rhs),
        BinOp::Sub => sub(lhs, rhs),
        BinOp::Mul => numeric_binop(lhs, rhs, "multiply", |a, b| Ok(a * b)),
        BinOp::Div => numeric_binop(lhs, rhs, "divide", Number::checked_div),
        BinOp::Mod => numeric_binop(lhs, rhs, "take the modulus of", Number::checked_rem),
        BinOp::Pow => numeric_binop(lhs, rhs, "exponentiate", |a, b| Ok(a.pow(b))),
        BinOp::Lt => EvalOutcome::Ok(compare(lhs, rhs, |o| o == core::cmp::Ordering::Less)),
        BinOp::Gt => EvalOutcome::Ok(compare(lhs, rhs, |o| o == core::cmp::Ordering::Greater)),
        BinOp::Le => EvalOutcome::Ok(compare(lhs, rhs, |o| o != core::cmp::Ordering::Greater)),
        BinOp::Ge => EvalOutcome::Ok(compare(lhs, rhs, |o| o != core::cmp::Ordering::Less)),
        BinOp::Eq => EvalOutcome::Ok(Value::Number(Number::from_bool(values_equal(&lhs, &rhs)))),
        BinOp::Ne => EvalOutcome::Ok(Value::Number(Number::from_bool(!values_equal(&lhs, &rhs)))),
        BinOp::And => {
            EvalOutcome::Ok(Value::Number(Number::from_bool(lhs.is_truthy() && rhs.is_truthy())))
        }
        BinOp::Or => {
            EvalOutcome::Ok(Value::Number(Number::from_bool(lhs.is_truthy() || rhs.is_truthy())))
        }
    }
}

/// Applies a unary operator to a value.
#[must_use]
pub fn apply_unary(op: UnOp, value: Value) -> EvalOutcome<Value> {
    match op {
        UnOp::Negate => numeric_unary(value, "negate", |n| -n),
        UnOp::Not => EvalOutcome::Ok(Value::Number(Number::from_bool(!value.is_truthy()))),
        UnOp::Abs => numeric_unary(value, "take the absolute value of", Number::abs),
        UnOp::Sqrt => numeric_unary(value, "take the square root of", Number::sqrt),
        UnOp::Sin => numeric_unary(value, "take the sine of", Number::sin),
        UnOp::Cos => numeric_unary(value, "take the cosine of", Number::cos),
        UnOp::Tan => numeric_unary(value, "take the tangent of", Number::tan),
        UnOp::ArcSin => numeric_unary(value, "take the arcsine of", Number::asin),
        UnOp::ArcCos => numeric_unary(value, "take the arccosine of", Number::acos),
        UnOp::ArcTan => numeric_unary(value, "take the arctangent of", Number::atan),
        UnOp::Factorial => numeric_unary(value, "take the factorial of", Number::factorial),
    }
}

/// The shared computation behind `++x`/`x++`: the engine only produces the
/// *new* value. Which of {old, new} is surfaced as the enclosing
/// expression's result, and which is written back to the variable, is a
/// statement-evaluation concern owned by the external scheduler (§1) — both
/// `PreIncrement` and `PostIncrement` route through this one function.
#[must_use]
pub fn increment_value(value: Value) -> EvalOutcome<Value> {
    match value {
        Value::Number(n) => EvalOutcome::Ok(Value::Number(n.increment())),
        Value::String(s) => EvalOutcome::Ok(Value::String(s + " ")),
    }
}

/// The shared computation behind `--x`/`x--`. See [`increment_value`] for
/// why pre- and post- forms share one implementation.
#[must_use]
pub fn decrement_value(value: Value) -> EvalOutcome<Value> {
    match value {
        Value::Number(n) => EvalOutcome::Ok(Value::Number(n.decrement())),
        Value::String(mut s) => {
            if s.is_empty() {
                EvalOutcome::Runtime(ExecutionError::EmptyString)
            } else {
                s.pop();
                EvalOutcome::Ok(Value::String(s))
            }
        }
    }
}

fn add(lhs: Value, rhs: Value) -> EvalOutcome<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => EvalOutcome::Ok(Value::Number(a + b)),
        (lhs, rhs) => EvalOutcome::Ok(Value::String(format!("{lhs}{rhs}"))),
    }
}

fn sub(lhs: Value, rhs: Value) -> EvalOutcome<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => EvalOutcome::Ok(Value::Number(a - b)),
        (lhs, rhs) => {
            let left = lhs.to_string();
            let right = rhs.to_string();
            EvalOutcome::Ok(Value::String(trim_suffix(&left, &right)))
        }
    }
}

/// Removes the rightmost occurrence of `needle` from `haystack`; returns
/// `haystack` unchanged if `needle` does not occur (§4.2).
fn trim_suffix(haystack: &str, needle: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    match haystack.rfind(needle) {
        Some(idx) => {
            let mut result = String::with_capacity(haystack.len() - needle.len());
            result.push_str(&haystack[..idx]);
            result.push_str(&haystack[idx + needle.len()..]);
            result
        }
        None => haystack.to_string(),
    }
}

fn numeric_binop(
    lhs: Value,
    rhs: Value,
    verb: &str,
    f: impl FnOnce(Number, Number) -> Result<Number, ExecutionError>,
) -> EvalOutcome<Value> {
    match (&lhs, &rhs) {
        (Value::Number(a), Value::Number(b)) => match f(*a, *b) {
            Ok(n) => EvalOutcome::Ok(Value::Number(n)),
            Err(e) => EvalOutcome::Runtime(e),
        },
        _ => EvalOutcome::Static(type_error_message(verb, &lhs, &rhs)),
    }
}

fn numeric_unary(value: Value, verb: &str, f: impl FnOnce(Number) -> Number) -> EvalOutcome<Value> {
    match value {
        Value::Number(n) => EvalOutcome::Ok(Value::Number(f(n))),
        Value::String(_) => EvalOutcome::Static(format!("Attempted to {verb} a string")),
    }
}

fn type_error_message(verb: &str, lhs: &Value, rhs: &Value) -> String {
    if matches!(lhs, Value::Number(_)) {
        format!("Attempted to {verb} by a {}", rhs.kind_name())
    } else {
        format!("Attempted to {verb} a {}", lhs.kind_name())
    }
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => false,
    }
}

fn compare(lhs: Value, rhs: Value, accept: impl FnOnce(core::cmp::Ordering) -> bool) -> Value {
    let ordering = match (&lhs, &rhs) {
        (Value::Number(a), Value::Number(b)) => a.cmp(b),
        _ => lhs.to_string().cmp(&rhs.to_string()),
    };
    Value::Number(Number::from_bool(accept(ordering)))
}
