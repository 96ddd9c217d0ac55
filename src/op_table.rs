//! A compile-time side table answering "can this operator application
//! throw?" without evaluating it (§9 "ambient stack", fast-path
//! elision table).
//!
//! An external analyser walking an already-typed expression tree can use
//! this to skip generating a runtime-fault check for an operand
//! combination that is provably incapable of producing one — e.g. `N + N`
//! never raises, `N / N` might. This table only ever answers about the
//! *runtime fault* channel (§7's [`crate::error::ExecutionError`]); static
//! type errors are a separate, orthogonal concern already fully determined
//! by the two operand kinds themselves (see [`crate::value::apply_binary`]).

use crate::value::{BinOp, UnOp};

/// The two possible operand shapes a [`crate::value::Value`] can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// [`crate::value::Value::Number`].
    Number,
    /// [`crate::value::Value::String`].
    String,
}

/// `true` iff `op` applied to operands of kinds `lhs`/`rhs` can raise an
/// [`crate::error::ExecutionError`] for *some* choice of concrete operand
/// values — not that it always will.
///
/// Only `/` and `%` ever raise, and only when both operands are
/// [`ValueKind::Number`] (a non-numeric operand is a static type error
/// instead, which this table does not speak to).
#[must_use]
pub const fn binary_may_throw(op: BinOp, lhs: ValueKind, rhs: ValueKind) -> bool {
    matches!(
        (op, lhs, rhs),
        (BinOp::Div | BinOp::Mod, ValueKind::Number, ValueKind::Number)
    )
}

/// `true` iff `op` applied to an operand of kind `operand` can raise an
/// [`crate::error::ExecutionError`].
///
/// No unary operator currently defined raises a runtime fault: arithmetic
/// unary operators saturate (§4.1) rather than fault, and `not` always
/// succeeds.
#[must_use]
pub const fn unary_may_throw(_op: UnOp, _operand: ValueKind) -> bool {
    false
}

/// `true` iff decrementing a value of kind `operand` can raise
/// [`crate::error::ExecutionError::EmptyString`] — true only for strings,
/// since an empty string is the sole precondition that faults (§4.2).
#[must_use]
pub const fn decrement_may_throw(operand: ValueKind) -> bool {
    matches!(operand, ValueKind::String)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_of_two_numbers_may_throw() {
        assert!(binary_may_throw(BinOp::Div, ValueKind::Number, ValueKind::Number));
        assert!(binary_may_throw(BinOp::Mod, ValueKind::Number, ValueKind::Number));
    }

    #[test]
    fn division_involving_a_string_cannot_throw_a_runtime_fault() {
        assert!(!binary_may_throw(BinOp::Div, ValueKind::Number, ValueKind::String));
        assert!(!binary_may_throw(BinOp::Div, ValueKind::String, ValueKind::Number));
    }

    #[test]
    fn addition_never_throws() {
        assert!(!binary_may_throw(BinOp::Add, ValueKind::Number, ValueKind::Number));
        assert!(!binary_may_throw(BinOp::Add, ValueKind::String, ValueKind::String));
    }

    #[test]
    fn decrement_only_strings_may_throw() {
        assert!(decrement_may_throw(ValueKind::String));
        assert!(!decrement_may_throw(ValueKind::Number));
    }
}
