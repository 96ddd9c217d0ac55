//! The two error channels the language exposes (§7 of the design notes).
//!
//! Runtime faults (`ExecutionError`) halt the current statement; a "static"
//! type violation never raises — it is carried as [`EvalOutcome::Static`],
//! a message rather than a [`crate::value::Value`] variant, so the host
//! scheduler can treat it as an ordinary analysable result until it chooses
//! to stop evaluating.

use thiserror::Error;

/// A runtime fault raised by arithmetic that cannot complete.
///
/// These are the only errors that abort evaluation outright; every other
/// numeric operation either wraps or saturates per [`crate::number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// `a / b` where `b` is zero.
    #[error("division by zero")]
    DivideByZero,
    /// `a % b` where `b` is zero.
    #[error("modulus by zero")]
    ModulusByZero,
    /// `--s` where `s` is the empty string.
    #[error("cannot decrement an empty string")]
    EmptyString,
}

/// The result of evaluating one operator application.
///
/// The two failure variants are kept distinct on purpose (§7, §9): a
/// [`EvalOutcome::Runtime`] is an exceptional numeric event the host may want
/// to abort a whole line over, while [`EvalOutcome::Static`] is an expected,
/// analysable type mismatch that the language represents as an ordinary
/// value flowing downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalOutcome<T> {
    /// The operator completed and produced a value.
    Ok(T),
    /// A runtime fault aborted evaluation of the current statement.
    Runtime(ExecutionError),
    /// A type-incompatible operand combination; carries a human-readable
    /// message describing the offending combination.
    Static(String),
}

impl<T> EvalOutcome<T> {
    /// Returns `true` if this outcome is a value, not an error of either kind.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns `true` if evaluation should halt the current statement,
    /// whether by runtime fault or by static type error.
    #[must_use]
    pub const fn halts_statement(&self) -> bool {
        !self.is_ok()
    }

    /// Maps the success value, leaving either error variant untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> EvalOutcome<U> {
        match self {
            Self::Ok(v) => EvalOutcome::Ok(f(v)),
            Self::Runtime(e) => EvalOutcome::Runtime(e),
            Self::Static(msg) => EvalOutcome::Static(msg),
        }
    }
}

impl<T> From<Result<T, ExecutionError>> for EvalOutcome<T> {
    fn from(result: Result<T, ExecutionError>) -> Self {
        match result {
            Ok(v) => Self::Ok(v),
            Err(e) => Self::Runtime(e),
        }
    }
}
