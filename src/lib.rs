// yolk-core/src/lib.rs

//! Number and value semantics, and a Z3-backed symbolic model, for a small
//! embedded scripting language (§1, §2).
//!
//! Three layers, each usable on its own:
//! - [`number`] — scaled fixed-point arithmetic (§4.1).
//! - [`value`] and [`eval`] — the dynamically-typed value matrix and a pure
//!   tree-walking evaluator over it (§4.2).
//! - [`smt`] — a Z3-backed symbolic model of variables and expressions, for
//!   callers that want to ask "could this ever be..." instead of "what is
//!   this" (§4.3).
//!
//! [`ast`] is a minimal, parsing-free expression tree; a real parser is
//! expected to build trees of this shape rather than this crate producing
//! them (§1).

pub mod ast;
pub mod error;
pub mod eval;
pub mod number;
pub mod op_table;
pub mod smt;
pub mod value;

/// Re-exports of the types most callers reach for first.
pub mod prelude {
    pub use crate::ast::Node;
    pub use crate::error::{EvalOutcome, ExecutionError};
    pub use crate::eval::{evaluate, VariableLookup};
    pub use crate::number::Number;
    pub use crate::op_table::{binary_may_throw, decrement_may_throw, unary_may_throw, ValueKind};
    pub use crate::smt::{BindingId, ModelConfig, SmtModel};
    pub use crate::value::{apply_binary, apply_unary, decrement_value, increment_value, BinOp, UnOp, Value};
}
