//! The solver-backed model itself (§4.3 "Model", "Query operations").
//!
//! [`SmtModel`] owns the binding arena and the [`z3::Solver`]; it does not
//! own the [`z3::Context`] those asts are carried in, since Z3's config
//! (timeout, among other things) must be fixed before the context is built.
//! Callers construct a `Context` from [`ModelConfig::to_z3_config`] in an
//! outer scope and hand `SmtModel` a reference to it, so the context's
//! `Drop` impl releases the solver's native resources on every exit path
//! without `SmtModel` needing any explicit teardown of its own (§5).

use std::collections::HashMap;

use tracing::debug;
use z3::ast::{Ast, Bool, Int, String as Z3String};
use z3::{Config, Context, SatResult, Solver};

use crate::number::Number;
use crate::value::Value;

use super::binding::{BindingId, ValueTypeSort, VariableBinding};
use super::encode::encode_node;
use crate::ast::Node;

/// Tunables for the solver backing a model.
///
/// Currently only the per-query timeout is exposed; everything else uses
/// Z3's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelConfig {
    /// Upper bound, in milliseconds, on any single `check`/`check_assuming`
    /// call. A query that times out is treated as `Unknown` (see
    /// [`SmtModel::is_value_available`] and friends, which answer `false`
    /// rather than panicking when the solver can't decide).
    pub timeout_ms: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

impl ModelConfig {
    /// Builds the `z3::Config` a [`Context`] must be constructed from to
    /// honor this configuration.
    #[must_use]
    pub fn to_z3_config(self) -> Config {
        let mut config = Config::new();
        config.set_timeout_msec(u64::from(self.timeout_ms));
        config
    }
}

/// A live symbolic model of zero or more program variables and the
/// subexpressions asserted equal to them.
///
/// Construct one per analysis session; a model is not meant to outlive the
/// statement or block it is analysing.
pub struct SmtModel<'ctx> {
    ctx: &'ctx Context,
    solver: Solver<'ctx>,
    types: ValueTypeSort<'ctx>,
    bindings: Vec<VariableBinding<'ctx>>,
    names: HashMap<String, BindingId>,
    anon_counter: usize,
}

impl<'ctx> SmtModel<'ctx> {
    /// Builds an empty model over `ctx`. `ctx` should have been constructed
    /// from [`ModelConfig::to_z3_config`] if a non-default timeout is
    /// wanted.
    pub fn new(ctx: &'ctx Context) -> Self {
        Self {
            ctx,
            solver: Solver::new(ctx),
            types: ValueTypeSort::new(ctx),
            bindings: Vec::new(),
            names: HashMap::new(),
            anon_counter: 0,
        }
    }

    pub(crate) fn ctx(&self) -> &'ctx Context {
        self.ctx
    }

    pub(crate) fn types(&self) -> &ValueTypeSort<'ctx> {
        &self.types
    }

    pub(crate) fn get(&self, id: BindingId) -> &VariableBinding<'ctx> {
        &self.bindings[id.0]
    }

    /// Allocates a fresh, unconstrained subexpression binding; used by the
    /// encoder for every non-leaf node it visits.
    pub(crate) fn fresh_binding(&mut self) -> BindingId {
        self.anon_counter += 1;
        let name = format!("__anon{}", self.anon_counter);
        self.bindings
            .push(VariableBinding::fresh(self.ctx, &self.types, name));
        BindingId(self.bindings.len() - 1)
    }

    pub(crate) fn assert(&self, constraint: &Bool<'ctx>) {
        self.solver.assert(constraint);
    }

    pub(crate) fn assert_implies(&self, antecedent: &Bool<'ctx>, consequent: &Bool<'ctx>) {
        self.solver.assert(&antecedent.implies(consequent));
    }

    /// Returns the binding for `name`, allocating a fresh unconstrained one
    /// on first reference (§4.3 "getOrCreate").
    pub fn get_or_create(&mut self, name: &str) -> BindingId {
        if let Some(id) = self.names.get(name) {
            return *id;
        }
        self.bindings
            .push(VariableBinding::fresh(self.ctx, &self.types, name));
        let id = BindingId(self.bindings.len() - 1);
        self.names.insert(name.to_string(), id);
        id
    }

    /// Ties `binding` to a known, concrete [`Value`] (§4.3 "assertEq, value
    /// form").
    pub fn assert_eq_value(&mut self, binding: BindingId, value: &Value) {
        let (kind, num, str_val) = self.encode_concrete(value);
        let b = self.get(binding);
        self.solver.assert(&b.kind._eq(&kind));
        self.solver.assert(&b.num._eq(&num));
        self.solver.assert(&b.str_val._eq(&str_val));
        self.solver.assert(&b.taint.not());
    }

    /// Ties `binding` to the result of evaluating `expr` (§4.3 "assertEq,
    /// expression form"); the recursive encoder allocates whatever
    /// subexpression bindings `expr` requires.
    pub fn assert_eq_expr(&mut self, binding: BindingId, expr: &Node) {
        let result = encode_node(self, expr);
        self.assert_eq_bindings(binding, result);
    }

    /// Ties two bindings to the same channel values (§4.3 "assertEq,
    /// binding form").
    pub fn assert_eq_bindings(&mut self, a: BindingId, b: BindingId) {
        let a = self.get(a);
        let b = self.get(b);
        self.solver.assert(&a.kind._eq(&b.kind));
        self.solver.assert(&a.num._eq(&b.num));
        self.solver.assert(&a.str_val._eq(&b.str_val));
        self.solver.assert(&a.taint._eq(&b.taint));
    }

    fn encode_concrete(&self, value: &Value) -> (z3::ast::Dynamic<'ctx>, Int<'ctx>, Z3String<'ctx>) {
        match value {
            Value::Number(n) => (
                self.types.num_type(),
                Self::number_to_int(self.ctx, *n),
                Z3String::from_str(self.ctx, "")
                    .expect("empty string literal is always a valid Z3 string constant"),
            ),
            Value::String(s) => (
                self.types.str_type(),
                Int::from_i64(self.ctx, 0),
                Z3String::from_str(self.ctx, s)
                    .expect("program-supplied string literals are valid Z3 string constants"),
            ),
        }
    }

    pub(crate) fn number_to_int(ctx: &'ctx Context, n: Number) -> Int<'ctx> {
        Int::from_i64(ctx, n.raw())
    }

    /// Runs `query` under a fresh `push`/`pop` scope, so exploratory
    /// assertions never leak into the model's persistent state (§4.3 "Query
    /// operations", §5).
    fn scoped_check(&self, extra: &Bool<'ctx>) -> SatResult {
        self.solver.push();
        self.solver.assert(extra);
        let result = self.solver.check();
        self.solver.pop(1);
        result
    }

    /// `true` iff `binding`'s exact value is knowable: there exists a model
    /// of the current assertions in which `binding.taint` is false (§4.3).
    ///
    /// A solver timeout is treated the same as "no" — this query never
    /// claims availability it cannot back up.
    pub fn is_value_available(&self, binding: BindingId) -> bool {
        let taint = self.get(binding).taint.clone();
        let result = self.scoped_check(&taint.not());
        debug!(?result, "is_value_available query");
        matches!(result, SatResult::Sat)
    }

    /// `true` iff `binding` could equal `value` under the current
    /// assertions (§4.3).
    pub fn can_be_value(&self, binding: BindingId, value: &Value) -> bool {
        let (kind, num, str_val) = self.encode_concrete(value);
        let b = self.get(binding);
        let matches = Bool::and(
            self.ctx,
            &[&b.kind._eq(&kind), &b.num._eq(&num), &b.str_val._eq(&str_val)],
        );
        let result = self.scoped_check(&matches);
        debug!(?result, "can_be_value query");
        matches!(result, SatResult::Sat)
    }

    /// `true` iff `binding` can equal `value` (`can_be_value`) and cannot
    /// equal anything else (its negation is unsatisfiable) — i.e. the model
    /// proves `binding` is *exactly* `value` (§4.3).
    pub fn is_value(&self, binding: BindingId, value: &Value) -> bool {
        if !self.can_be_value(binding, value) {
            return false;
        }
        let (kind, num, str_val) = self.encode_concrete(value);
        let b = self.get(binding);
        let differs = Bool::or(
            self.ctx,
            &[
                &b.kind._eq(&kind).not(),
                &b.num._eq(&num).not(),
                &b.str_val._eq(&str_val).not(),
            ],
        );
        let result = self.scoped_check(&differs);
        debug!(?result, "is_value query (negation check)");
        matches!(result, SatResult::Unsat)
    }

    /// `true` iff `binding` could be string-typed under the current
    /// assertions.
    pub fn can_be_string(&self, binding: BindingId) -> bool {
        let is_str = self.types.is_str_type(&self.get(binding).kind);
        matches!(self.scoped_check(&is_str), SatResult::Sat)
    }

    /// `true` iff `binding` could be number-typed under the current
    /// assertions.
    pub fn can_be_number(&self, binding: BindingId) -> bool {
        let is_num = self.types.is_num_type(&self.get(binding).kind);
        matches!(self.scoped_check(&is_num), SatResult::Sat)
    }
}
