//! Recursive encoding of an expression tree into solver constraints
//! (§4.3 "Expression encoding").
//!
//! Every node produces a fresh [`BindingId`] whose four channels are
//! constrained, by implication, to whatever can be proven about the node's
//! result. Anything this encoder cannot model exactly (string lexical
//! comparison, transcendental functions, factorial, exponentiation) is left
//! with its value channel unconstrained and its `taint` forced `true`; this
//! never makes the model unsound, only less precise (§3, §8 "soundness,
//! never precision, is the contract").

use z3::ast::{Ast, Bool, Int, String as Z3String};

use crate::ast::Node;

use super::binding::BindingId;
use super::model::SmtModel;

/// Encodes `node`, returning the binding that carries its result.
pub(crate) fn encode_node<'ctx>(model: &mut SmtModel<'ctx>, node: &Node) -> BindingId {
    match node {
        Node::ConstantNumber(n) => encode_constant_number(model, *n),
        Node::ConstantString(s) => encode_constant_string(model, s),
        Node::Variable(name) => model.get_or_create(name),

        Node::Add(l, r) => encode_add(model, l, r),
        Node::Subtract(l, r) => encode_subtract(model, l, r),
        Node::Multiply(l, r) => encode_scaled_arith(model, l, r, ScaledOp::Multiply),
        Node::Divide(l, r) => encode_scaled_arith(model, l, r, ScaledOp::Divide),
        Node::Modulo(l, r) => encode_scaled_arith(model, l, r, ScaledOp::Modulo),
        Node::Exponent(l, r) => encode_type_only_binary(model, l, r),

        Node::EqualTo(l, r) => encode_equality(model, l, r, true),
        Node::NotEqualTo(l, r) => encode_equality(model, l, r, false),
        Node::LessThan(l, r) => encode_ordering(model, l, r, |a, b| a.lt(b)),
        Node::GreaterThan(l, r) => encode_ordering(model, l, r, |a, b| a.gt(b)),
        Node::LessThanEq(l, r) => encode_ordering(model, l, r, |a, b| a.le(b)),
        Node::GreaterThanEq(l, r) => encode_ordering(model, l, r, |a, b| a.ge(b)),

        Node::And(l, r) => encode_logical(model, l, r, true),
        Node::Or(l, r) => encode_logical(model, l, r, false),
        Node::Not(operand) => encode_not(model, operand),
        Node::Negate(operand) => encode_negate(model, operand),

        Node::PreIncrement(operand) | Node::PostIncrement(operand) => {
            encode_increment(model, operand)
        }
        Node::PreDecrement(operand) | Node::PostDecrement(operand) => {
            encode_decrement(model, operand)
        }

        Node::Abs(operand)
        | Node::Sqrt(operand)
        | Node::Sin(operand)
        | Node::Cos(operand)
        | Node::Tan(operand)
        | Node::ArcSin(operand)
        | Node::ArcCos(operand)
        | Node::ArcTan(operand)
        | Node::Factorial(operand) => encode_type_only_unary(model, operand),
    }
}

fn is_num<'ctx>(model: &SmtModel<'ctx>, id: BindingId) -> Bool<'ctx> {
    model.types().is_num_type(&model.get(id).kind)
}

fn is_str<'ctx>(model: &SmtModel<'ctx>, id: BindingId) -> Bool<'ctx> {
    model.types().is_str_type(&model.get(id).kind)
}

fn taint<'ctx>(model: &SmtModel<'ctx>, id: BindingId) -> Bool<'ctx> {
    model.get(id).taint.clone()
}

fn num<'ctx>(model: &SmtModel<'ctx>, id: BindingId) -> Int<'ctx> {
    model.get(id).num.clone()
}

fn str_val<'ctx>(model: &SmtModel<'ctx>, id: BindingId) -> Z3String<'ctx> {
    model.get(id).str_val.clone()
}

fn encode_constant_number<'ctx>(model: &mut SmtModel<'ctx>, n: crate::number::Number) -> BindingId {
    let id = model.fresh_binding();
    let num_type = model.types().num_type();
    let num_ast = SmtModel::number_to_int(model.ctx(), n);
    let b = model.get(id);
    model.assert(&b.kind._eq(&num_type));
    model.assert(&b.num._eq(&num_ast));
    model.assert(&b.taint.not());
    id
}

fn encode_constant_string<'ctx>(model: &mut SmtModel<'ctx>, s: &str) -> BindingId {
    let id = model.fresh_binding();
    let str_type = model.types().str_type();
    let str_ast = Z3String::from_str(model.ctx(), s)
        .expect("program-supplied string literals are valid Z3 string constants");
    let b = model.get(id);
    model.assert(&b.kind._eq(&str_type));
    model.assert(&b.str_val._eq(&str_ast));
    model.assert(&b.taint.not());
    id
}

/// `lhs + rhs` (§4.3 "Add"): type always known from operand types; value
/// known only when both operands are the matching type and untainted;
/// taint forced whenever the operand types are mixed.
fn encode_add<'ctx>(model: &mut SmtModel<'ctx>, lhs: &Node, rhs: &Node) -> BindingId {
    let l = encode_node(model, lhs);
    let r = encode_node(model, rhs);
    let t = model.fresh_binding();

    let ctx = model.ctx();
    let is_num_l = is_num(model, l);
    let is_num_r = is_num(model, r);
    let is_str_l = is_str(model, l);
    let is_str_r = is_str(model, r);
    let both_num = Bool::and(ctx, &[&is_num_l, &is_num_r]);
    let both_str = Bool::and(ctx, &[&is_str_l, &is_str_r]);
    let mixed = Bool::or(
        ctx,
        &[
            &Bool::and(ctx, &[&is_num_l, &is_str_r]),
            &Bool::and(ctx, &[&is_str_l, &is_num_r]),
        ],
    );

    let t_kind = model.get(t).kind.clone();
    let num_type = model.types().num_type();
    let str_type = model.types().str_type();
    model.assert_implies(&both_num, &t_kind._eq(&num_type));
    model.assert_implies(&both_num.not(), &t_kind._eq(&str_type));

    let both_num_untainted = Bool::and(ctx, &[&both_num, &taint(model, l).not(), &taint(model, r).not()]);
    let sum = Int::add(ctx, &[&num(model, l), &num(model, r)]);
    let t_num = model.get(t).num.clone();
    model.assert_implies(&both_num_untainted, &t_num._eq(&sum));

    let both_str_untainted = Bool::and(ctx, &[&both_str, &taint(model, l).not(), &taint(model, r).not()]);
    let concat = Z3String::concat(ctx, &[&str_val(model, l), &str_val(model, r)]);
    let t_str = model.get(t).str_val.clone();
    model.assert_implies(&both_str_untainted, &t_str._eq(&concat));

    let taint_formula = Bool::or(ctx, &[&taint(model, l), &taint(model, r), &mixed]);
    let t_taint = model.get(t).taint.clone();
    model.assert(&t_taint._eq(&taint_formula));

    t
}

/// `lhs - rhs` (§4.3 "Subtract"): same type rule as Add; the numeric case
/// is exact, but trim-suffix string subtraction is not representable in
/// this solver's string theory, so every non-numeric case is fully
/// tainted.
fn encode_subtract<'ctx>(model: &mut SmtModel<'ctx>, lhs: &Node, rhs: &Node) -> BindingId {
    let l = encode_node(model, lhs);
    let r = encode_node(model, rhs);
    let t = model.fresh_binding();

    let ctx = model.ctx();
    let both_num = Bool::and(ctx, &[&is_num(model, l), &is_num(model, r)]);

    let t_kind = model.get(t).kind.clone();
    let num_type = model.types().num_type();
    let str_type = model.types().str_type();
    model.assert_implies(&both_num, &t_kind._eq(&num_type));
    model.assert_implies(&both_num.not(), &t_kind._eq(&str_type));

    let both_num_untainted = Bool::and(ctx, &[&both_num, &taint(model, l).not(), &taint(model, r).not()]);
    let diff = Int::sub(ctx, &[&num(model, l), &num(model, r)]);
    let t_num = model.get(t).num.clone();
    model.assert_implies(&both_num_untainted, &t_num._eq(&diff));

    let t_taint = model.get(t).taint.clone();
    model.assert(&t_taint._eq(&both_num_untainted.not()));

    t
}

#[derive(Clone, Copy)]
enum ScaledOp {
    Multiply,
    Divide,
    Modulo,
}

/// `*`, `/`, `%` (§4.3 "Multiply/Divide"): result type is forced to
/// Number; value is exact when both operands are numeric and untainted;
/// taint is forced whenever either operand is non-numeric.
fn encode_scaled_arith<'ctx>(
    model: &mut SmtModel<'ctx>,
    lhs: &Node,
    rhs: &Node,
    op: ScaledOp,
) -> BindingId {
    let l = encode_node(model, lhs);
    let r = encode_node(model, rhs);
    let t = model.fresh_binding();

    let ctx = model.ctx();
    let both_num = Bool::and(ctx, &[&is_num(model, l), &is_num(model, r)]);

    let t_kind = model.get(t).kind.clone();
    let num_type = model.types().num_type();
    model.assert(&t_kind._eq(&num_type));

    let both_num_untainted = Bool::and(ctx, &[&both_num, &taint(model, l).not(), &taint(model, r).not()]);
    let scale = Int::from_i64(ctx, i64::from(crate::number::SCALE));
    let value = match op {
        ScaledOp::Multiply => {
            let product = Int::mul(ctx, &[&num(model, l), &num(model, r)]);
            truncating_div(ctx, &product, &scale)
        }
        ScaledOp::Divide => {
            let numerator = Int::mul(ctx, &[&num(model, l), &scale]);
            truncating_div(ctx, &numerator, &num(model, r))
        }
        ScaledOp::Modulo => truncating_rem(ctx, &num(model, l), &num(model, r)),
    };
    let t_num = model.get(t).num.clone();
    model.assert_implies(&both_num_untainted, &t_num._eq(&value));

    let t_taint = model.get(t).taint.clone();
    let taint_formula = Bool::or(ctx, &[&taint(model, l), &taint(model, r), &both_num.not()]);
    model.assert(&t_taint._eq(&taint_formula));

    t
}

/// `lhs == rhs` / `lhs != rhs` (§4.3 "Equality"): result is always Number
/// and always bounded to `{0, 1000}`; the exact value is known when both
/// operands are the same, untainted type.
fn encode_equality<'ctx>(model: &mut SmtModel<'ctx>, lhs: &Node, rhs: &Node, positive: bool) -> BindingId {
    let l = encode_node(model, lhs);
    let r = encode_node(model, rhs);
    let t = model.fresh_binding();

    let ctx = model.ctx();
    let zero = Int::from_i64(ctx, 0);
    let one_thousand = Int::from_i64(ctx, i64::from(crate::number::SCALE));

    let t_kind = model.get(t).kind.clone();
    let num_type = model.types().num_type();
    model.assert(&t_kind._eq(&num_type));

    let t_num = model.get(t).num.clone();
    model.assert(&Bool::or(ctx, &[&t_num._eq(&zero), &t_num._eq(&one_thousand)]));

    let (true_val, false_val) = if positive {
        (&one_thousand, &zero)
    } else {
        (&zero, &one_thousand)
    };

    let both_num_untainted = Bool::and(
        ctx,
        &[&is_num(model, l), &is_num(model, r), &taint(model, l).not(), &taint(model, r).not()],
    );
    let nums_equal = num(model, l)._eq(&num(model, r));
    model.assert_implies(&both_num_untainted, &t_num._eq(&nums_equal.ite(true_val, false_val)));

    let both_str_untainted = Bool::and(
        ctx,
        &[&is_str(model, l), &is_str(model, r), &taint(model, l).not(), &taint(model, r).not()],
    );
    let strs_equal = str_val(model, l)._eq(&str_val(model, r));
    model.assert_implies(&both_str_untainted, &t_num._eq(&strs_equal.ite(true_val, false_val)));

    let mixed = Bool::or(
        ctx,
        &[
            &Bool::and(ctx, &[&is_num(model, l), &is_str(model, r)]),
            &Bool::and(ctx, &[&is_str(model, l), &is_num(model, r)]),
        ],
    );
    let t_taint = model.get(t).taint.clone();
    model.assert(&t_taint._eq(&Bool::or(ctx, &[&taint(model, l), &taint(model, r), &mixed])));

    t
}

/// `<`, `>`, `<=`, `>=` (§4.3): numeric-only; lexical string comparison is
/// not modeled, so any non-numeric pairing is fully tainted even though
/// the `{0, 1000}` domain bound still holds.
fn encode_ordering<'ctx, F>(model: &mut SmtModel<'ctx>, lhs: &Node, rhs: &Node, accept: F) -> BindingId
where
    F: FnOnce(&Int<'ctx>, &Int<'ctx>) -> Bool<'ctx>,
{
    let l = encode_node(model, lhs);
    let r = encode_node(model, rhs);
    let t = model.fresh_binding();

    let ctx = model.ctx();
    let zero = Int::from_i64(ctx, 0);
    let one_thousand = Int::from_i64(ctx, i64::from(crate::number::SCALE));

    let t_kind = model.get(t).kind.clone();
    let num_type = model.types().num_type();
    model.assert(&t_kind._eq(&num_type));

    let t_num = model.get(t).num.clone();
    model.assert(&Bool::or(ctx, &[&t_num._eq(&zero), &t_num._eq(&one_thousand)]));

    let both_num = Bool::and(ctx, &[&is_num(model, l), &is_num(model, r)]);
    let both_num_untainted = Bool::and(ctx, &[&both_num, &taint(model, l).not(), &taint(model, r).not()]);
    let holds = accept(&num(model, l), &num(model, r));
    model.assert_implies(&both_num_untainted, &t_num._eq(&holds.ite(&one_thousand, &zero)));

    let t_taint = model.get(t).taint.clone();
    model.assert(&t_taint._eq(&both_num_untainted.not()));

    t
}

/// `and` / `or` (§4.3 "Logical"): truthiness is well-defined for both
/// Number (nonzero) and String (always truthy) operands, so taint only
/// propagates from an operand whose own type or numeric value is unknown.
fn encode_logical<'ctx>(model: &mut SmtModel<'ctx>, lhs: &Node, rhs: &Node, is_and: bool) -> BindingId {
    let l = encode_node(model, lhs);
    let r = encode_node(model, rhs);
    let t = model.fresh_binding();
    let ctx = model.ctx();

    let (truthy_l, known_l) = truthy(model, l);
    let (truthy_r, known_r) = truthy(model, r);
    let known = Bool::and(ctx, &[&known_l, &known_r]);
    let value = if is_and {
        Bool::and(ctx, &[&truthy_l, &truthy_r])
    } else {
        Bool::or(ctx, &[&truthy_l, &truthy_r])
    };

    let zero = Int::from_i64(ctx, 0);
    let one_thousand = Int::from_i64(ctx, i64::from(crate::number::SCALE));
    let t_kind = model.get(t).kind.clone();
    let num_type = model.types().num_type();
    model.assert(&t_kind._eq(&num_type));
    let t_num = model.get(t).num.clone();
    model.assert(&Bool::or(ctx, &[&t_num._eq(&zero), &t_num._eq(&one_thousand)]));
    model.assert_implies(&known, &t_num._eq(&value.ite(&one_thousand, &zero)));

    let t_taint = model.get(t).taint.clone();
    model.assert(&t_taint._eq(&known.not()));

    t
}

fn encode_not<'ctx>(model: &mut SmtModel<'ctx>, operand: &Node) -> BindingId {
    let o = encode_node(model, operand);
    let t = model.fresh_binding();
    let ctx = model.ctx();

    let (truthy_o, known) = truthy(model, o);
    let zero = Int::from_i64(ctx, 0);
    let one_thousand = Int::from_i64(ctx, i64::from(crate::number::SCALE));
    let t_kind = model.get(t).kind.clone();
    let num_type = model.types().num_type();
    model.assert(&t_kind._eq(&num_type));
    let t_num = model.get(t).num.clone();
    model.assert(&Bool::or(ctx, &[&t_num._eq(&zero), &t_num._eq(&one_thousand)]));
    model.assert_implies(&known, &t_num._eq(&truthy_o.ite(&zero, &one_thousand)));

    let t_taint = model.get(t).taint.clone();
    model.assert(&t_taint._eq(&known.not()));

    t
}

/// Truthiness of a binding: Strings are always truthy, Numbers are truthy
/// iff nonzero; returns `(value, known)` where `known` tells a caller
/// whether `value` is actually backed by a constraint.
fn truthy<'ctx>(model: &SmtModel<'ctx>, id: BindingId) -> (Bool<'ctx>, Bool<'ctx>) {
    let ctx = model.ctx();
    let zero = Int::from_i64(ctx, 0);
    let is_str_id = is_str(model, id);
    let is_num_id = is_num(model, id);
    let not_tainted = taint(model, id).not();
    let known = Bool::or(ctx, &[&is_str_id, &Bool::and(ctx, &[&is_num_id, &not_tainted])]);
    let value = is_str_id.ite(&Bool::from_bool(ctx, true), &num(model, id)._eq(&zero).not());
    (value, known)
}

fn encode_negate<'ctx>(model: &mut SmtModel<'ctx>, operand: &Node) -> BindingId {
    let o = encode_node(model, operand);
    let t = model.fresh_binding();
    let ctx = model.ctx();

    let is_num_o = is_num(model, o);
    let t_kind = model.get(t).kind.clone();
    let num_type = model.types().num_type();
    model.assert_implies(&is_num_o, &t_kind._eq(&num_type));

    let value_known = Bool::and(ctx, &[&is_num_o, &taint(model, o).not()]);
    let negated = Int::sub(ctx, &[&Int::from_i64(ctx, 0), &num(model, o)]);
    let t_num = model.get(t).num.clone();
    model.assert_implies(&value_known, &t_num._eq(&negated));

    let t_taint = model.get(t).taint.clone();
    model.assert(&t_taint._eq(&value_known.not()));

    t
}

/// `++x` / `x++` (§4.4): both AST variants share this encoding since the
/// pre/post distinction only matters to the statement's result, not the
/// variable's new value.
fn encode_increment<'ctx>(model: &mut SmtModel<'ctx>, operand: &Node) -> BindingId {
    let o = encode_node(model, operand);
    let t = model.fresh_binding();
    let ctx = model.ctx();
    let scale = Int::from_i64(ctx, i64::from(crate::number::SCALE));

    let is_num_o = is_num(model, o);
    let is_str_o = is_str(model, o);
    let num_type = model.types().num_type();
    let str_type = model.types().str_type();
    let t_kind = model.get(t).kind.clone();
    model.assert_implies(&is_num_o, &t_kind._eq(&num_type));
    model.assert_implies(&is_str_o, &t_kind._eq(&str_type));

    let not_tainted = taint(model, o).not();
    let num_known = Bool::and(ctx, &[&is_num_o, &not_tainted]);
    let incremented = Int::add(ctx, &[&num(model, o), &scale]);
    let t_num = model.get(t).num.clone();
    model.assert_implies(&num_known, &t_num._eq(&incremented));

    let space = Z3String::from_str(ctx, " ").expect("single-space literal is a valid Z3 string constant");
    let str_known = Bool::and(ctx, &[&is_str_o, &not_tainted]);
    let appended = Z3String::concat(ctx, &[&str_val(model, o), &space]);
    let t_str = model.get(t).str_val.clone();
    model.assert_implies(&str_known, &t_str._eq(&appended));

    let t_taint = model.get(t).taint.clone();
    model.assert(&t_taint._eq(&taint(model, o)));

    t
}

/// `--x` / `x--` (§4.4): decrementing a provably empty string is the one
/// case this encoder deliberately taints rather than models exactly, since
/// that path is a runtime fault (not a value) at the Value-engine layer.
fn encode_decrement<'ctx>(model: &mut SmtModel<'ctx>, operand: &Node) -> BindingId {
    let o = encode_node(model, operand);
    let t = model.fresh_binding();
    let ctx = model.ctx();
    let scale = Int::from_i64(ctx, i64::from(crate::number::SCALE));

    let is_num_o = is_num(model, o);
    let is_str_o = is_str(model, o);
    let num_type = model.types().num_type();
    let str_type = model.types().str_type();
    let t_kind = model.get(t).kind.clone();
    model.assert_implies(&is_num_o, &t_kind._eq(&num_type));
    model.assert_implies(&is_str_o, &t_kind._eq(&str_type));

    let not_tainted = taint(model, o).not();
    let num_known = Bool::and(ctx, &[&is_num_o, &not_tainted]);
    let decremented = Int::sub(ctx, &[&num(model, o), &scale]);
    let t_num = model.get(t).num.clone();
    model.assert_implies(&num_known, &t_num._eq(&decremented));

    let empty = Z3String::from_str(ctx, "").expect("empty string literal is a valid Z3 string constant");
    let is_empty = str_val(model, o)._eq(&empty);
    let str_known = Bool::and(ctx, &[&is_str_o, &not_tainted, &is_empty.not()]);
    let one = Int::from_i64(ctx, 1);
    let length = str_val(model, o).length();
    let new_len = Int::sub(ctx, &[&length, &one]);
    let zero = Int::from_i64(ctx, 0);
    let popped = str_val(model, o).extract(&zero, &new_len);
    let t_str = model.get(t).str_val.clone();
    model.assert_implies(&str_known, &t_str._eq(&popped));

    let empties_out = Bool::and(ctx, &[&is_str_o, &is_empty]);
    let t_taint = model.get(t).taint.clone();
    model.assert(&t_taint._eq(&Bool::or(ctx, &[&taint(model, o), &empties_out])));

    t
}

/// Shared tail for operators whose exact value this encoder does not
/// attempt to model (transcendental functions, factorial, exponentiation):
/// the result type is propagated when provable, and the value channel is
/// always left tainted.
fn encode_type_only_unary<'ctx>(model: &mut SmtModel<'ctx>, operand: &Node) -> BindingId {
    let o = encode_node(model, operand);
    let t = model.fresh_binding();

    let is_num_o = is_num(model, o);
    let num_type = model.types().num_type();
    let t_kind = model.get(t).kind.clone();
    model.assert_implies(&is_num_o, &t_kind._eq(&num_type));

    let t_taint = model.get(t).taint.clone();
    model.assert(&t_taint);

    t
}

/// As [`encode_type_only_unary`], for exponentiation: Number results are
/// forced when both operands are Number, but `pow` is not linear
/// arithmetic, so no exact value is ever asserted.
fn encode_type_only_binary<'ctx>(model: &mut SmtModel<'ctx>, lhs: &Node, rhs: &Node) -> BindingId {
    let l = encode_node(model, lhs);
    let r = encode_node(model, rhs);
    let t = model.fresh_binding();
    let ctx = model.ctx();

    let both_num = Bool::and(ctx, &[&is_num(model, l), &is_num(model, r)]);
    let num_type = model.types().num_type();
    let t_kind = model.get(t).kind.clone();
    model.assert_implies(&both_num, &t_kind._eq(&num_type));

    let t_taint = model.get(t).taint.clone();
    model.assert(&t_taint);

    t
}

/// Truncating (toward zero) integer division, matching [`crate::number`]'s
/// Rust-native `/` rather than Z3's native Euclidean `div`.
fn truncating_div<'ctx>(ctx: &'ctx z3::Context, numerator: &Int<'ctx>, denominator: &Int<'ctx>) -> Int<'ctx> {
    let zero = Int::from_i64(ctx, 0);
    let num_neg = numerator.lt(&zero);
    let den_neg = denominator.lt(&zero);
    let abs_num = num_neg.ite(&Int::sub(ctx, &[&zero, numerator]), numerator);
    let abs_den = den_neg.ite(&Int::sub(ctx, &[&zero, denominator]), denominator);
    let q = abs_num.div(&abs_den);
    let result_neg = num_neg._eq(&den_neg).not();
    result_neg.ite(&Int::sub(ctx, &[&zero, &q]), &q)
}

/// Truncating remainder, derived from [`truncating_div`] via the
/// quotient/remainder identity so the two stay consistent.
fn truncating_rem<'ctx>(ctx: &'ctx z3::Context, dividend: &Int<'ctx>, divisor: &Int<'ctx>) -> Int<'ctx> {
    let q = truncating_div(ctx, dividend, divisor);
    Int::sub(ctx, &[dividend, &Int::mul(ctx, &[divisor, &q])])
}
