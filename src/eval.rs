//! Pure tree-walking evaluation of an expression against a variable store
//! (§1 "Data flow", §2).
//!
//! The store is an external collaborator (§3's `MachineState`): this module
//! only needs read access to it, expressed as the [`VariableLookup`] trait,
//! so neither engine ends up owning program state it has no business
//! owning.

use tracing::{instrument, warn};

use crate::ast::Node;
use crate::error::EvalOutcome;
use crate::value::{self, BinOp, UnOp, Value};

/// Read access to a machine's variable bindings, keyed by the same name
/// strings [`Node::Variable`] carries.
pub trait VariableLookup {
    /// Looks up `name`, returning its current value if bound.
    ///
    /// An unbound variable is not this trait's concern to define: callers
    /// typically treat it as the numeric zero value, matching the source
    /// language's default-initialized globals, but that policy lives with
    /// the implementer of this trait, not here.
    fn lookup(&self, name: &str) -> Option<Value>;
}

/// Evaluates `node` against `vars`, threading runtime faults and static
/// type errors through exactly as the operators that produced them did.
///
/// This is the statement-evaluation entry point an external scheduler
/// drives once per statement; a runtime fault surfacing anywhere under the
/// tree is logged at the point it originates (see [`log_if_fault`]), not
/// re-logged as it unwinds back up. Only this outer call is instrumented —
/// the recursive walk itself (`evaluate_node`) is not, so one statement
/// costs one span regardless of its expression tree's size.
#[instrument(skip(vars))]
pub fn evaluate(node: &Node, vars: &impl VariableLookup) -> EvalOutcome<Value> {
    evaluate_node(node, vars)
}

fn evaluate_node(node: &Node, vars: &impl VariableLookup) -> EvalOutcome<Value> {
    match node {
        Node::ConstantNumber(n) => EvalOutcome::Ok(Value::Number(*n)),
        Node::ConstantString(s) => EvalOutcome::Ok(Value::String(s.clone())),
        Node::Variable(name) => EvalOutcome::Ok(vars.lookup(name).unwrap_or_default()),

        Node::Add(l, r) => binary(l, r, vars, BinOp::Add),
        Node::Subtract(l, r) => binary(l, r, vars, BinOp::Sub),
        Node::Multiply(l, r) => binary(l, r, vars, BinOp::Mul),
        Node::Divide(l, r) => binary(l, r, vars, BinOp::Div),
        Node::Modulo(l, r) => binary(l, r, vars, BinOp::Mod),
        Node::Exponent(l, r) => binary(l, r, vars, BinOp::Pow),
        Node::EqualTo(l, r) => binary(l, r, vars, BinOp::Eq),
        Node::NotEqualTo(l, r) => binary(l, r, vars, BinOp::Ne),
        Node::LessThan(l, r) => binary(l, r, vars, BinOp::Lt),
        Node::GreaterThan(l, r) => binary(l, r, vars, BinOp::Gt),
        Node::LessThanEq(l, r) => binary(l, r, vars, BinOp::Le),
        Node::GreaterThanEq(l, r) => binary(l, r, vars, BinOp::Ge),
        Node::And(l, r) => binary(l, r, vars, BinOp::And),
        Node::Or(l, r) => binary(l, r, vars, BinOp::Or),

        Node::Not(operand) => unary(operand, vars, UnOp::Not),
        Node::Negate(operand) => unary(operand, vars, UnOp::Negate),
        Node::Abs(operand) => unary(operand, vars, UnOp::Abs),
        Node::Sqrt(operand) => unary(operand, vars, UnOp::Sqrt),
        Node::Sin(operand) => unary(operand, vars, UnOp::Sin),
        Node::Cos(operand) => unary(operand, vars, UnOp::Cos),
        Node::Tan(operand) => unary(operand, vars, UnOp::Tan),
        Node::ArcSin(operand) => unary(operand, vars, UnOp::ArcSin),
        Node::ArcCos(operand) => unary(operand, vars, UnOp::ArcCos),
        Node::ArcTan(operand) => unary(operand, vars, UnOp::ArcTan),
        Node::Factorial(operand) => unary(operand, vars, UnOp::Factorial),

        Node::PreIncrement(operand) | Node::PostIncrement(operand) => {
            let value = match evaluate_node(operand, vars) {
                EvalOutcome::Ok(v) => v,
                other => return other,
            };
            log_if_fault("++", value::increment_value(value))
        }
        Node::PreDecrement(operand) | Node::PostDecrement(operand) => {
            let value = match evaluate_node(operand, vars) {
                EvalOutcome::Ok(v) => v,
                other => return other,
            };
            log_if_fault("--", value::decrement_value(value))
        }
    }
}

fn binary(lhs: &Node, rhs: &Node, vars: &impl VariableLookup, op: BinOp) -> EvalOutcome<Value> {
    let lhs = match evaluate_node(lhs, vars) {
        EvalOutcome::Ok(v) => v,
        other => return other,
    };
    let rhs = match evaluate_node(rhs, vars) {
        EvalOutcome::Ok(v) => v,
        other => return other,
    };
    log_if_fault(op_name(op), value::apply_binary(op, lhs, rhs))
}

fn unary(operand: &Node, vars: &impl VariableLookup, op: UnOp) -> EvalOutcome<Value> {
    let value = match evaluate_node(operand, vars) {
        EvalOutcome::Ok(v) => v,
        other => return other,
    };
    log_if_fault(unop_name(op), value::apply_unary(op, value))
}

/// Warns on a runtime-fault short-circuit (`DivideByZero` etc.) and passes
/// `outcome` through unchanged; static type errors are not logged here,
/// since they are an ordinary analysable result rather than a fault (§2).
fn log_if_fault(operator: &str, outcome: EvalOutcome<Value>) -> EvalOutcome<Value> {
    if let EvalOutcome::Runtime(ref fault) = outcome {
        warn!(operator, %fault, "runtime fault evaluating operator");
    }
    outcome
}

const fn op_name(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Pow => "^",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::And => "and",
        BinOp::Or => "or",
    }
}

const fn unop_name(op: UnOp) -> &'static str {
    match op {
        UnOp::Negate => "-",
        UnOp::Not => "not",
        UnOp::Abs => "abs",
        UnOp::Sqrt => "sqrt",
        UnOp::Sin => "sin",
        UnOp::Cos => "cos",
        UnOp::Tan => "tan",
        UnOp::ArcSin => "asin",
        UnOp::ArcCos => "acos",
        UnOp::ArcTan => "atan",
        UnOp::Factorial => "!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::Number;
    use std::collections::HashMap;

    struct MapLookup(HashMap<String, Value>);

    impl VariableLookup for MapLookup {
        fn lookup(&self, name: &str) -> Option<Value> {
            self.0.get(name).cloned()
        }
    }

    #[test]
    fn variable_resolves_through_lookup() {
        let mut vars = HashMap::new();
        vars.insert("x".to_string(), Value::Number(Number::from_i64(4)));
        let lookup = MapLookup(vars);
        let node = Node::Add(
            Node::Variable("x".to_string()).boxed(),
            Node::ConstantNumber(Number::from_i64(1)).boxed(),
        );
        assert_eq!(
            evaluate(&node, &lookup),
            EvalOutcome::Ok(Value::Number(Number::from_i64(5)))
        );
    }

    #[test]
    fn unbound_variable_defaults_to_number_zero() {
        let lookup = MapLookup(HashMap::new());
        let node = Node::Variable("unset".to_string());
        assert_eq!(evaluate(&node, &lookup), EvalOutcome::Ok(Value::Number(Number::ZERO)));
    }

    #[test]
    fn static_type_error_short_circuits_outer_expression() {
        let lookup = MapLookup(HashMap::new());
        let node = Node::Add(
            Node::Multiply(
                Node::ConstantNumber(Number::from_i64(2)).boxed(),
                Node::ConstantString("x".to_string()).boxed(),
            )
            .boxed(),
            Node::ConstantNumber(Number::from_i64(1)).boxed(),
        );
        assert!(matches!(evaluate(&node, &lookup), EvalOutcome::Static(_)));
    }

    #[test]
    fn runtime_fault_short_circuits_outer_expression() {
        let lookup = MapLookup(HashMap::new());
        let node = Node::Add(
            Node::Divide(
                Node::ConstantNumber(Number::from_i64(1)).boxed(),
                Node::ConstantNumber(Number::ZERO).boxed(),
            )
            .boxed(),
            Node::ConstantNumber(Number::from_i64(1)).boxed(),
        );
        assert!(matches!(
            evaluate(&node, &lookup),
            EvalOutcome::Runtime(crate::error::ExecutionError::DivideByZero)
        ));
    }
}
