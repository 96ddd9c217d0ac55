//! Integration tests for the symbolic model: every assertion here checks
//! that the solver proves exactly what the concrete evaluator would, never
//! more (§8 "testable properties").

use yolk_core::ast::Node;
use yolk_core::number::Number;
use yolk_core::smt::{ModelConfig, SmtModel};
use yolk_core::value::Value;

fn num(n: i64) -> Box<Node> {
    Node::ConstantNumber(Number::from_i64(n)).boxed()
}

fn text(s: &str) -> Box<Node> {
    Node::ConstantString(s.to_string()).boxed()
}

#[test]
fn a_variable_tied_to_a_concrete_number_is_exactly_that_number() {
    let config = ModelConfig::default();
    let z3_config = config.to_z3_config();
    let ctx = z3::Context::new(&z3_config);
    let mut model = SmtModel::new(&ctx);

    let x = model.get_or_create("x");
    model.assert_eq_value(x, &Value::Number(Number::from_i64(7)));

    assert!(model.is_value_available(x));
    assert!(model.is_value(x, &Value::Number(Number::from_i64(7))));
    assert!(!model.can_be_value(x, &Value::Number(Number::from_i64(8))));
    assert!(model.can_be_number(x));
    assert!(!model.can_be_string(x));
}

#[test]
fn numeric_addition_is_fully_determined() {
    let config = ModelConfig::default();
    let z3_config = config.to_z3_config();
    let ctx = z3::Context::new(&z3_config);
    let mut model = SmtModel::new(&ctx);

    let sum = model.get_or_create("sum");
    let expr = Node::Add(num(2), num(3));
    model.assert_eq_expr(sum, &expr);

    assert!(model.is_value_available(sum));
    assert!(model.is_value(sum, &Value::Number(Number::from_i64(5))));
}

#[test]
fn mixed_number_and_string_addition_is_not_value_available() {
    let config = ModelConfig::default();
    let z3_config = config.to_z3_config();
    let ctx = z3::Context::new(&z3_config);
    let mut model = SmtModel::new(&ctx);

    let result = model.get_or_create("result");
    let expr = Node::Add(num(1), text("x"));
    model.assert_eq_expr(result, &expr);

    // The type is still knowable...
    assert!(model.can_be_string(result));
    assert!(!model.can_be_number(result));
    // ...but the exact value is not, by construction (mixed-type Add taints).
    assert!(!model.is_value_available(result));
}

#[test]
fn an_unconstrained_variable_can_be_either_type() {
    let config = ModelConfig::default();
    let z3_config = config.to_z3_config();
    let ctx = z3::Context::new(&z3_config);
    let mut model = SmtModel::new(&ctx);

    let free = model.get_or_create("free");
    assert!(model.can_be_number(free));
    assert!(model.can_be_string(free));
    assert!(!model.is_value_available(free));
}

#[test]
fn two_bindings_asserted_equal_share_every_query_answer() {
    let config = ModelConfig::default();
    let z3_config = config.to_z3_config();
    let ctx = z3::Context::new(&z3_config);
    let mut model = SmtModel::new(&ctx);

    let a = model.get_or_create("a");
    let b = model.get_or_create("b");
    model.assert_eq_value(a, &Value::String("hi".to_string()));
    model.assert_eq_bindings(a, b);

    assert!(model.is_value(b, &Value::String("hi".to_string())));
}

#[test]
fn exponentiation_leaves_the_numeric_value_unknown() {
    let config = ModelConfig::default();
    let z3_config = config.to_z3_config();
    let ctx = z3::Context::new(&z3_config);
    let mut model = SmtModel::new(&ctx);

    let power = model.get_or_create("power");
    let expr = Node::Exponent(num(2), num(10));
    model.assert_eq_expr(power, &expr);

    assert!(model.can_be_number(power));
    assert!(!model.is_value_available(power));
}
