//! Integration tests for the value engine's operator matrix, exercised
//! through whole expression trees rather than single operator calls.

use yolk_core::ast::Node;
use yolk_core::error::EvalOutcome;
use yolk_core::eval::{evaluate, VariableLookup};
use yolk_core::number::Number;
use yolk_core::value::Value;

struct NoVariables;

impl VariableLookup for NoVariables {
    fn lookup(&self, _name: &str) -> Option<Value> {
        None
    }
}

fn num(n: i64) -> Box<Node> {
    Node::ConstantNumber(Number::from_i64(n)).boxed()
}

fn text(s: &str) -> Box<Node> {
    Node::ConstantString(s.to_string()).boxed()
}

#[cfg(test)]
mod string_number_coercions {
    use super::*;

    #[test]
    fn number_plus_string_stringifies_the_number() {
        let expr = Node::Add(num(5), text(" apples"));
        assert_eq!(
            evaluate(&expr, &NoVariables),
            EvalOutcome::Ok(Value::String("5 apples".to_string()))
        );
    }

    #[test]
    fn string_minus_string_trims_rightmost_suffix() {
        let expr = Node::Subtract(text("hello world hello"), text("hello"));
        assert_eq!(
            evaluate(&expr, &NoVariables),
            EvalOutcome::Ok(Value::String("hello world ".to_string()))
        );
    }

    #[test]
    fn multiply_with_a_string_operand_is_a_static_error_not_a_fault() {
        let expr = Node::Multiply(num(3), text("x"));
        let outcome = evaluate(&expr, &NoVariables);
        assert!(matches!(outcome, EvalOutcome::Static(_)));
    }
}

#[cfg(test)]
mod nested_expressions {
    use super::*;

    #[test]
    fn static_error_deep_in_a_tree_halts_the_whole_evaluation() {
        let inner = Node::Divide(num(1), text("oops"));
        let expr = Node::Add(Box::new(inner), num(1));
        assert!(matches!(evaluate(&expr, &NoVariables), EvalOutcome::Static(_)));
    }

    #[test]
    fn comparison_chain_produces_a_number() {
        let expr = Node::And(
            Box::new(Node::LessThan(num(1), num(2))),
            Box::new(Node::GreaterThan(num(5), num(3))),
        );
        assert_eq!(
            evaluate(&expr, &NoVariables),
            EvalOutcome::Ok(Value::Number(Number::ONE))
        );
    }

    #[test]
    fn not_equal_is_the_logical_complement_of_equal() {
        let eq = evaluate(&Node::EqualTo(num(4), num(4)), &NoVariables);
        let ne = evaluate(&Node::NotEqualTo(num(4), num(4)), &NoVariables);
        assert_eq!(eq, EvalOutcome::Ok(Value::Number(Number::ONE)));
        assert_eq!(ne, EvalOutcome::Ok(Value::Number(Number::ZERO)));
    }
}
