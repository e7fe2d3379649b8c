//! Evaluates a parsed expression against a data-tree node.

use crate::ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
use crate::datasource::DataNode;
use crate::error::XPathError;
use crate::functions::{self, ExtensionFunctions};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// The result types of an expression evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a, 'input> {
    NodeSet(Vec<DataNode<'a, 'input>>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, 'input> Value<'a, 'input> {
    /// Boolean coercion: non-empty node set, non-empty string, non-zero number.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::NodeSet(nodes) => !nodes.is_empty(),
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Boolean(b) => *b,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::NodeSet(nodes) => nodes
                .first()
                .map(|n| n.string_value())
                .unwrap_or_default()
                .trim()
                .parse()
                .unwrap_or(f64::NAN),
        }
    }

    /// Number of items when the value is viewed as a sequence.
    pub fn len(&self) -> usize {
        match self {
            Value::NodeSet(nodes) => nodes.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Formats a number the way `string()` does: integral values without a fraction.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::NodeSet(nodes) => write!(
                f,
                "{}",
                nodes.first().map(|n| n.string_value()).unwrap_or_default()
            ),
            Value::String(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Source of `$name` bindings.
pub trait VariableResolver<'a, 'input> {
    fn variable(&self, name: &str) -> Option<Value<'a, 'input>>;
}

impl<'a, 'input> VariableResolver<'a, 'input> for HashMap<String, Value<'a, 'input>> {
    fn variable(&self, name: &str) -> Option<Value<'a, 'input>> {
        self.get(name).cloned()
    }
}

/// All state needed during expression evaluation.
pub struct EvaluationContext<'a, 'input, 'd> {
    pub context_node: DataNode<'a, 'input>,
    /// 1-based position within the current node list.
    pub context_position: usize,
    pub context_size: usize,
    pub variables: &'d dyn VariableResolver<'a, 'input>,
    pub extensions: &'d dyn ExtensionFunctions<'a, 'input>,
}

impl<'a, 'input, 'd> EvaluationContext<'a, 'input, 'd> {
    pub fn new(
        context_node: DataNode<'a, 'input>,
        variables: &'d dyn VariableResolver<'a, 'input>,
        extensions: &'d dyn ExtensionFunctions<'a, 'input>,
    ) -> Self {
        Self {
            context_node,
            context_position: 1,
            context_size: 1,
            variables,
            extensions,
        }
    }

    fn with_node(&self, node: DataNode<'a, 'input>, position: usize, size: usize) -> Self {
        Self {
            context_node: node,
            context_position: position,
            context_size: size,
            variables: self.variables,
            extensions: self.extensions,
        }
    }
}

pub fn evaluate<'a, 'input>(
    expr: &Expression,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<Value<'a, 'input>, XPathError> {
    match expr {
        Expression::Literal(s) => Ok(Value::String(s.clone())),
        Expression::Number(n) => Ok(Value::Number(*n)),
        Expression::LocationPath(path) => Ok(Value::NodeSet(evaluate_location_path(path, ctx)?)),
        Expression::Variable(name) => ctx
            .variables
            .variable(name)
            .ok_or_else(|| XPathError::UnknownVariable(name.clone())),
        Expression::FunctionCall { name, args } => {
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(evaluate(arg, ctx)?);
            }
            functions::evaluate_function(name, evaluated, ctx)
        }
        Expression::BinaryOp { left, op, right } => {
            let left = evaluate(left, ctx)?;
            // `and` / `or` short-circuit.
            match op {
                BinaryOperator::And if !left.to_bool() => return Ok(Value::Boolean(false)),
                BinaryOperator::Or if left.to_bool() => return Ok(Value::Boolean(true)),
                _ => {}
            }
            let right = evaluate(right, ctx)?;
            apply_operator(*op, left, right)
        }
        Expression::Negate(inner) => Ok(Value::Number(-evaluate(inner, ctx)?.to_number())),
    }
}

fn apply_operator<'a, 'input>(
    op: BinaryOperator,
    left: Value<'a, 'input>,
    right: Value<'a, 'input>,
) -> Result<Value<'a, 'input>, XPathError> {
    use BinaryOperator::*;
    let result = match op {
        Or => Value::Boolean(left.to_bool() || right.to_bool()),
        And => Value::Boolean(left.to_bool() && right.to_bool()),
        Equals | NotEquals | LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual => {
            Value::Boolean(compare(op, &left, &right))
        }
        Plus => Value::Number(left.to_number() + right.to_number()),
        Minus => Value::Number(left.to_number() - right.to_number()),
        Multiply => Value::Number(left.to_number() * right.to_number()),
        Divide => Value::Number(left.to_number() / right.to_number()),
        Modulo => Value::Number(left.to_number() % right.to_number()),
        Union => match (left, right) {
            (Value::NodeSet(a), Value::NodeSet(b)) => {
                let merged: BTreeSet<_> = a.into_iter().chain(b).collect();
                Value::NodeSet(merged.into_iter().collect())
            }
            _ => {
                return Err(XPathError::TypeError(
                    "the '|' operator requires node sets on both sides".to_string(),
                ));
            }
        },
    };
    Ok(result)
}

/// Atomized view of a value used in comparisons: node sets compare per member.
fn atoms(value: &Value<'_, '_>) -> Vec<Value<'static, 'static>> {
    match value {
        Value::NodeSet(nodes) => nodes
            .iter()
            .map(|n| Value::String(n.string_value()))
            .collect(),
        Value::String(s) => vec![Value::String(s.clone())],
        Value::Number(n) => vec![Value::Number(*n)],
        Value::Boolean(b) => vec![Value::Boolean(*b)],
    }
}

fn compare(op: BinaryOperator, left: &Value<'_, '_>, right: &Value<'_, '_>) -> bool {
    // A boolean on either side compares the other side's boolean value.
    if matches!(left, Value::Boolean(_)) || matches!(right, Value::Boolean(_)) {
        let (l, r) = (left.to_bool(), right.to_bool());
        return match op {
            BinaryOperator::Equals => l == r,
            BinaryOperator::NotEquals => l != r,
            _ => compare_numbers(op, l as u8 as f64, r as u8 as f64),
        };
    }
    let (ls, rs) = (atoms(left), atoms(right));
    ls.iter().any(|l| {
        rs.iter().any(|r| match op {
            BinaryOperator::Equals | BinaryOperator::NotEquals => {
                let numeric = matches!(l, Value::Number(_)) || matches!(r, Value::Number(_));
                let equal = if numeric {
                    l.to_number() == r.to_number()
                } else {
                    l.to_string() == r.to_string()
                };
                equal == (op == BinaryOperator::Equals)
            }
            _ => compare_numbers(op, l.to_number(), r.to_number()),
        })
    })
}

fn compare_numbers(op: BinaryOperator, l: f64, r: f64) -> bool {
    match op {
        BinaryOperator::LessThan => l < r,
        BinaryOperator::LessThanOrEqual => l <= r,
        BinaryOperator::GreaterThan => l > r,
        BinaryOperator::GreaterThanOrEqual => l >= r,
        BinaryOperator::Equals => l == r,
        _ => l != r,
    }
}

fn evaluate_location_path<'a, 'input>(
    path: &LocationPath,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<Vec<DataNode<'a, 'input>>, XPathError> {
    let mut current = if let Some(start) = &path.start_point {
        match evaluate(start, ctx)? {
            Value::NodeSet(nodes) => nodes,
            _ => return Ok(vec![]),
        }
    } else if path.is_absolute {
        vec![ctx.context_node.root()]
    } else {
        vec![ctx.context_node]
    };

    for step in &path.steps {
        current = evaluate_step(step, &current, ctx)?;
    }
    Ok(current)
}

fn evaluate_step<'a, 'input>(
    step: &Step,
    context_nodes: &[DataNode<'a, 'input>],
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<Vec<DataNode<'a, 'input>>, XPathError> {
    let mut result = Vec::new();
    // Predicates are applied per context node so that positions are relative to it.
    for &node in context_nodes {
        let candidates: Vec<_> = collect_axis_nodes(step.axis, node)
            .into_iter()
            .filter(|n| node_test_matches(n, &step.node_test, step.axis))
            .collect();
        result.extend(apply_predicates(candidates, &step.predicates, ctx)?);
    }
    let unique: BTreeSet<_> = result.into_iter().collect();
    Ok(unique.into_iter().collect())
}

fn collect_axis_nodes<'a, 'input>(axis: Axis, node: DataNode<'a, 'input>) -> Vec<DataNode<'a, 'input>> {
    match axis {
        Axis::Child => node.children().collect(),
        Axis::Attribute => node.attributes().collect(),
        Axis::SelfAxis => vec![node],
        Axis::Parent => node.parent().into_iter().collect(),
        Axis::DescendantOrSelf => node.descendants_or_self(),
    }
}

fn node_test_matches(node: &DataNode<'_, '_>, test: &NodeTest, axis: Axis) -> bool {
    match test {
        NodeTest::Node => true,
        NodeTest::Text => node.is_text(),
        NodeTest::Wildcard => match axis {
            Axis::Attribute => node.is_attribute(),
            _ => node.is_element(),
        },
        NodeTest::Name(name) => {
            let local = name.rsplit(':').next().unwrap_or(name);
            let kind_ok = match axis {
                Axis::Attribute => node.is_attribute(),
                _ => node.is_element(),
            };
            kind_ok && node.name() == Some(local)
        }
    }
}

fn apply_predicates<'a, 'input>(
    nodes: Vec<DataNode<'a, 'input>>,
    predicates: &[Expression],
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<Vec<DataNode<'a, 'input>>, XPathError> {
    let mut current = nodes;
    for predicate in predicates {
        let size = current.len();
        let mut kept = Vec::with_capacity(size);
        for (i, node) in current.iter().enumerate() {
            let inner = ctx.with_node(*node, i + 1, size);
            let keep = match evaluate(predicate, &inner)? {
                Value::Number(n) => n == (i + 1) as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(*node);
            }
        }
        current = kept;
    }
    Ok(current)
}
