//! Core function library plus the hook for caller-provided extension functions.

use crate::engine::{EvaluationContext, Value};
use crate::error::XPathError;

/// Functions supplied by the embedding engine (e.g. `sd:current-page()`).
///
/// Returning `None` means the function is unknown to this provider.
pub trait ExtensionFunctions<'a, 'input> {
    fn call(
        &self,
        name: &str,
        args: &[Value<'a, 'input>],
        ctx: &EvaluationContext<'a, 'input, '_>,
    ) -> Option<Result<Value<'a, 'input>, XPathError>>;
}

/// An extension provider that knows no functions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExtensions;

impl<'a, 'input> ExtensionFunctions<'a, 'input> for NoExtensions {
    fn call(
        &self,
        _name: &str,
        _args: &[Value<'a, 'input>],
        _ctx: &EvaluationContext<'a, 'input, '_>,
    ) -> Option<Result<Value<'a, 'input>, XPathError>> {
        None
    }
}

fn expect_args(name: &str, args: &[Value<'_, '_>], min: usize, max: usize) -> Result<(), XPathError> {
    if args.len() < min || args.len() > max {
        return Err(XPathError::function(
            name,
            format!("expected {}..={} arguments, got {}", min, max, args.len()),
        ));
    }
    Ok(())
}

/// First argument as string, or the context node's string value when absent.
fn string_arg(args: &[Value<'_, '_>], ctx: &EvaluationContext<'_, '_, '_>) -> String {
    args.first()
        .map(|v| v.to_string())
        .unwrap_or_else(|| ctx.context_node.string_value())
}

pub fn evaluate_function<'a, 'input>(
    name: &str,
    args: Vec<Value<'a, 'input>>,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<Value<'a, 'input>, XPathError> {
    let value = match name {
        "true" => {
            expect_args(name, &args, 0, 0)?;
            Value::Boolean(true)
        }
        "false" => {
            expect_args(name, &args, 0, 0)?;
            Value::Boolean(false)
        }
        "not" => {
            expect_args(name, &args, 1, 1)?;
            Value::Boolean(!args[0].to_bool())
        }
        "boolean" => {
            expect_args(name, &args, 1, 1)?;
            Value::Boolean(args[0].to_bool())
        }
        "position" => Value::Number(ctx.context_position as f64),
        "last" => Value::Number(ctx.context_size as f64),
        "count" => {
            expect_args(name, &args, 1, 1)?;
            match &args[0] {
                Value::NodeSet(nodes) => Value::Number(nodes.len() as f64),
                _ => return Err(XPathError::function(name, "argument must be a node set")),
            }
        }
        "empty" => {
            expect_args(name, &args, 1, 1)?;
            Value::Boolean(args[0].is_empty())
        }
        "string" => {
            expect_args(name, &args, 0, 1)?;
            Value::String(string_arg(&args, ctx))
        }
        "number" => {
            expect_args(name, &args, 0, 1)?;
            match args.first() {
                Some(v) => Value::Number(v.to_number()),
                None => Value::Number(
                    ctx.context_node.string_value().trim().parse().unwrap_or(f64::NAN),
                ),
            }
        }
        "concat" => Value::String(args.iter().map(|a| a.to_string()).collect()),
        "contains" => {
            expect_args(name, &args, 2, 2)?;
            Value::Boolean(args[0].to_string().contains(&args[1].to_string()))
        }
        "starts-with" => {
            expect_args(name, &args, 2, 2)?;
            Value::Boolean(args[0].to_string().starts_with(&args[1].to_string()))
        }
        "string-length" => {
            expect_args(name, &args, 0, 1)?;
            Value::Number(string_arg(&args, ctx).chars().count() as f64)
        }
        "normalize-space" => {
            expect_args(name, &args, 0, 1)?;
            let s = string_arg(&args, ctx);
            Value::String(s.split_whitespace().collect::<Vec<_>>().join(" "))
        }
        "upper-case" => {
            expect_args(name, &args, 1, 1)?;
            Value::String(args[0].to_string().to_uppercase())
        }
        "sum" => {
            expect_args(name, &args, 1, 1)?;
            match &args[0] {
                Value::NodeSet(nodes) => Value::Number(
                    nodes
                        .iter()
                        .map(|n| n.string_value().trim().parse::<f64>().unwrap_or(f64::NAN))
                        .sum(),
                ),
                _ => return Err(XPathError::function(name, "argument must be a node set")),
            }
        }
        "floor" => {
            expect_args(name, &args, 1, 1)?;
            Value::Number(args[0].to_number().floor())
        }
        "ceiling" => {
            expect_args(name, &args, 1, 1)?;
            Value::Number(args[0].to_number().ceil())
        }
        "round" => {
            expect_args(name, &args, 1, 1)?;
            Value::Number((args[0].to_number() + 0.5).floor())
        }
        "name" | "local-name" => {
            expect_args(name, &args, 0, 1)?;
            let node = match args.first() {
                Some(Value::NodeSet(nodes)) => nodes.first().copied(),
                Some(_) => return Err(XPathError::function(name, "argument must be a node set")),
                None => Some(ctx.context_node),
            };
            Value::String(node.and_then(|n| n.name()).unwrap_or_default().to_string())
        }
        _ => {
            return ctx
                .extensions
                .call(name, &args, ctx)
                .unwrap_or_else(|| Err(XPathError::UnknownFunction(name.to_string())));
        }
    };
    Ok(value)
}
