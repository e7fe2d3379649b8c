use crate::dispatch::{DataContext, Dispatcher, rule_error};
use crate::error::PublishError;
use crate::rules::RuleElement;
use crate::sequence::{Sequence, to_value};
use gridpress_xpath::Value;
use log::warn;
use std::rc::Rc;

pub const LOOP_COUNTER: &str = "_loopcounter";

/// `SetVariable variable select?`: binds the result of `select`, or of the
/// children when there is none.
pub(crate) fn handle_set_variable<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let name = d.required_attribute(rule, "variable", ctx)?;
    let value = match rule.attribute("select") {
        Some(select) => d.evaluate(select, ctx)?,
        None => to_value(&d.execute_children(rule, ctx)?),
    };
    d.assign(&name, value);
    Ok(Vec::new())
}

/// `ForAll select`: runs the children once per selected node.
pub(crate) fn handle_for_all<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let nodes = d.select_nodes(rule, "select", ctx)?;
    let size = nodes.len();
    let mut result = Vec::new();
    for (i, node) in nodes.into_iter().enumerate() {
        d.push_scope();
        let items = d.execute_children(rule, DataContext::at(node, i + 1, size));
        d.pop_scope();
        result.extend(items?);
    }
    Ok(result)
}

/// `Loop select variable?`: runs the children `select` times with the counter
/// (1-based) bound to `variable`.
pub(crate) fn handle_loop<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let select = d.required_raw(rule, "select")?;
    let count = d.evaluate(select, ctx)?.to_number();
    if !count.is_finite() {
        return Err(rule_error(
            rule,
            format!("loop count '{}' is not a finite number ({})", select, count),
        ));
    }
    let variable = d.attribute_or(rule, "variable", ctx, LOOP_COUNTER)?;
    let mut result = Vec::new();
    for i in 1..=count.max(0.0).floor() as u64 {
        d.push_scope();
        d.bind_local(&variable, Value::Number(i as f64));
        let items = d.execute_children(rule, ctx);
        d.pop_scope();
        result.extend(items?);
    }
    Ok(result)
}

/// `Switch` with `Case test` children and an optional `Otherwise`: the first
/// case whose test holds runs.
pub(crate) fn handle_switch<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    for branch in rule.elements() {
        match branch.name.as_str() {
            "Case" => {
                let test = d.required_raw(branch, "test")?;
                if d.evaluate(test, ctx)?.to_bool() {
                    return d.execute_children(branch, ctx);
                }
            }
            "Otherwise" => return d.execute_children(branch, ctx),
            other => warn!("<{}> is not allowed in <Switch> (line {})", other, branch.line),
        }
    }
    Ok(Vec::new())
}
