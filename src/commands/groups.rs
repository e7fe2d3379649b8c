use crate::dispatch::{DataContext, Dispatcher, rule_error};
use crate::error::PublishError;
use crate::rules::RuleElement;
use crate::sequence::Sequence;
use std::rc::Rc;

/// `Group name` with a `Contents` child: lays the contents out on a private grid
/// and keeps the result under `name`.
pub(crate) fn handle_group<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let name = d.required_attribute(rule, "name", ctx)?;
    let Some(contents) = rule.child("Contents") else {
        return Err(rule_error(rule, format!("group '{}' has no Contents", name)));
    };
    d.document.start_group(&name)?;
    let result = d.execute_children(contents, ctx);
    d.document.end_group();
    result?;
    Ok(Vec::new())
}

pub(crate) fn handle_contents<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    d.execute_children(rule, ctx)
}

/// `Mark select pdftarget? shift?`: records a named position on the current page.
pub(crate) fn handle_mark<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let select = d.required_raw(rule, "select")?;
    let name = d.evaluate(select, ctx)?.to_string();
    if name.is_empty() {
        return Err(rule_error(rule, format!("'{}' yields an empty marker name", select)));
    }
    let pdftarget = d.bool_attribute(rule, "pdftarget", ctx, false)?;
    let shift = d.length_attribute(rule, "shift", ctx)?;
    d.document.set_marker(&name, pdftarget, shift);
    Ok(Vec::new())
}
