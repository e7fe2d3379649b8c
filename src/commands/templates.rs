use crate::dispatch::{DataContext, Dispatcher, invalid, missing, rule_error};
use crate::error::{ErrorKind, PublishError};
use crate::rules::RuleElement;
use crate::sequence::Sequence;
use gridpress_layout::{AreaDefinition, FrameSpec, PageType};
use gridpress_style::Margins;
use gridpress_style::parsers::parse_shorthand_margins;
use gridpress_xpath::parse_expression;
use log::{debug, warn};
use std::rc::Rc;

/// `Record element mode?`: remembers the rule body for data elements of that name.
pub(crate) fn handle_record<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let element = d.required_attribute(rule, "element", ctx)?;
    let mode = d.attribute_or(rule, "mode", ctx, "")?;
    debug!("Recording rule for <{}> (mode '{}')", element, mode);
    d.document.patterns.record(&element, &mode, Rc::clone(rule));
    Ok(Vec::new())
}

/// `ProcessNode select mode?`: applies the recorded rule of every selected element.
pub(crate) fn handle_process_node<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let mode = d.attribute_or(rule, "mode", ctx, "")?;
    let nodes = d.select_nodes(rule, "select", ctx)?;
    let size = nodes.len();
    let mut result = Vec::new();
    for (i, node) in nodes.into_iter().enumerate() {
        if !node.is_element() {
            continue;
        }
        let Some(name) = node.name() else {
            continue;
        };
        match d.document.patterns.lookup(name, &mode) {
            Some(pattern) => {
                let items = d.execute_children(&pattern, DataContext::at(node, i + 1, size))?;
                result.extend(items);
            }
            None => warn!("No rule for element <{}> (mode '{}'), skipped", name, mode),
        }
    }
    Ok(result)
}

fn required_cells<'a, 'input>(
    d: &Dispatcher<'_, 'a, 'input>,
    rule: &RuleElement,
    name: &str,
    ctx: DataContext<'a, 'input>,
) -> Result<u32, PublishError> {
    d.cells_attribute(rule, name, ctx)?
        .ok_or_else(|| missing(rule, name))
}

/// `Margin value? left? right? top? bottom?`: `value` takes one, two or four
/// lengths like a CSS margin; single sides override it.
fn margins<'a, 'input>(
    d: &Dispatcher<'_, 'a, 'input>,
    rule: &RuleElement,
    ctx: DataContext<'a, 'input>,
    defaults: Margins,
) -> Result<Margins, PublishError> {
    let defaults = match d.attribute(rule, "value", ctx)? {
        Some(value) => parse_shorthand_margins(&value)
            .map_err(|e| invalid(rule, "value", &value, e.to_string()))?,
        None => defaults,
    };
    Ok(Margins {
        left: d.length_attribute(rule, "left", ctx)?.unwrap_or(defaults.left),
        right: d.length_attribute(rule, "right", ctx)?.unwrap_or(defaults.right),
        top: d.length_attribute(rule, "top", ctx)?.unwrap_or(defaults.top),
        bottom: d.length_attribute(rule, "bottom", ctx)?.unwrap_or(defaults.bottom),
    })
}

fn area<'a, 'input>(
    d: &Dispatcher<'_, 'a, 'input>,
    rule: &RuleElement,
    ctx: DataContext<'a, 'input>,
) -> Result<AreaDefinition, PublishError> {
    let name = d.required_attribute(rule, "name", ctx)?;
    let mut frames = Vec::new();
    for frame in rule.elements() {
        if frame.name != "PositioningFrame" {
            warn!("<{}> is not allowed in <PositioningArea>, skipped", frame.name);
            continue;
        }
        frames.push(FrameSpec::new(
            required_cells(d, frame, "column", ctx)?,
            required_cells(d, frame, "row", ctx)?,
            required_cells(d, frame, "width", ctx)?,
            required_cells(d, frame, "height", ctx)?,
        ));
    }
    if frames.is_empty() {
        return Err(rule_error(rule, format!("area '{}' has no PositioningFrame", name)));
    }
    Ok(AreaDefinition { name, frames })
}

/// `Pagetype name test` with optional `Margin` and `PositioningArea` children.
pub(crate) fn handle_pagetype<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let name = d.required_attribute(rule, "name", ctx)?;
    let test = d.required_raw(rule, "test")?;
    parse_expression(test).map_err(|source| ErrorKind::Expression {
        expression: test.to_string(),
        source,
    })?;

    let mut page_margins = d.document.default_margins();
    let mut areas = Vec::new();
    for child in rule.elements() {
        match child.name.as_str() {
            "Margin" => page_margins = margins(d, child, ctx, page_margins)?,
            "PositioningArea" => areas.push(area(d, child, ctx)?),
            other => warn!("<{}> is not allowed in <Pagetype>, skipped", other),
        }
    }

    let mut pagetype = PageType::new(name, test, page_margins);
    pagetype.areas = areas;
    debug!(
        "Page type '{}' registered with {} area(s)",
        pagetype.name,
        pagetype.areas.len()
    );
    d.document.pagetypes.register(pagetype);
    Ok(Vec::new())
}
