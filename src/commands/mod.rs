//! The layout commands, one handler per rule element.
mod content;
mod control_flow;
mod groups;
mod placement;
mod templates;

use crate::dispatch::{Command, DataContext, Dispatcher, rule_error};
use crate::error::PublishError;
use crate::rules::RuleElement;
use gridpress_layout::Grid;
use gridpress_style::Extent;
use std::collections::HashMap;

/// Maps layout element names to their handlers.
pub(crate) fn command_table<'s, 'a, 'input>() -> HashMap<&'static str, Command<'s, 'a, 'input>> {
    let entries: [(&'static str, Command<'s, 'a, 'input>); 21] = [
        ("Record", templates::handle_record),
        ("ProcessNode", templates::handle_process_node),
        ("Pagetype", templates::handle_pagetype),
        ("Value", content::handle_value),
        ("Copy-of", content::handle_copy_of),
        ("Paragraph", content::handle_paragraph),
        ("Textblock", content::handle_textblock),
        ("Image", content::handle_image),
        ("Box", content::handle_box),
        ("Message", content::handle_message),
        ("PlaceObject", placement::handle_place_object),
        ("NewPage", placement::handle_new_page),
        ("NextRow", placement::handle_next_row),
        ("SetGrid", placement::handle_set_grid),
        ("Group", groups::handle_group),
        ("Contents", groups::handle_contents),
        ("Mark", groups::handle_mark),
        ("SetVariable", control_flow::handle_set_variable),
        ("ForAll", control_flow::handle_for_all),
        ("Loop", control_flow::handle_loop),
        ("Switch", control_flow::handle_switch),
    ];
    HashMap::from(entries)
}

/// The grid content goes to, creating a page first if there is none.
fn target_grid<'d, 'a, 'input>(
    d: &'d mut Dispatcher<'_, 'a, 'input>,
    rule: &RuleElement,
    ctx: DataContext<'a, 'input>,
) -> Result<&'d Grid, PublishError> {
    d.ensure_target(ctx)?;
    d.document
        .target_grid()
        .ok_or_else(|| rule_error(rule, "there is no page or group to lay out on"))
}

/// Length in points of an extent; cells span their interior gaps.
fn extent_length(grid: &Grid, extent: Extent, horizontal: bool) -> f64 {
    match extent {
        Extent::Length(length) => length,
        Extent::Cells(n) => {
            let (cell, gap) = if horizontal {
                (grid.cell_width, grid.gap_x)
            } else {
                (grid.cell_height, grid.gap_y)
            };
            n * cell + (n - 1.0).max(0.0) * gap
        }
    }
}

/// Resolves named extent attributes to points. The grid is only consulted (and a
/// page only created) when one of them is given in cells.
fn lengths<'a, 'input, const N: usize>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &RuleElement,
    ctx: DataContext<'a, 'input>,
    names: [(&str, bool); N],
) -> Result<[Option<f64>; N], PublishError> {
    let mut extents = [None; N];
    for (slot, (name, _)) in extents.iter_mut().zip(names) {
        *slot = d.extent_attribute(rule, name, ctx)?;
    }
    let needs_grid = extents.iter().any(|e| matches!(e, Some(Extent::Cells(_))));
    let grid = if needs_grid {
        Some(target_grid(d, rule, ctx)?)
    } else {
        None
    };
    let mut out = [None; N];
    for ((slot, extent), (_, horizontal)) in out.iter_mut().zip(extents).zip(names) {
        *slot = extent.map(|e| match (e, grid) {
            (Extent::Cells(_), Some(grid)) => extent_length(grid, e, horizontal),
            (Extent::Cells(n), None) => n,
            (Extent::Length(length), _) => length,
        });
    }
    Ok(out)
}
