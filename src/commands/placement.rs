use crate::dispatch::{DataContext, Dispatcher, rule_error};
use crate::error::PublishError;
use crate::rules::RuleElement;
use crate::sequence::{Sequence, boxes};
use gridpress_layout::{Grid, PAGE_AREA};
use gridpress_types::ContentBox;
use log::{debug, warn};
use std::rc::Rc;

fn grid_mut<'d>(d: &'d mut Dispatcher<'_, '_, '_>, rule: &RuleElement) -> Result<&'d mut Grid, PublishError> {
    d.document
        .target_grid_mut()
        .ok_or_else(|| rule_error(rule, "there is no page or group to lay out on"))
}

fn single_box(rule: &RuleElement, items: Sequence<'_, '_>) -> Result<ContentBox, PublishError> {
    let mut found = boxes(items);
    match found.len() {
        1 => Ok(found.remove(0)),
        n => Err(rule_error(
            rule,
            format!("expected exactly one object to place, got {}", n),
        )),
    }
}

/// Frame-relative cell where a `columns` x `rows` object goes next in the flow of
/// `area`. Moves on to the next frame and then to a new page when the current one
/// is full; an object that does not fit even on a fresh page is placed at the
/// cursor and overflows.
fn flow_position<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &RuleElement,
    ctx: DataContext<'a, 'input>,
    area: &str,
    columns: u32,
    rows: u32,
) -> Result<(i64, i64), PublishError> {
    let mut fresh_page = false;
    loop {
        let grid = grid_mut(d, rule)?;
        let (mut column, _) = grid.cursor(area)?;
        let span_end = u64::from(column) + u64::from(columns) - 1;
        if column > 1 && span_end > u64::from(grid.frame_width(area)?) {
            grid.next_row(area, 1)?;
            column = 1;
        }
        if let Some(row) = grid.find_suitable_row(columns, rows, column, area)? {
            return Ok((i64::from(column), i64::from(row)));
        }
        if column > 1 && grid.next_row(area, 1)? {
            if let Some(row) = grid.find_suitable_row(columns, rows, 1, area)? {
                return Ok((1, i64::from(row)));
            }
        }
        if grid.advance_frame(area)? {
            debug!("Area '{}' continues in its next frame", area);
            continue;
        }
        if d.document.in_group() || fresh_page || grid_mut(d, rule)?.at_flow_start(area)? {
            let (_, row) = grid_mut(d, rule)?.cursor(area)?;
            warn!(
                "No room for an object of {}x{} cells in area '{}', it overflows",
                columns, rows, area
            );
            return Ok((1, i64::from(row)));
        }
        debug!("Area '{}' is full, starting a new page", area);
        d.document.finish_page()?;
        d.ensure_target(ctx)?;
        fresh_page = true;
    }
}

/// `PlaceObject`: puts one object on the page (or group). With `x`/`y` the object
/// goes to that absolute position and takes no cells; with `column`/`row` it goes
/// to that cell; otherwise it follows the flow of its area.
pub(crate) fn handle_place_object<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let area = d.attribute_or(rule, "area", ctx, PAGE_AREA)?;
    let allocate = d.bool_attribute(rule, "allocate", ctx, true)?;
    let column = d.position_attribute(rule, "column", ctx)?;
    let row = d.position_attribute(rule, "row", ctx)?;
    let x = d.length_attribute(rule, "x", ctx)?;
    let y = d.length_attribute(rule, "y", ctx)?;

    let content = match d.attribute(rule, "groupname", ctx)? {
        Some(name) => d.document.group(&name)?.to_content_box().ok_or_else(|| {
            rule_error(rule, format!("group '{}' has not been laid out", name))
        })?,
        None => single_box(rule, d.execute_children(rule, ctx)?)?,
    };
    d.ensure_target(ctx)?;

    match (x, y) {
        (Some(x), Some(y)) => {
            d.document.place(x, y, content);
            return Ok(Vec::new());
        }
        (None, None) => {}
        _ => return Err(rule_error(rule, "x and y must be given together")),
    }

    let grid = grid_mut(d, rule)?;
    let columns = grid.width_to_columns(content.width()).max(1);
    let rows = grid.height_to_rows(content.height()).max(1);
    let (column, row) = if column.is_some() || row.is_some() {
        let (cursor_column, cursor_row) = grid.cursor(&area)?;
        (
            column.unwrap_or(i64::from(cursor_column)),
            row.unwrap_or(i64::from(cursor_row)),
        )
    } else {
        flow_position(d, rule, ctx, &area, columns, rows)?
    };

    let grid = grid_mut(d, rule)?;
    let (px, py) = (grid.pos_x(column, &area)?, grid.pos_y(row, &area)?);
    if allocate {
        grid.allocate_block(column, row, columns, rows, &area)?;
    }
    debug!(
        "Placed {}x{} cells at {},{} in area '{}' ({:.2}pt, {:.2}pt)",
        columns, rows, column, row, area, px, py
    );
    d.document.place(px, py, content);
    Ok(Vec::new())
}

/// `NewPage`: finishes the current page. Ignored inside a group.
pub(crate) fn handle_new_page<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    if d.document.in_group() {
        warn!("<{}> inside a group is ignored (line {})", rule.name, rule.line);
        return Ok(Vec::new());
    }
    if d.document.page().is_none() {
        d.ensure_target(ctx)?;
    }
    d.document.finish_page()?;
    Ok(Vec::new())
}

/// `NextRow area? rows?`: moves the flow of an area to a fresh row.
pub(crate) fn handle_next_row<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let area = d.attribute_or(rule, "area", ctx, PAGE_AREA)?;
    let rows = d.cells_attribute(rule, "rows", ctx)?.unwrap_or(1);
    d.ensure_target(ctx)?;
    let grid = grid_mut(d, rule)?;
    if grid.next_row(&area, rows)? || grid.advance_frame(&area)? {
        return Ok(Vec::new());
    }
    if !d.document.in_group() {
        debug!("No row left in area '{}', finishing the page", area);
        d.document.finish_page()?;
    }
    Ok(Vec::new())
}

/// `SetGrid width? height? nx? ny? dx? dy?`: grid of pages created from now on.
pub(crate) fn handle_set_grid<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let mut settings = d.document.grid_settings().clone();
    if let Some(width) = d.length_attribute(rule, "width", ctx)? {
        settings.cell_width = width;
        settings.columns = None;
    }
    if let Some(height) = d.length_attribute(rule, "height", ctx)? {
        settings.cell_height = height;
        settings.rows = None;
    }
    if let Some(nx) = d.cells_attribute(rule, "nx", ctx)? {
        settings.columns = Some(nx);
    }
    if let Some(ny) = d.cells_attribute(rule, "ny", ctx)? {
        settings.rows = Some(ny);
    }
    if let Some(dx) = d.length_attribute(rule, "dx", ctx)? {
        settings.gap_x = dx;
    }
    if let Some(dy) = d.length_attribute(rule, "dy", ctx)? {
        settings.gap_y = dy;
    }
    if settings.cell_width <= 0.0 || settings.cell_height <= 0.0 {
        return Err(rule_error(rule, "cell sizes must be positive"));
    }
    debug!("Grid settings now {:?}", settings);
    d.document.set_grid_settings(settings);
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{Content, Item};
    use gridpress_types::{BoxContent, Size};

    #[test]
    fn test_single_box_requires_exactly_one() {
        let rule = RuleElement {
            name: "PlaceObject".into(),
            namespace: None,
            attributes: Vec::new(),
            children: Vec::new(),
            line: 3,
        };
        let filled = ContentBox::new(Size::new(1.0, 1.0), BoxContent::Filled { color: None });
        let one: Sequence = vec![Item::String("x".into()), Item::Content(Content::Box(filled.clone()))];
        assert_eq!(single_box(&rule, one).unwrap(), filled);

        let none: Sequence = vec![Item::String("x".into())];
        assert!(single_box(&rule, none).is_err());

        let two: Sequence = vec![
            Item::Content(Content::Box(filled.clone())),
            Item::Content(Content::Box(filled)),
        ];
        assert!(single_box(&rule, two).is_err());
    }
}
