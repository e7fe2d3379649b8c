//! `sd:` functions that let expressions query the layout state.
use crate::document::Document;
use gridpress_layout::PAGE_AREA;
use gridpress_xpath::{EvaluationContext, ExtensionFunctions, Value, XPathError};
use log::warn;

pub const EXTENSION_PREFIX: &str = "sd:";

fn arity(name: &str, args: &[Value<'_, '_>], min: usize, max: usize) -> Result<(), XPathError> {
    if args.len() < min || args.len() > max {
        return Err(XPathError::function(
            name,
            format!("expected {}..={} arguments, got {}", min, max, args.len()),
        ));
    }
    Ok(())
}

fn parity(name: &str, args: &[Value<'_, '_>], remainder: i64) -> Result<bool, XPathError> {
    arity(name, args, 1, 1)?;
    let n = args[0].to_number();
    if !n.is_finite() {
        return Err(XPathError::function(name, format!("'{}' is not a number", args[0])));
    }
    Ok((n as i64).rem_euclid(2) == remainder)
}

impl Document<'_> {
    fn cursor_value(&self, name: &str, args: &[Value<'_, '_>], column: bool) -> Result<f64, XPathError> {
        arity(name, args, 0, 1)?;
        let area = args.first().map(|a| a.to_string());
        let area = area.as_deref().unwrap_or(PAGE_AREA);
        let Some(grid) = self.target_grid() else {
            return Ok(1.0);
        };
        let (c, r) = grid
            .cursor(area)
            .map_err(|e| XPathError::function(name, e.to_string()))?;
        Ok(f64::from(if column { c } else { r }))
    }

    fn group_cells(&self, name: &str, args: &[Value<'_, '_>], width: bool) -> Result<f64, XPathError> {
        arity(name, args, 1, 1)?;
        let group_name = args[0].to_string();
        let group = self
            .group(&group_name)
            .map_err(|e| XPathError::function(name, e.to_string()))?;
        let cells = if width {
            group.width_in_cells()
        } else {
            group.height_in_cells()
        };
        cells.map(f64::from).ok_or_else(|| {
            XPathError::function(name, format!("group '{}' has not been laid out", group_name))
        })
    }

    fn page_of_marker<'a, 'input>(
        &self,
        name: &str,
        args: &[Value<'a, 'input>],
    ) -> Result<Value<'a, 'input>, XPathError> {
        arity(name, args, 1, 1)?;
        let marker = args[0].to_string();
        match self.tracker.resolve(&marker) {
            Some(m) => Ok(Value::Number(f64::from(m.page))),
            None if self.strict_references() => Err(XPathError::function(
                name,
                format!("marker '{}' is not defined in this or the previous run", marker),
            )),
            None => {
                warn!("Marker '{}' is not defined, rerun to resolve it", marker);
                Ok(Value::String("??".to_string()))
            }
        }
    }
}

impl<'a, 'input> ExtensionFunctions<'a, 'input> for Document<'_> {
    fn call(
        &self,
        name: &str,
        args: &[Value<'a, 'input>],
        _ctx: &EvaluationContext<'a, 'input, '_>,
    ) -> Option<Result<Value<'a, 'input>, XPathError>> {
        let local = name.strip_prefix(EXTENSION_PREFIX)?;
        let result = match local {
            "current-page" => arity(name, args, 0, 0)
                .map(|_| Value::Number(f64::from(self.current_page_number()))),
            "current-row" => self.cursor_value(name, args, false).map(Value::Number),
            "current-column" => self.cursor_value(name, args, true).map(Value::Number),
            "pagenumber" => self.page_of_marker(name, args),
            "number-of-pages" => arity(name, args, 0, 0).map(|_| {
                let pages = self
                    .tracker
                    .previous_last_page()
                    .unwrap_or_else(|| self.page_count());
                Value::Number(f64::from(pages))
            }),
            "group-width" => self.group_cells(name, args, true).map(Value::Number),
            "group-height" => self.group_cells(name, args, false).map(Value::Number),
            "even" => parity(name, args, 0).map(Value::Boolean),
            "odd" => parity(name, args, 1).map(Value::Boolean),
            _ => return None,
        };
        Some(result)
    }
}
