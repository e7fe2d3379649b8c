//! Low-level nom parser functions for lengths and margins.

use crate::dimension::{Extent, Margins};
use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_while1};
use nom::character::complete::{char, space1};
use nom::combinator::{map, map_res, opt, recognize};
use nom::multi::separated_list1;
use nom::{IResult, Parser};
use thiserror::Error;

/// Errors that can occur during style parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleParseError {
    #[error("Parse error: {0}")]
    Parse(String),
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn parse_f64(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize((
            opt(alt((char('+'), char('-')))),
            alt((
                recognize((take_while1(is_digit), opt((char('.'), take_while1(is_digit))))),
                recognize((char('.'), take_while1(is_digit))),
            )),
        )),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

fn parse_unit(input: &str) -> IResult<&str, f64> {
    alt((
        map(tag_no_case("pt"), |_| 1.0),
        map(tag_no_case("px"), |_| 1.0),
        map(tag_no_case("in"), |_| 72.0),
        map(tag_no_case("cm"), |_| 72.0 / 2.54),
        map(tag_no_case("mm"), |_| 72.0 / 25.4),
        map(tag_no_case("pc"), |_| 12.0),
    ))
    .parse(input)
}

/// Parses a length value with optional unit (e.g., "12pt", "1in", "10mm"). No unit means points.
pub fn parse_length(input: &str) -> IResult<&str, f64> {
    let (input, value) = parse_f64(input)?;
    let (input, unit_multiplier) = opt(parse_unit).parse(input)?;
    Ok((input, value * unit_multiplier.unwrap_or(1.0)))
}

/// Parses a grid extent: a bare number counts grid cells, a number with unit is a length.
pub fn parse_extent(input: &str) -> IResult<&str, Extent> {
    let (input, value) = parse_f64(input)?;
    let (input, unit_multiplier) = opt(parse_unit).parse(input)?;
    let extent = match unit_multiplier {
        Some(m) => Extent::Length(value * m),
        None => Extent::Cells(value),
    };
    Ok((input, extent))
}

/// Parses CSS shorthand margins (1, 2, or 4 values).
pub fn parse_shorthand_margins(input: &str) -> Result<Margins, StyleParseError> {
    let parts_res = separated_list1(space1, parse_length).parse(input.trim());

    match parts_res {
        Ok(("", parts)) => match parts.len() {
            1 => Ok(Margins::all(parts[0])),
            2 => Ok(Margins {
                top: parts[0],
                right: parts[1],
                bottom: parts[0],
                left: parts[1],
            }),
            4 => Ok(Margins {
                top: parts[0],
                right: parts[1],
                bottom: parts[2],
                left: parts[3],
            }),
            n => Err(StyleParseError::Parse(format!(
                "Invalid number of values for margin shorthand: got {}, expected 1, 2, or 4.",
                n
            ))),
        },
        _ => Err(StyleParseError::Parse(format!(
            "Failed to parse margins value: '{}'",
            input
        ))),
    }
}

/// Helper to run a nom parser and convert its result to a `Result<T, StyleParseError>`.
pub fn run_parser<'a, T, F>(parser: F, input: &'a str) -> Result<T, StyleParseError>
where
    F: Fn(&'a str) -> IResult<&'a str, T>,
{
    match parser(input.trim()) {
        Ok(("", result)) => Ok(result),
        Ok((rem, _)) => Err(StyleParseError::Parse(format!(
            "Parser did not consume all input. Remainder: '{}'",
            rem
        ))),
        Err(e) => Err(StyleParseError::Parse(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_length_units() {
        assert!(close(run_parser(parse_length, "12pt").unwrap(), 12.0));
        assert!(close(run_parser(parse_length, "1in").unwrap(), 72.0));
        assert!(close(run_parser(parse_length, "2.54cm").unwrap(), 72.0));
        assert!(close(run_parser(parse_length, "25.4mm").unwrap(), 72.0));
        assert!(close(run_parser(parse_length, "7").unwrap(), 7.0));
        assert!(close(run_parser(parse_length, "-.5pt").unwrap(), -0.5));
        assert!(run_parser(parse_length, "12 apples").is_err());
    }

    #[test]
    fn test_extent_distinguishes_cells_and_lengths() {
        assert_eq!(run_parser(parse_extent, "3").unwrap(), Extent::Cells(3.0));
        assert_eq!(run_parser(parse_extent, "10pt").unwrap(), Extent::Length(10.0));
    }

    #[test]
    fn test_shorthand_margins() {
        let m = parse_shorthand_margins("10pt 20pt").unwrap();
        assert_eq!(m, Margins { top: 10.0, right: 20.0, bottom: 10.0, left: 20.0 });
        let m = parse_shorthand_margins("1cm").unwrap();
        assert!(close(m.left, 72.0 / 2.54) && m.left == m.bottom);
        assert!(parse_shorthand_margins("1 2 3").is_err());
        assert!(parse_shorthand_margins("10pt wide").is_err());
    }
}
