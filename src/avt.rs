//! Attribute value templates: literal text with embedded `{expression}` spans.
use gridpress_xpath::{Expression, XPathError, parse_expression};

#[derive(Debug, Clone, PartialEq)]
pub enum AvtPart {
    Static(String),
    Dynamic(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValueTemplate {
    Static(String),
    Dynamic(Vec<AvtPart>),
}

/// Splits an attribute value into literal and expression parts. `{{` and `}}`
/// stand for literal braces.
pub fn parse_avt(s: &str) -> Result<AttributeValueTemplate, XPathError> {
    if !s.contains('{') && !s.contains("}}") {
        return Ok(AttributeValueTemplate::Static(s.to_string()));
    }

    let mut parts = Vec::new();
    let mut current_static = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                current_static.push('{');
            }
            '{' => {
                if !current_static.is_empty() {
                    parts.push(AvtPart::Static(std::mem::take(&mut current_static)));
                }
                let mut expr_str = String::new();
                let mut depth = 1;
                for ec in chars.by_ref() {
                    match ec {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    expr_str.push(ec);
                }
                if depth != 0 {
                    return Err(XPathError::XPathParse(
                        s.to_string(),
                        "unterminated '{' in attribute value".to_string(),
                    ));
                }
                parts.push(AvtPart::Dynamic(parse_expression(&expr_str)?));
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                }
                current_static.push('}');
            }
            _ => current_static.push(c),
        }
    }

    if !current_static.is_empty() {
        parts.push(AvtPart::Static(current_static));
    }

    match parts.as_slice() {
        [] => Ok(AttributeValueTemplate::Static(String::new())),
        [AvtPart::Static(s)] => Ok(AttributeValueTemplate::Static(s.clone())),
        _ => Ok(AttributeValueTemplate::Dynamic(parts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_values() {
        assert_eq!(
            parse_avt("12pt").unwrap(),
            AttributeValueTemplate::Static("12pt".into())
        );
        assert_eq!(
            parse_avt("{{literal}}").unwrap(),
            AttributeValueTemplate::Static("{literal}".into())
        );
    }

    #[test]
    fn test_mixed_parts() {
        let AttributeValueTemplate::Dynamic(parts) = parse_avt("fig-{@id}.png").unwrap() else {
            panic!("expected a dynamic template");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], AvtPart::Static("fig-".into()));
        assert!(matches!(parts[1], AvtPart::Dynamic(_)));
        assert_eq!(parts[2], AvtPart::Static(".png".into()));
    }

    #[test]
    fn test_unterminated_expression() {
        assert!(parse_avt("{@id").is_err());
    }
}
