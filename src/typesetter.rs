//! Turns paragraphs into sized text boxes.
use crate::sequence::Paragraph;
use gridpress_types::{BoxContent, ContentBox, Size, TextLine};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypesetError {
    #[error("Cannot set text into a width of {0:.2}pt")]
    InvalidWidth(f64),

    #[error("Invalid text format: font size {font_size}pt, leading {leading}pt")]
    InvalidFormat { font_size: f64, leading: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFormat {
    pub font_size: f64,
    pub leading: f64,
}

pub trait Typesetter {
    /// Sets `paragraphs` into lines of at most `width` points.
    fn to_box(
        &self,
        paragraphs: &[Paragraph],
        width: f64,
        format: &TextFormat,
    ) -> Result<ContentBox, TypesetError>;
}

/// Greedy word wrap where every glyph advances by the same fraction of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPitchTypesetter {
    advance: f64,
}

impl Default for FixedPitchTypesetter {
    fn default() -> Self {
        Self { advance: 0.5 }
    }
}

impl FixedPitchTypesetter {
    pub fn new(advance: f64) -> Self {
        Self { advance }
    }

    fn wrap(text: &str, max_chars: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut line_len = 0;
        for word in text.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            // words wider than the line are cut
            for piece in chars.chunks(max_chars) {
                let extra = if line_len == 0 { piece.len() } else { piece.len() + 1 };
                if line_len + extra > max_chars && line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.extend(piece);
                line_len += piece.len();
            }
        }
        if line_len > 0 {
            lines.push(line);
        }
        lines
    }
}

impl Typesetter for FixedPitchTypesetter {
    fn to_box(
        &self,
        paragraphs: &[Paragraph],
        width: f64,
        format: &TextFormat,
    ) -> Result<ContentBox, TypesetError> {
        if format.font_size <= 0.0 || format.leading <= 0.0 {
            return Err(TypesetError::InvalidFormat {
                font_size: format.font_size,
                leading: format.leading,
            });
        }
        let glyph = format.font_size * self.advance;
        let max_chars = (width / glyph + 1e-9).floor();
        if !width.is_finite() || max_chars < 1.0 {
            return Err(TypesetError::InvalidWidth(width));
        }
        let max_chars = max_chars as usize;

        let lines: Vec<TextLine> = paragraphs
            .iter()
            .flat_map(|p| Self::wrap(&p.text, max_chars))
            .enumerate()
            .map(|(i, text)| TextLine {
                width: text.chars().count() as f64 * glyph,
                baseline: i as f64 * format.leading + format.font_size,
                text,
            })
            .collect();
        let height = lines.len() as f64 * format.leading;
        Ok(ContentBox::new(
            Size::new(width, height),
            BoxContent::Text {
                lines,
                font_size: format.font_size,
                leading: format.leading,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: TextFormat = TextFormat {
        font_size: 10.0,
        leading: 12.0,
    };

    fn lines_of(b: &ContentBox) -> Vec<String> {
        match &b.content {
            BoxContent::Text { lines, .. } => lines.iter().map(|l| l.text.clone()).collect(),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_greedy_wrap() {
        // 50pt / 5pt per glyph = 10 characters per line
        let b = FixedPitchTypesetter::default()
            .to_box(&[Paragraph::new("the quick brown fox jumps")], 50.0, &FORMAT)
            .unwrap();
        assert_eq!(lines_of(&b), vec!["the quick", "brown fox", "jumps"]);
        assert_eq!(b.size, Size::new(50.0, 36.0));
    }

    #[test]
    fn test_long_words_are_cut() {
        let b = FixedPitchTypesetter::default()
            .to_box(&[Paragraph::new("abcdefghijkl xy")], 25.0, &FORMAT)
            .unwrap();
        assert_eq!(lines_of(&b), vec!["abcde", "fghij", "kl xy"]);
    }

    #[test]
    fn test_paragraphs_start_new_lines() {
        let b = FixedPitchTypesetter::default()
            .to_box(&[Paragraph::new("one"), Paragraph::new(""), Paragraph::new("two")], 100.0, &FORMAT)
            .unwrap();
        assert_eq!(lines_of(&b), vec!["one", "two"]);
        let BoxContent::Text { lines, .. } = &b.content else { unreachable!() };
        assert_eq!(lines[1].baseline, 22.0);
        assert_eq!(lines[1].width, 15.0);
    }

    #[test]
    fn test_too_narrow() {
        let err = FixedPitchTypesetter::default()
            .to_box(&[Paragraph::new("x")], 4.0, &FORMAT)
            .unwrap_err();
        assert_eq!(err, TypesetError::InvalidWidth(4.0));
    }
}
