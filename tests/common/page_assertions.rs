use gridpress::PageOutput;
use gridpress::types::BoxContent;

/// Top left corners of everything placed on a page, in placement order.
pub fn positions(page: &PageOutput) -> Vec<(f64, f64)> {
    page.items.iter().map(|item| (item.x, item.y)).collect()
}

/// Text of all text boxes on a page, one entry per line.
pub fn text_lines(page: &PageOutput) -> Vec<String> {
    page.items
        .iter()
        .filter_map(|item| match &item.content.content {
            BoxContent::Text { lines, .. } => Some(lines.iter().map(|l| l.text.clone())),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Assert the number of pages a run produced
#[macro_export]
macro_rules! assert_page_count {
    ($output:expr, $count:expr) => {
        assert_eq!(
            $output.pages.len(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $output.pages.len()
        );
    };
}

/// Assert that a page holds a text line equal to `text`
#[macro_export]
macro_rules! assert_page_has_text {
    ($page:expr, $text:expr) => {
        let lines = $crate::common::page_assertions::text_lines(&$page);
        assert!(
            lines.iter().any(|l| l == $text),
            "Page {} should contain the line '{}', but its lines were: {:?}",
            $page.number,
            $text,
            lines
        );
    };
}
