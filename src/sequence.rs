//! Results of dispatching a rule subtree.
use gridpress_types::ContentBox;
use gridpress_xpath::engine::format_number;
use gridpress_xpath::{DataNode, Value};
use itertools::Itertools;

/// Text collected for typesetting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub text: String,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Something that ends up on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Paragraph(Paragraph),
    Box(ContentBox),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item<'a, 'input> {
    Number(f64),
    String(String),
    Boolean(bool),
    Node(DataNode<'a, 'input>),
    Content(Content),
}

pub type Sequence<'a, 'input> = Vec<Item<'a, 'input>>;

impl Item<'_, '_> {
    /// String form; boxes have none.
    pub fn to_text(&self) -> String {
        match self {
            Item::Number(n) => format_number(*n),
            Item::String(s) => s.clone(),
            Item::Boolean(b) => b.to_string(),
            Item::Node(node) => node.string_value(),
            Item::Content(Content::Paragraph(p)) => p.text.clone(),
            Item::Content(Content::Box(_)) => String::new(),
        }
    }
}

/// Expands an expression result into sequence items.
pub fn from_value<'a, 'input>(value: Value<'a, 'input>) -> Sequence<'a, 'input> {
    match value {
        Value::NodeSet(nodes) => nodes.into_iter().map(Item::Node).collect(),
        Value::String(s) => vec![Item::String(s)],
        Value::Number(n) => vec![Item::Number(n)],
        Value::Boolean(b) => vec![Item::Boolean(b)],
    }
}

/// Collapses a sequence into a single expression value, e.g. for a variable binding.
/// Node-only sequences stay node sets; a single primitive keeps its type; anything
/// else becomes its concatenated text.
pub fn to_value<'a, 'input>(items: &[Item<'a, 'input>]) -> Value<'a, 'input> {
    if items.iter().all(|i| matches!(i, Item::Node(_))) {
        let nodes = items
            .iter()
            .filter_map(|i| match i {
                Item::Node(n) => Some(*n),
                _ => None,
            })
            .collect();
        return Value::NodeSet(nodes);
    }
    match items {
        [Item::Number(n)] => Value::Number(*n),
        [Item::Boolean(b)] => Value::Boolean(*b),
        _ => Value::String(sequence_text(items)),
    }
}

pub fn sequence_text(items: &[Item<'_, '_>]) -> String {
    items.iter().map(Item::to_text).join("")
}

/// Boxes of the sequence in order.
pub fn boxes(items: Sequence<'_, '_>) -> Vec<ContentBox> {
    items
        .into_iter()
        .filter_map(|i| match i {
            Item::Content(Content::Box(b)) => Some(b),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpress_types::{BoxContent, Size};

    #[test]
    fn test_value_conversions() {
        let doc = roxmltree::Document::parse("<a><b>1</b><b>2</b></a>").unwrap();
        let nodes: Vec<_> = doc
            .root_element()
            .children()
            .map(DataNode::new)
            .collect();

        let seq = from_value(Value::NodeSet(nodes.clone()));
        assert_eq!(seq.len(), 2);
        assert_eq!(sequence_text(&seq), "12");
        assert_eq!(to_value(&seq), Value::NodeSet(nodes));

        assert_eq!(to_value(&[Item::Number(3.0)]), Value::Number(3.0));
        assert_eq!(to_value(&[Item::Boolean(false)]), Value::Boolean(false));
        assert_eq!(
            to_value(&[Item::String("x".into()), Item::Number(2.0)]),
            Value::String("x2".into())
        );
        assert_eq!(to_value(&[]), Value::NodeSet(vec![]));
    }

    #[test]
    fn test_boxes_keep_order() {
        let b = |w| ContentBox::new(Size::new(w, 1.0), BoxContent::Filled { color: None });
        let seq = vec![
            Item::Content(Content::Box(b(1.0))),
            Item::String("skip".into()),
            Item::Content(Content::Paragraph(Paragraph::new("p"))),
            Item::Content(Content::Box(b(2.0))),
        ];
        assert_eq!(sequence_text(&seq), "skipp");
        let widths: Vec<f64> = boxes(seq).iter().map(|b| b.width()).collect();
        assert_eq!(widths, vec![1.0, 2.0]);
    }
}
