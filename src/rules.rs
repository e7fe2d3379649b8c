//! Compiles a layout-rule document into an owned element tree.
use crate::error::{ErrorKind, PublishError};
use std::rc::Rc;

pub const LAYOUT_NAMESPACE: &str = "urn:gridpress:layout";

#[derive(Debug, Clone, PartialEq)]
pub enum RuleNode {
    Element(Rc<RuleElement>),
    Text(String),
}

/// One element of the layout rules. Subtrees are shared between the rule tree and
/// the data-pattern registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleElement {
    pub name: String,
    /// `None` for elements outside any namespace.
    pub namespace: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<RuleNode>,
    pub line: u32,
}

impl RuleElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_layout_element(&self) -> bool {
        self.namespace.as_deref() == Some(LAYOUT_NAMESPACE)
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Rc<RuleElement>> {
        self.children.iter().filter_map(|c| match c {
            RuleNode::Element(e) => Some(e),
            RuleNode::Text(_) => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, name: &str) -> Option<&Rc<RuleElement>> {
        self.elements().find(|e| e.name == name)
    }

    /// Concatenated direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                RuleNode::Text(t) => Some(t.as_str()),
                RuleNode::Element(_) => None,
            })
            .collect()
    }
}

fn convert(doc: &roxmltree::Document, node: roxmltree::Node) -> RuleElement {
    let children = node
        .children()
        .filter_map(|child| {
            if child.is_element() {
                Some(RuleNode::Element(Rc::new(convert(doc, child))))
            } else if child.is_text() {
                child.text().map(|t| RuleNode::Text(t.to_string()))
            } else {
                None
            }
        })
        .collect();
    RuleElement {
        name: node.tag_name().name().to_string(),
        namespace: node.tag_name().namespace().map(str::to_string),
        attributes: node
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect(),
        children,
        line: doc.text_pos_at(node.range().start).row,
    }
}

/// Parses layout rules. The root must be a `Layout` element in the layout namespace.
pub fn compile_rules(source: &str) -> Result<Rc<RuleElement>, PublishError> {
    let doc = roxmltree::Document::parse(source).map_err(ErrorKind::RuleSyntax)?;
    let root = doc.root_element();
    let found = root.tag_name().namespace().unwrap_or_default();
    if found != LAYOUT_NAMESPACE {
        return Err(ErrorKind::NamespaceMismatch {
            expected: LAYOUT_NAMESPACE.to_string(),
            found: found.to_string(),
        }
        .into());
    }
    if root.tag_name().name() != "Layout" {
        return Err(ErrorKind::Rule {
            element: root.tag_name().name().to_string(),
            line: 1,
            message: "the root element must be <Layout>".to_string(),
        }
        .into());
    }
    Ok(Rc::new(convert(&doc, root)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_tree() {
        let rules = compile_rules(
            r#"<Layout xmlns="urn:gridpress:layout" version="0.1">
  <Record element="catalog">
    <Value>Hello <b>x</b></Value>
  </Record>
</Layout>"#,
        )
        .unwrap();
        assert_eq!(rules.name, "Layout");
        assert_eq!(rules.attribute("version"), Some("0.1"));
        let record = rules.child("Record").unwrap();
        assert_eq!(record.line, 2);
        assert!(record.is_layout_element());
        let value = record.child("Value").unwrap();
        assert_eq!(value.text(), "Hello ");
        assert_eq!(value.elements().count(), 1);
    }

    #[test]
    fn test_namespace_is_checked() {
        let err = compile_rules("<Layout/>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NamespaceMismatch { found, .. } if found.is_empty()));
        let err = compile_rules(r#"<Layout xmlns="urn:other"/>"#).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NamespaceMismatch { found, .. } if found == "urn:other"));
    }

    #[test]
    fn test_syntax_error() {
        let err = compile_rules("<Layout xmlns='urn:gridpress:layout'>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::RuleSyntax(_)));
    }

    #[test]
    fn test_foreign_elements_keep_their_namespace() {
        let rules = compile_rules(
            r#"<Layout xmlns="urn:gridpress:layout" xmlns:x="urn:x"><x:Thing/></Layout>"#,
        )
        .unwrap();
        let thing = rules.elements().next().unwrap();
        assert_eq!(thing.namespace.as_deref(), Some("urn:x"));
        assert!(!thing.is_layout_element());
    }
}
