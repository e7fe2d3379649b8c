//! Navigable view of a `roxmltree` document that also exposes attributes as nodes.
use roxmltree::Node;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A data-tree node. `roxmltree` keeps attributes as data on elements, so they are
/// represented by their parent element and attribute index.
#[derive(Debug, Clone, Copy)]
pub enum DataNode<'a, 'input> {
    Node(Node<'a, 'input>),
    Attribute {
        parent: Node<'a, 'input>,
        index: usize,
    },
}

impl<'a, 'input> DataNode<'a, 'input> {
    pub fn new(node: Node<'a, 'input>) -> Self {
        DataNode::Node(node)
    }

    /// The underlying tree node, `None` for attributes.
    pub fn inner(&self) -> Option<Node<'a, 'input>> {
        match self {
            DataNode::Node(node) => Some(*node),
            DataNode::Attribute { .. } => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, DataNode::Node(n) if n.is_element())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DataNode::Node(n) if n.is_text())
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, DataNode::Attribute { .. })
    }

    pub fn is_root(&self) -> bool {
        matches!(self, DataNode::Node(n) if n.is_root())
    }

    /// Local name of an element or attribute.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            DataNode::Node(node) if node.is_element() => Some(node.tag_name().name()),
            DataNode::Node(_) => None,
            DataNode::Attribute { parent, index } => {
                parent.attributes().nth(*index).map(|a| a.name())
            }
        }
    }

    /// The string value as defined by `string()`: text content for text nodes and
    /// elements (concatenated descendants), the value for attributes.
    pub fn string_value(&self) -> String {
        match self {
            DataNode::Node(node) if node.is_text() => node.text().unwrap_or_default().to_string(),
            DataNode::Node(node) => node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect(),
            DataNode::Attribute { parent, index } => parent
                .attributes()
                .nth(*index)
                .map(|a| a.value().to_string())
                .unwrap_or_default(),
        }
    }

    /// Value of the named attribute on an element.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.inner().and_then(|n| n.attribute(name))
    }

    pub fn children(&self) -> impl Iterator<Item = DataNode<'a, 'input>> + use<'a, 'input> {
        self.inner()
            .into_iter()
            .flat_map(|n| n.children())
            .filter(|c| c.is_element() || c.is_text())
            .map(DataNode::Node)
    }

    pub fn attributes(&self) -> impl Iterator<Item = DataNode<'a, 'input>> + use<'a, 'input> {
        let parent = self.inner().filter(|n| n.is_element());
        let count = parent.map(|p| p.attributes().count()).unwrap_or(0);
        parent
            .into_iter()
            .flat_map(move |p| (0..count).map(move |index| DataNode::Attribute { parent: p, index }))
    }

    pub fn parent(&self) -> Option<DataNode<'a, 'input>> {
        match self {
            DataNode::Node(node) => node.parent().map(DataNode::Node),
            DataNode::Attribute { parent, .. } => Some(DataNode::Node(*parent)),
        }
    }

    /// The document root of the tree this node belongs to.
    pub fn root(&self) -> DataNode<'a, 'input> {
        let node = match self {
            DataNode::Node(node) => *node,
            DataNode::Attribute { parent, .. } => *parent,
        };
        DataNode::Node(node.document().root())
    }

    /// The node itself plus all descendant elements and text nodes, in document order.
    pub fn descendants_or_self(&self) -> Vec<DataNode<'a, 'input>> {
        match self {
            DataNode::Node(node) => node
                .descendants()
                .filter(|n| n.is_root() || n.is_element() || n.is_text())
                .map(DataNode::Node)
                .collect(),
            DataNode::Attribute { .. } => vec![*self],
        }
    }

    fn order_key(&self) -> (u32, usize) {
        match self {
            DataNode::Node(node) => (node.id().get(), 0),
            DataNode::Attribute { parent, index } => (parent.id().get(), index + 1),
        }
    }
}

impl PartialEq for DataNode<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for DataNode<'_, '_> {}

impl PartialOrd for DataNode<'_, '_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Document order; an element sorts before its own attributes.
impl Ord for DataNode<'_, '_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl Hash for DataNode<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_key().hash(state);
    }
}
