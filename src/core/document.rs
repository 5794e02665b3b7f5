/// One node of the hierarchical pivot model.
///
/// A node carries a tag name, ordered attributes, ordered children and
/// optional leaf text. Siblings that share a tag name form a repeated
/// group (list semantics); a single child of a given tag is a singular
/// relationship. A node holds either text or children as primary content,
/// never both: mixed content is not modeled.
///
/// `raw` marks text that originated from a CDATA block. Raw content must
/// round-trip byte-for-byte: it is never entity-escaped, trimmed or
/// type-converted by any downstream stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    pub text: Option<String>,
    pub raw: bool,
}

impl Node {
    pub fn new<S: Into<String>>(tag: S) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn leaf<S: Into<String>, T: Into<String>>(tag: S, text: T) -> Self {
        Self {
            tag: tag.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Value of the attribute with the given name, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child with the given tag name.
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All children with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A hierarchical document: a single root node.
///
/// Built by the XML reader or the unflattener, read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Node,
}

impl Document {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// The record nodes of this document.
    ///
    /// When the root's children are homogeneous (one tag name repeated),
    /// each child is one record. A heterogeneous or childless root falls
    /// back to being the single record itself, yielding a "wide"
    /// single-row table downstream.
    ///
    /// # Examples
    ///
    /// ```
    /// use datamorph_rs::core::document::{Document, Node};
    ///
    /// let mut root = Node::new("people");
    /// root.children.push(Node::leaf("person", "a"));
    /// root.children.push(Node::leaf("person", "b"));
    /// assert_eq!(Document::new(root).records().len(), 2);
    ///
    /// let mut mixed = Node::new("report");
    /// mixed.children.push(Node::leaf("title", "t"));
    /// mixed.children.push(Node::leaf("author", "a"));
    /// assert_eq!(Document::new(mixed).records().len(), 1);
    /// ```
    pub fn records(&self) -> Vec<&Node> {
        let children = &self.root.children;
        match children.first() {
            Some(first) if children.iter().all(|c| c.tag == first.tag) => {
                children.iter().collect()
            }
            _ => vec![&self.root],
        }
    }
}
