//! The output sink the renderer writes into.
//!
//! `Dom` is the slice of the browser document API the renderer needs.
//! `Document` implements it as an arena of elements addressed by `NodeId`.
use crate::error::{DocumentErrorKind, Error};
use std::fmt;

pub trait Dom {
    type Node: Copy + Eq + fmt::Debug;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    fn set_id(&mut self, node: Self::Node, id: &str) -> Result<(), Error>;

    fn set_text_content(&mut self, node: Self::Node, text: &str) -> Result<(), Error>;

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), Error>;

    /// First element in tree order with the given id. Detached elements are
    /// never found.
    fn get_element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn contains(&self, node: Self::Node) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    id: Option<String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// In-memory document rooted at a `<body>` element.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
        }
    }

    /// A page with an empty `<main id="main">` region under the body.
    pub fn with_main() -> Self {
        let mut doc = Self::new();
        let main = doc.create_element("main");
        doc.nodes[main.0].id = Some(crate::renderer::MAIN_REGION_ID.to_string());
        doc.attach(doc.body(), main);
        doc
    }

    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|e| e.tag.as_str())
    }

    pub fn element_id(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).and_then(|e| e.id.as_deref())
    }

    pub fn text_content(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|e| e.text.as_str())
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|e| e.children.as_slice())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|e| e.parent)
    }

    /// Number of connected elements carrying `id`.
    pub fn count_by_id(&self, id: &str) -> usize {
        self.tree_order()
            .filter(|node| self.element_id(*node) == Some(id))
            .count()
    }

    /// Connected elements in tree order, starting with the body.
    fn tree_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.body()];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
            Some(node)
        })
    }

    fn check(&self, node: NodeId) -> Result<(), Error> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(Error::document(DocumentErrorKind::NodeNotFound))
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes[n.0].parent;
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn write_html(&self, f: &mut fmt::Formatter<'_>, node: NodeId) -> fmt::Result {
        let element = &self.nodes[node.0];
        write!(f, "<{}", element.tag)?;
        if let Some(id) = &element.id {
            write!(f, " id=\"{}\"", escape(id))?;
        }
        write!(f, ">{}", escape(&element.text))?;
        for child in &element.children {
            self.write_html(f, *child)?;
        }
        write!(f, "</{}>", element.tag)
    }
}

impl Dom for Document {
    type Node = NodeId;

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    fn set_id(&mut self, node: NodeId, id: &str) -> Result<(), Error> {
        self.check(node)?;
        self.nodes[node.0].id = Some(id.to_string());
        Ok(())
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), Error> {
        self.check(node)?;
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        self.nodes[node.0].text = text.to_string();
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        self.check(parent)?;
        self.check(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(Error::document(DocumentErrorKind::HierarchyRequest));
        }
        self.attach(parent, child);
        Ok(())
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree_order().find(|node| self.element_id(*node) == Some(id))
    }

    fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }
}

impl fmt::Display for Document {
    /// Serializes the connected tree as HTML.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_html(f, self.body())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
