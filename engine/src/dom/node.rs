use std::collections::HashMap;

/// Index of a node in its [`Dom`] arena.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lowercased tag name.
    pub tag_name: String,
    /// Lowercased attribute names mapped to unquoted values.
    pub attributes: HashMap<String, String>,
}

impl ElementData {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|v| v.as_str())
    }
}

/// A node owns its children by id; `parent` is a back-reference only.
#[derive(Debug, Clone)]
pub struct Node {
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub node_type: NodeType,
}

impl Node {
    pub fn tag_name(&self) -> Option<&str> {
        match &self.node_type {
            NodeType::Element(el) => Some(el.tag_name.as_str()),
            NodeType::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.node_type, NodeType::Text(_))
    }
}

/// Arena holding every node created while parsing a document.
///
/// Nodes are allocated detached. The tree builder links a node into its
/// parent's child list with [`Dom::append_child`] once the node is
/// finished, and fixes the root with [`Dom::set_root`]. After parsing the
/// arena is never mutated.
#[derive(Debug)]
pub struct Dom {
    pub nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), root: 0 }
    }

    pub fn create_element(
        &mut self,
        tag_name: &str,
        attributes: HashMap<String, String>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            children: vec![],
            parent,
            node_type: NodeType::Element(ElementData {
                tag_name: tag_name.to_string(),
                attributes,
            }),
        });
        id
    }

    pub fn create_text(&mut self, text: &str, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            children: vec![],
            parent,
            node_type: NodeType::Text(text.to_string()),
        });
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.nodes[id].parent = None;
        self.root = id;
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Number of nodes reachable from the root. Nodes left detached by
    /// [`Dom::set_root`] are not counted.
    pub fn len(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        self.descendants(self.root).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pre-order iterator over `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants { dom: self, stack: vec![(id, 0)] }
    }

    /// Text of the first `<title>` element, if any.
    pub fn title(&self) -> Option<String> {
        let title = self.find_element(self.root, "title")?;
        self.children(title).iter().find_map(|&child| match &self.nodes[child].node_type {
            NodeType::Text(text) => Some(text.trim().to_string()),
            NodeType::Element(_) => None,
        })
    }

    fn find_element(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.nodes.get(id)?;
        self.descendants(id)
            .map(|(node, _)| node)
            .find(|&node| self.nodes[node].tag_name() == Some(tag))
    }

    /// Render the subtree rooted at `id` as an indented outline.
    pub fn outline(&self, id: NodeId) -> String {
        let mut out = String::new();
        for (node, depth) in self.descendants(id) {
            out.push_str(&"  ".repeat(depth));
            match &self.nodes[node].node_type {
                NodeType::Element(el) => {
                    out.push('<');
                    out.push_str(&el.tag_name);
                    out.push('>');
                }
                NodeType::Text(text) => out.push_str(&format!("{:?}", text)),
            }
            out.push('\n');
        }
        out
    }
}

/// Iterator returned by [`Dom::descendants`]. Yields each node with its
/// depth below the starting node.
pub struct Descendants<'a> {
    dom: &'a Dom,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for Descendants<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let children = self.dom.children(id);
        self.stack.extend(children.iter().rev().map(|&child| (child, depth + 1)));
        Some((id, depth))
    }
}
