//! Generic element tree built from the registry XML.
//!
//! Nodes live in a flat arena and are addressed by `NodeId`, so entity records
//! can keep a handle to the element they came from.

use std::io::Read;
use xml::reader::XmlEvent;

use crate::types::FatalError;

type XmlEvents<R> = xml::reader::Events<R>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Element(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub content: Vec<Content>,
    parent: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn parse_file(path: &std::path::Path) -> Result<Document, FatalError> {
        let file = std::io::BufReader::new(std::fs::File::open(path)?);
        Document::parse_stream(file)
    }

    pub fn parse_stream<R: Read>(stream: R) -> Result<Document, FatalError> {
        let parser = xml::reader::ParserConfig::new().create_reader(stream);
        let document = build(parser.into_iter())?;
        if document.nodes.is_empty() || document.name(document.root()) != "registry" {
            return Err(FatalError::MissingRegistryElement);
        }
        Ok(document)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.node(id)
            .attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).content.iter().filter_map(|c| match c {
            Content::Element(child) => Some(*child),
            Content::Text(_) => None,
        })
    }

    pub fn children_named<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id).filter(move |c| self.name(*c) == name)
    }

    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children_named(id, name).next()
    }

    /// Text of the element and all its descendants, in document order.
    pub fn text(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.collect_text(id, &[], &mut result);
        result
    }

    /// Like `text`, but leaves out the content of descendant elements named in
    /// `skip` (typically `comment`).
    pub fn text_without(&self, id: NodeId, skip: &[&str]) -> String {
        let mut result = String::new();
        self.collect_text(id, skip, &mut result);
        result
    }

    fn collect_text(&self, id: NodeId, skip: &[&str], out: &mut String) {
        for c in &self.node(id).content {
            match c {
                Content::Text(text) => out.push_str(text),
                Content::Element(child) => {
                    if !skip.contains(&self.name(*child)) {
                        self.collect_text(*child, skip, out);
                    }
                }
            }
        }
    }

    /// Location of the node for diagnostics, e.g. `/registry/types/type[VkBool32]`.
    pub fn xpath(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            let segment = match self.attr(node_id, "name") {
                Some(name) => format!("{}[{}]", node.name, name),
                None => node.name.clone(),
            };
            segments.push(segment);
            current = node.parent;
        }

        let mut xpath = String::new();
        for segment in segments.iter().rev() {
            xpath.push('/');
            xpath.push_str(segment);
        }
        xpath
    }
}

//--------------------------------------------------------------------------------------------------
fn build<R: Read>(events: XmlEvents<R>) -> Result<Document, FatalError> {
    let mut document = Document::default();
    let mut stack: Vec<NodeId> = Vec::new();

    for e in events {
        match e? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                let id = NodeId(document.nodes.len() as u32);
                let parent = stack.last().cloned();
                document.nodes.push(Node {
                    name: name.local_name,
                    attributes: attributes
                        .into_iter()
                        .map(|a| (a.name.local_name, a.value))
                        .collect(),
                    content: Vec::new(),
                    parent,
                });
                if let Some(parent) = parent {
                    document.nodes[parent.index()]
                        .content
                        .push(Content::Element(id));
                } else if id.0 != 0 {
                    // a second root element; nothing after the registry matters
                    break;
                }
                stack.push(id);
            }
            XmlEvent::EndElement { .. } => {
                stack.pop();
            }
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) | XmlEvent::CData(text) => {
                if let Some(current) = stack.last() {
                    document.nodes[current.index()]
                        .content
                        .push(Content::Text(text));
                }
            }
            _ => {}
        }
    }

    Ok(document)
}
