//! [`Node`] tree to XML text

use tracing::{instrument, warn};

use crate::tree::Node;
use crate::xml::model::{is_xml_name, Content, Document, Element};
use crate::xml::printer::Printer;

/// Name of the element wrapping every encoded tree
pub const DEFAULT_ROOT: &str = "xml";

/// Options for [`encode_with_options`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Write leaf text as CDATA instead of escaped text
    pub cdata: bool,
    /// Name of the synthetic root element
    pub root_name: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            cdata: false,
            root_name: DEFAULT_ROOT.to_string(),
        }
    }
}

impl EncodeOptions {
    pub fn cdata(cdata: bool) -> Self {
        Self {
            cdata,
            ..Self::default()
        }
    }

    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }
}

/// Encode a tree as a pretty-printed XML document wrapped in `<xml>`
///
/// The output is always what [`format`](crate::format) would produce for
/// it, so encoding cannot fail. Branch keys are written as element names
/// unchanged and must be XML names; trees read through serde are checked
/// on the way in, others can be checked with [`Node::check_names`].
pub fn encode(tree: &Node, use_cdata: bool) -> String {
    encode_with_options(tree, &EncodeOptions::cdata(use_cdata))
}

/// Encode with a custom root name
#[instrument(level = "debug", skip(tree))]
pub fn encode_with_options(tree: &Node, options: &EncodeOptions) -> String {
    let root = node_to_element(&options.root_name, tree, options.cdata);
    Printer::default().print(&Document { root })
}

pub(crate) fn node_to_element(name: &str, node: &Node, cdata: bool) -> Element {
    if !is_xml_name(name) {
        warn!(name, "encoding an invalid element name");
    }
    let mut element = Element::new(name);
    match node {
        Node::Leaf(text) => {
            if let Some(content) = leaf_content(text, cdata) {
                element.children.push(content);
            }
        }
        Node::Branch(children) => {
            element.children = children
                .iter()
                .map(|(name, child)| Content::Element(node_to_element(name, child, cdata)))
                .collect();
        }
    }
    element
}

// Whitespace-only text decodes to an empty leaf, so it is written as one.
pub(crate) fn leaf_content(text: &str, cdata: bool) -> Option<Content> {
    if text.is_empty() {
        None
    } else if cdata {
        Some(Content::CData(text.to_string()))
    } else if text.trim().is_empty() {
        None
    } else {
        Some(Content::Text(text.to_string()))
    }
}
