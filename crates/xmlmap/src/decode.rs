//! XML text to [`Node`] tree

use tracing::{debug, instrument};

use crate::error::Result;
use crate::tree::{Branch, Node};
use crate::xml::model::Element;
use crate::xml::parser::{DecodeConfig, Parser};

/// Decode an XML document into a tree rooted at the root element's content
///
/// The root element's own name is discarded. Sibling elements sharing a
/// name collapse into one entry holding the last sibling's value. Nesting
/// is capped at 1024 levels; see [`decode_with_config`] to change that.
#[instrument(level = "debug", skip_all, fields(len = input.len()))]
pub fn decode(input: &str) -> Result<Node> {
    decode_with_config(input, DecodeConfig::default())
}

/// Decode from raw bytes, which must be UTF-8
#[instrument(level = "debug", skip_all, fields(len = bytes.len()))]
pub fn decode_bytes(bytes: &[u8]) -> Result<Node> {
    let doc = Parser::new(bytes).parse()?;
    Ok(element_to_node(&doc.root))
}

/// Decode with custom parser limits
pub fn decode_with_config(input: &str, config: DecodeConfig) -> Result<Node> {
    let doc = Parser::with_config(input.as_bytes(), config).parse()?;
    Ok(element_to_node(&doc.root))
}

/// Decode and also return the name of the root element
pub fn decode_document(input: &str) -> Result<(String, Node)> {
    let doc = Parser::new(input.as_bytes()).parse()?;
    let node = element_to_node(&doc.root);
    Ok((doc.root.name, node))
}

/// Convert one element: no child elements means a trimmed leaf
pub(crate) fn element_to_node(element: &Element) -> Node {
    if !element.has_child_elements() {
        return Node::Leaf(element.own_text().trim().to_string());
    }

    let mut branch = Branch::new();
    for child in element.child_elements() {
        let node = element_to_node(child);
        if branch.insert(child.name.as_str(), node).is_some() {
            debug!(name = %child.name, parent = %element.name, "duplicate sibling overwrites earlier value");
        }
    }
    Node::Branch(branch)
}
