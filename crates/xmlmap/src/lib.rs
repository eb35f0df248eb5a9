//! xmlmap - bidirectional codec between XML and ordered nested maps
//!
//! An XML document decodes into a [`Node`] tree: elements without child
//! elements become text leaves, all others become branches keyed by child
//! tag name in document order. Encoding walks the tree back into a
//! tab-indented document wrapped in a synthetic `<xml>` root.
//!
//! # Quick Start
//!
//! ```
//! use xmlmap::{decode, encode, Node};
//! # fn main() -> Result<(), xmlmap::Error> {
//! let tree = decode("<root><a>1</a><b><c>2</c></b></root>")?;
//! assert_eq!(tree.pointer("/b/c"), Some(&Node::from("2")));
//!
//! let xml = encode(&tree, false);
//! assert_eq!(decode(&xml)?, tree);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, ParseError, Pos, Result, Span};

pub mod tree;
pub use tree::{Branch, Node};

pub mod xml;
pub use xml::{
    is_xml_name, Content as XmlContent, DecodeConfig, Document as XmlDocument,
    Element as XmlElement, FormatConfig, Parser as XmlParser, Printer as XmlPrinter,
};

pub mod decode;
pub use decode::{decode, decode_bytes, decode_document, decode_with_config};

pub mod encode;
pub use encode::{encode, encode_with_options, EncodeOptions, DEFAULT_ROOT};

pub mod format;
pub use format::{format, format_with_config};

pub mod flat;
pub use flat::{decode_flat, encode_flat, FlatMap};

/// Parse XML from string into the element tree
pub fn from_xml_str(s: &str) -> Result<XmlDocument> {
    let mut parser = XmlParser::new(s.as_bytes());
    parser.parse()
}

/// Parse XML from bytes into the element tree
pub fn from_xml_bytes(bytes: &[u8]) -> Result<XmlDocument> {
    let mut parser = XmlParser::new(bytes);
    parser.parse()
}
