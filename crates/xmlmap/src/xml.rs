//! XML element tree: parsing and pretty printing

pub mod model;
pub mod parser;
pub mod printer;

pub use model::{is_xml_name, Content, Document, Element};
pub use parser::{DecodeConfig, Parser};
pub use printer::{FormatConfig, Printer};
