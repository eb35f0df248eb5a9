//! Pretty printer for the XML element tree

use quick_xml::escape::{escape, partial_escape};

use crate::xml::model::{Content, Document, Element};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Configuration options for printing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    /// Character repeated for each indentation step
    pub indent: char,
    /// Number of `indent` characters per nesting level
    pub indent_width: usize,
    /// Whether to emit the XML declaration
    pub declaration: bool,
}

/// One tab per level, declaration on
impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent: '\t',
            indent_width: 1,
            declaration: true,
        }
    }
}

/// Serializes a [`Document`] with canonical indentation
///
/// Layout rules:
/// - an element without children prints as `<name/>`
/// - an element without child elements prints on one line, its text,
///   CDATA and comments kept verbatim
/// - otherwise every child goes on its own line one level deeper; text in
///   such mixed content is trimmed and whitespace-only text is dropped
#[derive(Debug, Clone, Default)]
pub struct Printer {
    config: FormatConfig,
}

impl Printer {
    pub fn new(config: FormatConfig) -> Self {
        Self { config }
    }

    /// Print the whole document, declaration included
    pub fn print(&self, doc: &Document) -> String {
        let mut out = String::new();
        if self.config.declaration {
            out.push_str(DECLARATION);
            out.push('\n');
        }
        self.write_element(&doc.root, 0, &mut out);
        out.push('\n');
        out
    }

    fn write_element(&self, element: &Element, depth: usize, out: &mut String) {
        self.write_indent(depth, out);
        out.push('<');
        out.push_str(&element.name);
        for (key, value) in &element.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        if element.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        if !element.has_child_elements() {
            for child in &element.children {
                match child {
                    Content::Text(text) => out.push_str(&partial_escape(text.as_str())),
                    Content::CData(text) => push_cdata(text, out),
                    Content::Comment(text) => push_comment(text, out),
                    Content::Element(_) => {}
                }
            }
        } else {
            for child in &element.children {
                match child {
                    Content::Element(child) => {
                        out.push('\n');
                        self.write_element(child, depth + 1, out);
                    }
                    Content::Text(text) => {
                        let text = text.trim();
                        if text.is_empty() {
                            continue;
                        }
                        out.push('\n');
                        self.write_indent(depth + 1, out);
                        out.push_str(&partial_escape(text));
                    }
                    Content::CData(text) => {
                        out.push('\n');
                        self.write_indent(depth + 1, out);
                        push_cdata(text, out);
                    }
                    Content::Comment(text) => {
                        out.push('\n');
                        self.write_indent(depth + 1, out);
                        push_comment(text, out);
                    }
                }
            }
            out.push('\n');
            self.write_indent(depth, out);
        }

        out.push_str("</");
        out.push_str(&element.name);
        out.push('>');
    }

    fn write_indent(&self, depth: usize, out: &mut String) {
        let count = depth.saturating_mul(self.config.indent_width);
        out.extend(std::iter::repeat(self.config.indent).take(count));
    }
}

fn push_comment(text: &str, out: &mut String) {
    out.push_str("<!--");
    out.push_str(text);
    out.push_str("-->");
}

/// Writes `text` as CDATA, splitting on `]]>` so the section never closes early
fn push_cdata(text: &str, out: &mut String) {
    let mut rest = text;
    while let Some(idx) = rest.find("]]>") {
        let (head, tail) = rest.split_at(idx + 2);
        out.push_str("<![CDATA[");
        out.push_str(head);
        out.push_str("]]>");
        rest = tail;
    }
    out.push_str("<![CDATA[");
    out.push_str(rest);
    out.push_str("]]>");
}
