//! XML data model

use indexmap::IndexMap;

/// XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Element,
}

/// XML element
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Content>,
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    /// Character data with entities already resolved
    Text(String),
    CData(String),
    Comment(String),
}

impl Element {
    /// Create an element with no attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Iterate over child elements, skipping text and comments
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            Content::Element(element) => Some(element),
            _ => None,
        })
    }

    /// True if at least one child is an element
    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// Concatenated text and CDATA of the direct children
    pub fn own_text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            if let Content::Text(value) | Content::CData(value) = child {
                text.push_str(value);
            }
        }
        text
    }

    /// Drop whitespace-only text that only lays out the markup
    ///
    /// Applies when the element has child elements, or when nothing but
    /// whitespace and comments sits inside it. Whitespace between CDATA
    /// sections or other text of a leaf stays.
    pub fn strip_layout_whitespace(&mut self) {
        let layout_only = self.has_child_elements()
            || self.children.iter().all(|child| match child {
                Content::Text(value) => value.trim().is_empty(),
                Content::Comment(_) => true,
                Content::Element(_) | Content::CData(_) => false,
            });
        if layout_only {
            self.children
                .retain(|child| !matches!(child, Content::Text(value) if value.trim().is_empty()));
        }
    }

    /// Concatenated text and CDATA of all descendants, in document order
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(self, &mut text);
        text
    }
}

/// True if `name` is a well-formed XML element or attribute name
///
/// Follows the `Name` production: a letter, `_` or `:` first, then letters,
/// digits, `-`, `.`, `_`, `:` or combining marks.
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start) && chars.all(is_name_char)
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | ':')
}

fn is_name_char(c: char) -> bool {
    is_name_start(c)
        || c.is_numeric()
        || matches!(c, '-' | '.' | '\u{b7}' | '\u{300}'..='\u{36f}' | '\u{203f}'..='\u{2040}')
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Content::Text(value) | Content::CData(value) => out.push_str(value),
            Content::Element(child) => collect_text(child, out),
            Content::Comment(_) => {}
        }
    }
}
