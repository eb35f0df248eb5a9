//! XML parser built on the quick-xml pull reader

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::xml::model::{is_xml_name, Content, Document, Element};

const DEFAULT_MAX_DEPTH: u16 = 1024;

/// Limits applied while parsing
///
/// The default caps nesting at 1024 levels, which keeps the recursive
/// tree conversions well inside a thread's stack, and leaves size unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, 0)
    }
}

impl DecodeConfig {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// XML parser producing an owned element tree
///
/// Every parser owns its reader and configuration, so independent parsers
/// can run on different threads at the same time.
#[derive(Debug)]
pub struct Parser<'a> {
    input: &'a [u8],
    config: DecodeConfig,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser with default limits
    pub const fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, DecodeConfig::new(DEFAULT_MAX_DEPTH, 0))
    }

    /// Create a new XML parser with custom limits
    pub const fn with_config(input: &'a [u8], config: DecodeConfig) -> Self {
        Self { input, config }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size > 0 && self.input.len() > self.config.max_size {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                self.input,
                self.config.max_size,
            ));
        }

        let text = match std::str::from_utf8(self.input) {
            Ok(text) => text,
            Err(err) => {
                return Err(Error::with_message(
                    ErrorKind::InvalidEncoding,
                    Span::point(Pos::locate(self.input, err.valid_up_to())),
                    err.to_string(),
                ));
            }
        };
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let bom = self.input.len() - text.len();

        let mut reader = Reader::from_str(text);
        // closing tags are matched against the open-element stack below
        reader.config_mut().check_end_names = false;

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let offset = to_offset(reader.error_position()).saturating_add(bom);
                    return Err(self.error_with(ErrorKind::Syntax, offset, err.to_string()));
                }
            };
            let offset = to_offset(reader.buffer_position()).saturating_add(bom);

            match event {
                Event::Start(start) => {
                    let element = self.open_element(&start, &stack, root.is_some(), offset)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = self.open_element(&start, &stack, root.is_some(), offset)?;
                    attach(element, &mut stack, &mut root);
                }
                Event::End(end) => {
                    let name = self.utf8(end.name().into_inner(), offset)?;
                    let Some(mut element) = stack.pop() else {
                        return Err(self.error(
                            ErrorKind::UnexpectedEndTag {
                                name: name.into_owned(),
                            },
                            offset,
                        ));
                    };
                    if element.name != name {
                        return Err(self.error(
                            ErrorKind::MismatchedTag {
                                expected: element.name,
                                found: name.into_owned(),
                            },
                            offset,
                        ));
                    }
                    element.strip_layout_whitespace();
                    attach(element, &mut stack, &mut root);
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|err| self.error_with(ErrorKind::Syntax, offset, err.to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Content::Text(value.into_owned())),
                        None if value.trim().is_empty() => {}
                        None => return Err(self.error(ErrorKind::TextOutsideRoot, offset)),
                    }
                }
                Event::CData(data) => {
                    let value = self.utf8(&data, offset)?.into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Content::CData(value)),
                        None => return Err(self.error(ErrorKind::TextOutsideRoot, offset)),
                    }
                }
                Event::Comment(comment) => {
                    let value = self.utf8(&comment, offset)?.into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Content::Comment(value)),
                        None => trace!("dropping comment outside the root element"),
                    }
                }
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.pop() {
            return Err(self.error(
                ErrorKind::UnclosedElement { name: open.name },
                self.input.len(),
            ));
        }

        root.map(|root| Document { root })
            .ok_or_else(|| self.error(ErrorKind::EmptyDocument, self.input.len()))
    }

    fn open_element(
        &self,
        start: &BytesStart<'_>,
        stack: &[Element],
        has_root: bool,
        offset: usize,
    ) -> Result<Element> {
        if stack.is_empty() && has_root {
            return Err(self.error(ErrorKind::MultipleRoots, offset));
        }

        let depth = stack.len().saturating_add(1);
        if self.config.max_depth > 0 && depth > usize::from(self.config.max_depth) {
            return Err(self.error(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                offset,
            ));
        }

        let mut element = Element::new(self.name(start.name().into_inner(), offset)?);
        for attr in start.attributes() {
            let attr =
                attr.map_err(|err| self.error_with(ErrorKind::Syntax, offset, err.to_string()))?;
            let key = self.name(attr.key.as_ref(), offset)?;
            let value = attr
                .unescape_value()
                .map_err(|err| self.error_with(ErrorKind::Syntax, offset, err.to_string()))?;
            element.attributes.insert(key, value.into_owned());
        }
        Ok(element)
    }

    fn utf8<'b>(&self, bytes: &'b [u8], offset: usize) -> Result<Cow<'b, str>> {
        std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|err| self.error_with(ErrorKind::InvalidEncoding, offset, err.to_string()))
    }

    fn name(&self, bytes: &[u8], offset: usize) -> Result<String> {
        let name = self.utf8(bytes, offset)?.into_owned();
        if !is_xml_name(&name) {
            return Err(self.error(ErrorKind::InvalidName { name }, offset));
        }
        Ok(name)
    }

    fn error(&self, kind: ErrorKind, offset: usize) -> Error {
        Error::at(kind, self.input, offset)
    }

    fn error_with(&self, kind: ErrorKind, offset: usize, detail: String) -> Error {
        let located = Error::at(kind, self.input, offset);
        let message = format!("{}: {detail}", located.kind());
        Error::with_message(located.kind().clone(), located.span(), message)
    }
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Content::Element(element)),
        None => *root = Some(element),
    }
}

fn to_offset<T: TryInto<usize>>(position: T) -> usize {
    position.try_into().unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Document> {
        Parser::new(input.as_bytes()).parse()
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let doc = parse("<root></root>")?;
        assert_eq!(doc.root.name, "root");
        assert!(doc.root.children.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_with_attributes() -> Result<()> {
        let doc = parse("<root id=\"1\" name='a &amp; b'></root>")?;
        assert_eq!(doc.root.attributes.get("id"), Some(&"1".to_string()));
        assert_eq!(doc.root.attributes.get("name"), Some(&"a & b".to_string()));
        Ok(())
    }

    #[test]
    fn test_parse_nested_drops_whitespace_text() -> Result<()> {
        let doc = parse("<root>\n  <child>a &lt; b</child>\n</root>")?;
        assert_eq!(doc.root.children.len(), 1);
        match doc.root.children.first() {
            Some(Content::Element(child)) => {
                assert_eq!(child.name, "child");
                assert_eq!(child.children, vec![Content::Text("a < b".to_string())]);
            }
            other => panic!("expected child element, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_keeps_whitespace_between_cdata() -> Result<()> {
        let doc = parse("<a><![CDATA[x]]> <![CDATA[y]]></a>")?;
        assert_eq!(
            doc.root.children,
            vec![
                Content::CData("x".to_string()),
                Content::Text(" ".to_string()),
                Content::CData("y".to_string()),
            ]
        );

        let doc = parse("<a>\n  <!-- c -->\n</a>")?;
        assert_eq!(doc.root.children, vec![Content::Comment(" c ".to_string())]);
        Ok(())
    }

    #[test]
    fn test_invalid_names_rejected() {
        for input in ["<1x/>", "<a><-b/></a>", "<a 1k=\"v\"/>"] {
            assert!(
                matches!(
                    parse(input).err().map(|e| e.kind().clone()),
                    Some(ErrorKind::InvalidName { .. })
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_self_closing() -> Result<()> {
        let doc = parse("<root><child /></root>")?;
        assert_eq!(doc.root.children, vec![Content::Element(Element::new("child"))]);
        Ok(())
    }

    #[test]
    fn test_parse_cdata_and_comments() -> Result<()> {
        let doc = parse("<?xml version=\"1.0\"?><!-- top --><r><!-- c --><![CDATA[<x>]]></r>")?;
        assert_eq!(
            doc.root.children,
            vec![
                Content::Comment(" c ".to_string()),
                Content::CData("<x>".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_parse_strips_bom() -> Result<()> {
        let doc = Parser::new("\u{feff}<r/>".as_bytes()).parse()?;
        assert_eq!(doc.root.name, "r");
        Ok(())
    }

    #[test]
    fn test_empty_input() {
        let err = parse("").err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::EmptyDocument));

        let err = parse("  \n <!-- only a comment -->").err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::EmptyDocument));
    }

    #[test]
    fn test_mismatched_tag() {
        let err = parse("<a><b></a>").err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MismatchedTag {
                expected: "b".to_string(),
                found: "a".to_string(),
            })
        );
    }

    #[test]
    fn test_unclosed_and_unexpected_tags() {
        let err = parse("<a><b></b>").err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::UnclosedElement {
                name: "a".to_string()
            })
        );

        let err = parse("</a>").err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::UnexpectedEndTag {
                name: "a".to_string()
            })
        );
    }

    #[test]
    fn test_multiple_roots_and_stray_text() {
        let err = parse("<a/><b/>").err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::MultipleRoots));

        let err = parse("<a/>tail").err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::TextOutsideRoot));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = Parser::new(b"<a>\xff</a>").parse().err();
        let err = err.map(|e| (e.kind().clone(), e.span().start.offset));
        assert_eq!(err, Some((ErrorKind::InvalidEncoding, 3)));
    }

    #[test]
    fn test_depth_limit() {
        let config = DecodeConfig::new(2, 0);
        assert!(Parser::with_config(b"<a><b/></a>", config).parse().is_ok());

        let err = Parser::with_config(b"<a><b><c/></b></a>", config).parse().err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MaxDepthExceeded { max: 2 })
        );
    }

    #[test]
    fn test_default_depth_and_unlimited() -> Result<()> {
        let deep = |levels: usize| format!("{}{}", "<n>".repeat(levels), "</n>".repeat(levels));

        assert!(parse(&deep(1024)).is_ok());
        let err = parse(&deep(1025)).err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MaxDepthExceeded { max: 1024 })
        );

        let input = deep(1500);
        Parser::with_config(input.as_bytes(), DecodeConfig::unlimited()).parse()?;
        Ok(())
    }

    #[test]
    fn test_size_limit() {
        let config = DecodeConfig::new(0, 4);
        let err = Parser::with_config(b"<abc/>", config).parse().err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MaxSizeExceeded { max: 4 })
        );
    }

    #[test]
    fn test_syntax_error_carries_diagnostic() {
        let err = parse("<a><!-- never closed</a>").err();
        assert!(matches!(err.as_ref().map(Error::kind), Some(ErrorKind::Syntax)));
        assert!(err.is_some_and(|e| e.message().starts_with("malformed xml: ")));
    }
}
