//! Error types for xmlmap

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }

    /// Resolve a byte offset into a 1-based line and column.
    ///
    /// Offsets past the end of `input` are clamped to its length.
    pub fn locate(input: &[u8], offset: usize) -> Self {
        let offset = offset.min(input.len());
        let before = input.get(..offset).unwrap_or_default();
        let mut line: u32 = 1;
        let mut col: u32 = 1;
        for &b in before {
            if b == b'\n' {
                line = line.saturating_add(1);
                col = 1;
            } else if b & 0xC0 != 0x80 {
                // continuation bytes belong to the previous character
                col = col.saturating_add(1);
            }
        }
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn point(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyDocument,
    Syntax,
    InvalidEncoding,
    MismatchedTag { expected: String, found: String },
    UnclosedElement { name: String },
    UnexpectedEndTag { name: String },
    MultipleRoots,
    TextOutsideRoot,
    InvalidName { name: String },
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDocument => write!(f, "document has no root element"),
            Self::Syntax => write!(f, "malformed xml"),
            Self::InvalidEncoding => write!(f, "invalid utf-8"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "expected </{expected}>, found </{found}>")
            }
            Self::UnclosedElement { name } => write!(f, "unclosed element <{name}>"),
            Self::UnexpectedEndTag { name } => write!(f, "unexpected closing tag </{name}>"),
            Self::MultipleRoots => write!(f, "multiple root elements"),
            Self::TextOutsideRoot => write!(f, "text outside the root element"),
            Self::InvalidName { name } => write!(f, "invalid xml name {name:?}"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
        }
    }
}

/// Main error type for xmlmap
///
/// Every failure of [`decode`](crate::decode) and [`format`](crate::format)
/// is reported through this type; the message carries the underlying
/// tokenizer diagnostic when there is one.
#[derive(Error, Clone, Debug, PartialEq)]
#[error("error at {}: {}", .span.start, .message)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

/// Name used for the decoder/formatter failure in API docs
pub type ParseError = Error;

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at a byte offset of `input`
    pub fn at(kind: ErrorKind, input: &[u8], offset: usize) -> Self {
        Self::new(kind, Span::point(Pos::locate(input, offset)))
    }
}

/// Result type alias for xmlmap
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_display() {
        let pos = Pos::new(42, 10, 5);
        assert_eq!(pos.to_string(), "42:10:5");
    }

    #[test]
    fn test_locate_counts_lines_and_columns() {
        let input = b"<a>\n  <b>";
        assert_eq!(Pos::locate(input, 0), Pos::new(0, 1, 1));
        assert_eq!(Pos::locate(input, 6), Pos::new(6, 2, 3));
    }

    #[test]
    fn test_locate_clamps_and_skips_continuation_bytes() {
        let input = "<é>".as_bytes();
        assert_eq!(Pos::locate(input, 100).offset, input.len());
        assert_eq!(Pos::locate(input, input.len()).col, 4);
    }

    #[test]
    fn test_error_creation() {
        let err = Error::at(ErrorKind::Syntax, b"<a", 2);
        assert_eq!(err.kind(), &ErrorKind::Syntax);
        assert_eq!(err.span().start.col, 3);
    }

    #[test]
    fn test_error_display() {
        let err = Error::at(
            ErrorKind::MismatchedTag {
                expected: "a".to_string(),
                found: "b".to_string(),
            },
            b"<a></b>",
            3,
        );
        let display = err.to_string();
        assert!(display.contains("error at 3:1:4"));
        assert!(display.contains("expected </a>, found </b>"));
    }
}
