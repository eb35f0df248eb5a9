//! Single-level codec: direct children of the root as name/text pairs

use indexmap::IndexMap;
use tracing::instrument;

use crate::encode::DEFAULT_ROOT;
use crate::error::Result;
use crate::xml::model::{Content, Document, Element};
use crate::xml::parser::Parser;
use crate::xml::printer::Printer;

/// Ordered name/text pairs
pub type FlatMap = IndexMap<String, String>;

/// Map every direct child of the root to its full text content
///
/// Nested elements are not descended into as separate entries; their text
/// is folded into the enclosing child's value without trimming.
#[instrument(level = "debug", skip_all, fields(len = input.len()))]
pub fn decode_flat(input: &str) -> Result<FlatMap> {
    let doc = Parser::new(input.as_bytes()).parse()?;
    Ok(doc
        .root
        .child_elements()
        .map(|child| (child.name.clone(), child.text_content()))
        .collect())
}

/// Wrap each pair in a child element of `<xml>`; values are trimmed
pub fn encode_flat<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut root = Element::new(DEFAULT_ROOT);
    for (key, value) in entries {
        let mut child = Element::new(key.as_ref());
        let value = value.as_ref().trim();
        if !value.is_empty() {
            child.children.push(Content::Text(value.to_string()));
        }
        root.children.push(Content::Element(child));
    }
    Printer::default().print(&Document { root })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_flat_folds_nested_text() -> Result<()> {
        let map = decode_flat("<r><a> 1 </a><b><c>2</c><d>3</d></b><e/></r>")?;
        let entries: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(entries, vec![("a", " 1 "), ("b", "23"), ("e", "")]);
        Ok(())
    }

    #[test]
    fn test_decode_flat_last_duplicate_wins() -> Result<()> {
        let map = decode_flat("<r><a>1</a><a>2</a></r>")?;
        assert_eq!(map.get("a").map(String::as_str), Some("2"));
        assert_eq!(map.len(), 1);
        Ok(())
    }

    #[test]
    fn test_encode_flat_trims_and_escapes() {
        let out = encode_flat([("name", "  Tom & Jerry "), ("empty", "")]);
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <xml>\n\
             \t<name>Tom &amp; Jerry</name>\n\
             \t<empty/>\n\
             </xml>\n"
        );
    }

    #[test]
    fn test_flat_roundtrip() -> Result<()> {
        let mut map = FlatMap::new();
        map.insert("id".to_string(), "42".to_string());
        map.insert("title".to_string(), "notice".to_string());
        assert_eq!(decode_flat(&encode_flat(&map))?, map);
        Ok(())
    }
}
