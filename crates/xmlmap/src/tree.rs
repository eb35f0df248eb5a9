//! Tree model shared by the decoder and the encoder

use indexmap::map::{IntoIter, Iter, IterMut, Keys, Values};
use indexmap::IndexMap;
use std::ops::Index;

use crate::error::{Error, ErrorKind, Span};
use crate::xml::model::is_xml_name;

/// A node of the decoded tree
///
/// An element without child elements becomes a [`Node::Leaf`] holding its
/// trimmed text, an element with at least one child element becomes a
/// [`Node::Branch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text content of an element without child elements
    Leaf(String),
    /// Child elements keyed by tag name, in document order
    Branch(Branch),
}

impl Default for Node {
    fn default() -> Self {
        Self::Leaf(String::new())
    }
}

impl Node {
    /// Returns true if this node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Returns true if this node is a branch
    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(_))
    }

    /// Returns the text if this is a leaf, None otherwise
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Leaf(text) => Some(text),
            Self::Branch(_) => None,
        }
    }

    /// Returns the children if this is a branch, None otherwise
    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            Self::Branch(branch) => Some(branch),
            Self::Leaf(_) => None,
        }
    }

    /// Returns a mutable reference to the children if this is a branch
    pub fn as_branch_mut(&mut self) -> Option<&mut Branch> {
        match self {
            Self::Branch(branch) => Some(branch),
            Self::Leaf(_) => None,
        }
    }

    /// Looks up a direct child by tag name; leaves have no children
    pub fn get(&self, name: &str) -> Option<&Self> {
        self.as_branch().and_then(|branch| branch.get(name))
    }

    /// Looks up a descendant by a `/`-separated path of tag names
    ///
    /// ```
    /// # fn main() -> Result<(), xmlmap::Error> {
    /// let tree = xmlmap::decode("<r><a><b>1</b></a></r>")?;
    /// assert_eq!(tree.pointer("/a/b").and_then(|n| n.as_text()), Some("1"));
    /// assert_eq!(tree.pointer(""), Some(&tree));
    /// # Ok(())
    /// # }
    /// ```
    pub fn pointer(&self, path: &str) -> Option<&Self> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.get(segment))
    }

    /// Fails on the first branch key, in document order, that is not a
    /// valid XML name and so cannot be encoded as an element
    pub fn check_names(&self) -> crate::error::Result<()> {
        let Self::Branch(branch) = self else {
            return Ok(());
        };
        for (name, child) in branch {
            if !is_xml_name(name) {
                return Err(Error::new(
                    ErrorKind::InvalidName { name: name.clone() },
                    Span::default(),
                ));
            }
            child.check_names()?;
        }
        Ok(())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::Leaf(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::Leaf(value.to_owned())
    }
}

impl From<char> for Node {
    fn from(value: char) -> Self {
        Self::Leaf(value.to_string())
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Leaf(value.to_string())
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Leaf(value.to_string())
    }
}

macro_rules! leaf_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Self::Leaf(value.to_string())
                }
            }
        )*
    };
}

leaf_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Absent values become an empty leaf
impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::default, Into::into)
    }
}

impl From<Branch> for Node {
    fn from(value: Branch) -> Self {
        Self::Branch(value)
    }
}

impl From<IndexMap<String, Node>> for Node {
    fn from(map: IndexMap<String, Node>) -> Self {
        Self::Branch(Branch(map))
    }
}

/// An insertion-ordered map of tag names to child nodes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Branch(pub(crate) IndexMap<String, Node>);

impl Branch {
    /// Creates a new empty branch
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Creates a new branch with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    /// Returns the number of children
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the branch has no children
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a reference to the child with the given name
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.0.get(name)
    }

    /// Returns a mutable reference to the child with the given name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.0.get_mut(name)
    }

    /// Inserts a child, returning the previous node under that name.
    /// A replaced child keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, node: impl Into<Node>) -> Option<Node> {
        self.0.insert(name.into(), node.into())
    }

    /// Removes a child, keeping the order of the remaining ones
    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.0.shift_remove(name)
    }

    /// Returns true if a child with the given name exists
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns an iterator over the child names
    pub fn keys(&self) -> Keys<'_, String, Node> {
        self.0.keys()
    }

    /// Returns an iterator over the child nodes
    pub fn values(&self) -> Values<'_, String, Node> {
        self.0.values()
    }

    /// Returns an iterator over name-node pairs in insertion order
    pub fn iter(&self) -> Iter<'_, String, Node> {
        self.0.iter()
    }

    /// Returns an iterator that allows modifying each child
    pub fn iter_mut(&mut self) -> IterMut<'_, String, Node> {
        self.0.iter_mut()
    }

    /// Removes all children
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Index<&str> for Branch {
    type Output = Node;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, name: &str) -> &Self::Output {
        &self.0[name]
    }
}

impl<'a> IntoIterator for &'a Branch {
    type Item = (&'a String, &'a Node);
    type IntoIter = Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Branch {
    type Item = (String, Node);
    type IntoIter = IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<IndexMap<String, Node>> for Branch {
    fn from(map: IndexMap<String, Node>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for Branch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, node)| (name.into(), node.into()))
                .collect(),
        )
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::{Branch, Node};
    use crate::xml::model::is_xml_name;
    use indexmap::IndexMap;
    use serde::de::{self, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    impl Serialize for Node {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Leaf(text) => serializer.serialize_str(text),
                Self::Branch(branch) => branch.serialize(serializer),
            }
        }
    }

    impl Serialize for Branch {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (name, node) in self {
                map.serialize_entry(name, node)?;
            }
            map.end()
        }
    }

    struct NodeVisitor;

    impl<'de> Visitor<'de> for NodeVisitor {
        type Value = Node;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, scalar, null, or map of nodes")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
            Ok(Node::from(v))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
            Ok(Node::from(v))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
            Ok(Node::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
            Ok(Node::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
            Ok(Node::from(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
            Ok(Node::from(v))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
            Ok(Node::default())
        }

        fn visit_none<E: de::Error>(self) -> Result<Node, E> {
            Ok(Node::default())
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
            Node::deserialize(deserializer)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Node, A::Error> {
            let mut children = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(name) = access.next_key::<String>()? {
                if !is_xml_name(&name) {
                    return Err(de::Error::custom(format_args!(
                        "invalid element name {name:?}"
                    )));
                }
                let node = access.next_value::<Node>()?;
                children.insert(name, node);
            }
            Ok(Node::Branch(Branch(children)))
        }
    }

    impl<'de> Deserialize<'de> for Node {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(NodeVisitor)
        }
    }

    impl<'de> Deserialize<'de> for Branch {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            match Node::deserialize(deserializer)? {
                Node::Branch(branch) => Ok(branch),
                Node::Leaf(_) => Err(de::Error::custom("expected a map of nodes")),
            }
        }
    }
}
