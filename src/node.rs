//! Items related to nodes in the RealDom

use crate::real_dom::NodeId;
use rustc_hash::FxHashMap;
use std::fmt::Display;

/// The reserved attribute that marks an element as a fragment placeholder.
///
/// The rendering collaborator stamps this attribute onto the disposable
/// element it produces for a fragment; [`crate::RealDom::mount_fragment`]
/// recognizes the element by it and reads the fragment's name from its value.
pub const FRAGMENT_STUB_ATTRIBUTE: &str = "fragment_stub";

/// An element node in the RealDom
#[derive(Debug, Clone, Default)]
pub struct ElementNode {
    /// The tag of the element
    pub tag: String,
    /// The attributes of the element
    pub attributes: FxHashMap<String, String>,
}

impl ElementNode {
    /// Create a new element node
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Default::default(),
        }
    }

    /// Create a disposable fragment placeholder element carrying the
    /// reserved stub attribute with the fragment's name as its value.
    pub fn placeholder(name: impl Into<String>) -> Self {
        let mut element = Self::new("div");
        element
            .attributes
            .insert(FRAGMENT_STUB_ATTRIBUTE.to_string(), name.into());
        element
    }
}

/// A text node in the RealDom
#[derive(Debug, Clone, Default)]
pub struct TextNode {
    /// The text of the node
    pub text: String,
}

impl TextNode {
    /// Create a new text node
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Which end of a fragment's region a marker delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEnd {
    Head,
    Tail,
}

/// An invisible node delimiting one end of a fragment's region among its
/// real siblings. Carries no content besides the owning fragment's name,
/// which is kept for diagnostics only.
#[derive(Debug, Clone)]
pub struct MarkerNode {
    /// The name of the owning fragment
    pub fragment: String,
    /// Which end of the region this marker sits at
    pub end: MarkerEnd,
    /// The id of the owning fragment proxy
    pub owner: NodeId,
}

impl Display for MarkerNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let end = match self.end {
            MarkerEnd::Head => "head",
            MarkerEnd::Tail => "tail",
        };
        write!(f, "fragment#{}#{}", self.fragment, end)
    }
}

/// The lifecycle state of a fragment proxy.
///
/// A fragment is born `Installed` when the mount installer converts its
/// placeholder in place; teardown moves it to `Removed`. A removed proxy is
/// discarded, never re-installed, and is rejected by the mutation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentStatus {
    Installed,
    Removed,
}

/// A virtual grouping node. It owns an ordered member list and a pair of
/// marker nodes delimiting its region in the real tree, and answers the same
/// navigation/mutation contract as a real node.
#[derive(Debug, Clone)]
pub struct FragmentNode {
    pub(crate) name: String,
    pub(crate) members: Vec<NodeId>,
    pub(crate) head: NodeId,
    pub(crate) tail: NodeId,
    pub(crate) real_parent: NodeId,
    pub(crate) status: FragmentStatus,
}

impl FragmentNode {
    /// The fragment's identity, as stamped on its markers
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The nodes logically owned by this fragment, in region order
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// The marker opening the fragment's region
    pub fn head(&self) -> NodeId {
        self.head
    }

    /// The marker closing the fragment's region
    pub fn tail(&self) -> NodeId {
        self.tail
    }

    /// The real ancestor that physically hosts the fragment's region
    pub fn real_parent(&self) -> NodeId {
        self.real_parent
    }

    pub fn is_installed(&self) -> bool {
        self.status == FragmentStatus::Installed
    }
}

/// A type of node with data specific to the node type.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// A text node
    Text(TextNode),
    /// An element node
    Element(ElementNode),
    /// An invisible marker delimiting a fragment's region
    Marker(MarkerNode),
    /// An installed fragment proxy
    Fragment(FragmentNode),
}

impl NodeData {
    /// Whether this node is a disposable fragment placeholder, recognized by
    /// the reserved stub attribute.
    pub fn is_placeholder(&self) -> bool {
        match self {
            Self::Element(element) => element.attributes.contains_key(FRAGMENT_STUB_ATTRIBUTE),
            _ => false,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_marker(&self) -> Option<&MarkerNode> {
        match self {
            Self::Marker(marker) => Some(marker),
            _ => None,
        }
    }

    pub fn as_fragment(&self) -> Option<&FragmentNode> {
        match self {
            Self::Fragment(fragment) => Some(fragment),
            _ => None,
        }
    }

    pub(crate) fn as_fragment_mut(&mut self) -> Option<&mut FragmentNode> {
        match self {
            Self::Fragment(fragment) => Some(fragment),
            _ => None,
        }
    }
}

impl<S: Into<String>> From<S> for NodeData {
    fn from(text: S) -> Self {
        Self::Text(TextNode::new(text.into()))
    }
}

impl From<TextNode> for NodeData {
    fn from(text: TextNode) -> Self {
        Self::Text(text)
    }
}

impl From<ElementNode> for NodeData {
    fn from(element: ElementNode) -> Self {
        Self::Element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_carry_the_stub_attribute() {
        let plain = ElementNode::new("div");
        assert!(!NodeData::Element(plain).is_placeholder());

        let placeholder = ElementNode::placeholder("list");
        assert_eq!(
            placeholder.attributes.get(FRAGMENT_STUB_ATTRIBUTE),
            Some(&"list".to_string())
        );
        assert!(NodeData::Element(placeholder).is_placeholder());
    }

    #[test]
    fn accessors_match_the_variant() {
        let text = NodeData::from("hi");
        assert_eq!(text.as_text().map(|t| t.text.as_str()), Some("hi"));
        assert!(text.as_element().is_none());

        let marker = NodeData::Marker(MarkerNode {
            fragment: "list".into(),
            end: MarkerEnd::Head,
            owner: NodeId(7),
        });
        assert_eq!(
            marker.as_marker().map(MarkerNode::to_string).as_deref(),
            Some("fragment#list#head")
        );
    }
}
