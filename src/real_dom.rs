//! A slab-backed mutable ordered tree of DOM-like nodes.
//!
//! The arena stores every node, real or virtual, behind a [`NodeId`]. The
//! physical tree is the `parent`/`children` links; reported navigation goes
//! through the property-shim slots so that fragment proxies and their
//! members can claim positions they do not physically occupy.

use crate::error::{DomError, Result};
use crate::node::{ElementNode, MarkerNode, NodeData, TextNode};
use crate::shim::{Computed, ParentClaim};
use slab::Slab;

#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug)]
pub(crate) struct Node {
    pub data: NodeData,
    /// Physical link into the real tree. `None` while detached.
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// The reported parent, which a fragment membership may pin away from
    /// the physical link.
    pub claimed_parent: ParentClaim,
    /// A recomputed next-sibling strategy, bound on installed fragments.
    pub spoofed_next: Option<Computed>,
    /// Set once a fragment region has been installed under this node. A
    /// second installation is a no-op.
    pub hosts_fragments: bool,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            claimed_parent: ParentClaim::Stored(None),
            spoofed_next: None,
            hosts_fragments: false,
        }
    }
}

#[derive(Debug)]
pub struct RealDom {
    nodes: Slab<Node>,
    root: NodeId,
}

impl RealDom {
    pub fn new(root: impl Into<NodeData>) -> Self {
        let mut nodes = Slab::default();
        let root = NodeId(nodes.insert(Node::new(root.into())));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0)
    }

    /// The number of live nodes in the arena, including detached ones.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).map(|node| &node.data)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0).map(|node| &mut node.data)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(DomError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DomError::NodeNotFound(id))
    }

    pub fn create_node(&mut self, data: impl Into<NodeData>) -> NodeId {
        NodeId(self.nodes.insert(Node::new(data.into())))
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.create_node(ElementNode::new(tag))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create_node(TextNode::new(text))
    }

    pub(crate) fn create_marker(&mut self, marker: MarkerNode) -> NodeId {
        self.create_node(NodeData::Marker(marker))
    }

    /// The reported parent of `id`, which for fragment members is the owning
    /// fragment rather than the real ancestor.
    pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.nodes
            .get(id.0)
            .and_then(|node| node.claimed_parent.read())
    }

    /// The reported next sibling of `id`. For an installed fragment this is
    /// recomputed as the tail marker's current next sibling on every read.
    pub fn next_sibling_id(&self, id: NodeId) -> Option<NodeId> {
        let node = self.nodes.get(id.0)?;
        match node.spoofed_next {
            Some(Computed::NextSiblingOf(other)) => self.physical_next_sibling(other),
            None => self.physical_next_sibling(id),
        }
    }

    fn physical_next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(id.0)?.parent?;
        let siblings = &self.nodes.get(parent.0)?.children;
        let position = siblings.iter().position(|child| *child == id)?;
        siblings.get(position + 1).copied()
    }

    /// The reported children of `id`: the member list for an installed
    /// fragment, the physical child list for everything else.
    pub fn child_ids(&self, id: NodeId) -> Option<&[NodeId]> {
        let node = self.nodes.get(id.0)?;
        match node.data.as_fragment() {
            Some(fragment) if fragment.is_installed() => Some(fragment.members()),
            _ => Some(node.children.as_slice()),
        }
    }

    /// An external write attempt against the reported parent. Accepted on
    /// ordinary nodes; rejected with a warning, and without effect, on nodes
    /// whose parent is pinned by a fragment.
    pub fn set_parent_claim(&mut self, id: NodeId, value: Option<NodeId>) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(node) => node.claimed_parent.write(value),
            None => false,
        }
    }

    pub(crate) fn is_installed_fragment(&self, id: NodeId) -> bool {
        matches!(
            self.get(id),
            Some(NodeData::Fragment(fragment)) if fragment.is_installed()
        )
    }

    pub(crate) fn fragment(&self, id: NodeId) -> Result<&crate::node::FragmentNode> {
        self.node(id)?
            .data
            .as_fragment()
            .ok_or(DomError::NotAFragment(id))
    }

    pub(crate) fn fragment_mut(&mut self, id: NodeId) -> Result<&mut crate::node::FragmentNode> {
        self.node_mut(id)?
            .data
            .as_fragment_mut()
            .ok_or(DomError::NotAFragment(id))
    }

    pub(crate) fn position_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.nodes
            .get(parent.0)?
            .children
            .iter()
            .position(|id| *id == child)
    }

    /// Unlink `child` from its physical parent, if any. The node stays live
    /// in the arena.
    pub(crate) fn raw_detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get(child.0).and_then(|node| node.parent) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.retain(|id| *id != child);
        }
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = None;
            node.claimed_parent.follow(None);
        }
    }

    /// Physically insert `child` under `parent` immediately before `anchor`,
    /// or at the end when there is no anchor. Detaches `child` from any
    /// previous parent first, DOM move semantics.
    pub(crate) fn raw_insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<()> {
        if let Some(anchor) = anchor {
            if self.position_of(parent, anchor).is_none() {
                return Err(DomError::NotAChild {
                    parent,
                    reference: anchor,
                });
            }
            // inserting a node before itself leaves the tree unchanged
            if anchor == child {
                return Ok(());
            }
        }
        self.raw_detach(child);
        // recompute after the detach in case child and anchor shared a parent
        let index = match anchor {
            Some(anchor) => self
                .position_of(parent, anchor)
                .expect("anchor verified above"),
            None => self.node(parent)?.children.len(),
        };
        self.node_mut(parent)?.children.insert(index, child);
        let node = self.node_mut(child)?;
        node.parent = Some(parent);
        node.claimed_parent.follow(Some(parent));
        Ok(())
    }

    /// Drop a node from the arena, along with any physical descendants.
    pub(crate) fn purge(&mut self, id: NodeId) {
        self.raw_detach(id);
        let Some(node) = self.nodes.try_remove(id.0) else {
            return;
        };
        for child in node.children {
            self.purge_recursive(child);
        }
    }

    fn purge_recursive(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.try_remove(id.0) {
            for child in node.children {
                self.purge_recursive(child);
            }
        }
    }
}
