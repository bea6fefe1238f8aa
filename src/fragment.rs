//! Mounting fragments: converting a disposable placeholder subtree into a
//! live, spliced-in fragment proxy.

use crate::error::{DomError, Result};
use crate::node::{
    ElementNode, FragmentNode, FragmentStatus, MarkerEnd, MarkerNode, NodeData,
    FRAGMENT_STUB_ATTRIBUTE,
};
use crate::real_dom::{NodeId, RealDom};
use crate::shim::Computed;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FRAGMENT: AtomicU64 = AtomicU64::new(0);

/// Process-wide fragment identity for callers that do not name their
/// fragments. A monotonic counter cannot collide.
pub(crate) fn generate_name() -> String {
    format!("fragment-{}", NEXT_FRAGMENT.fetch_add(1, Ordering::Relaxed))
}

impl RealDom {
    /// Create a disposable placeholder element for a fragment. Children
    /// appended to it before [`RealDom::mount_fragment`] become the
    /// fragment's initial members.
    pub fn create_placeholder(&mut self, name: Option<&str>) -> NodeId {
        let name = match name {
            Some(name) => name.to_owned(),
            None => generate_name(),
        };
        self.create_node(ElementNode::placeholder(name))
    }

    /// The nearest non-fragment ancestor of `id`, walking the reported
    /// parent chain through any run of nested fragment proxies and
    /// not-yet-mounted placeholders.
    pub fn resolve_real_ancestor(&self, id: NodeId) -> Result<NodeId> {
        let mut current = id;
        loop {
            let node = self.node(current)?;
            let fragment_like =
                matches!(node.data, NodeData::Fragment(_)) || node.data.is_placeholder();
            if !fragment_like {
                return Ok(current);
            }
            current = self
                .parent_id(current)
                .ok_or(DomError::Detached(current))?;
        }
    }

    /// Convert `placeholder` into an installed fragment proxy, in place.
    ///
    /// The placeholder's children become the member list, a head and tail
    /// marker are spliced around them where the placeholder stood, and the
    /// placeholder itself leaves the real tree. The returned id is the same
    /// id: collaborators that held the placeholder now hold the proxy.
    ///
    /// Mounting an already-installed fragment is a no-op.
    pub fn mount_fragment(&mut self, placeholder: NodeId) -> Result<NodeId> {
        let node = self.node(placeholder)?;
        if let NodeData::Fragment(fragment) = &node.data {
            if fragment.is_installed() {
                tracing::trace!(?placeholder, "fragment already mounted");
                return Ok(placeholder);
            }
            return Err(DomError::NotInstalled(placeholder));
        }
        if !node.data.is_placeholder() {
            return Err(DomError::NotAPlaceholder(placeholder));
        }
        let physical_parent = node.parent.ok_or(DomError::Detached(placeholder))?;
        let name = node
            .data
            .as_element()
            .and_then(|element| element.attributes.get(FRAGMENT_STUB_ATTRIBUTE))
            .filter(|text| !text.is_empty())
            .cloned()
            .unwrap_or_else(generate_name);

        let direct_parent = self
            .parent_id(placeholder)
            .ok_or(DomError::Detached(placeholder))?;
        let real_parent = self.resolve_real_ancestor(direct_parent)?;

        // interceptor install on the real ancestor, idempotent
        if !self.node(real_parent)?.hosts_fragments {
            self.node_mut(real_parent)?.hosts_fragments = true;
            tracing::trace!(?real_parent, "installed fragment interception");
        }

        let nested_owner = self
            .is_installed_fragment(direct_parent)
            .then_some(direct_parent);
        if let Some(owner) = nested_owner {
            // mounting in a member slot of an installed fragment: the member
            // entry keeps this very id, so the owner's list needs no change
            if !self.fragment(owner)?.members().contains(&placeholder) {
                return Err(DomError::Desynchronized { fragment: owner });
            }
        }

        let head = self.create_marker(MarkerNode {
            fragment: name.clone(),
            end: MarkerEnd::Head,
            owner: placeholder,
        });
        let tail = self.create_marker(MarkerNode {
            fragment: name.clone(),
            end: MarkerEnd::Tail,
            owner: placeholder,
        });

        // splice head, members, tail into the physical parent where the
        // placeholder stands, then drop the placeholder out of the tree
        let members = self.node(placeholder)?.children.clone();
        self.raw_insert_before(physical_parent, head, Some(placeholder))?;
        for member in &members {
            self.raw_insert_before(physical_parent, *member, Some(placeholder))?;
        }
        self.raw_insert_before(physical_parent, tail, Some(placeholder))?;
        self.raw_detach(placeholder);

        // the disposable placeholder becomes the proxy, same identity
        let claimed = nested_owner.unwrap_or(real_parent);
        let node = self.node_mut(placeholder)?;
        node.data = NodeData::Fragment(FragmentNode {
            name: name.clone(),
            members: members.clone(),
            head,
            tail,
            real_parent,
            status: FragmentStatus::Installed,
        });
        node.claimed_parent.bind(Some(claimed));
        node.spoofed_next = Some(Computed::NextSiblingOf(tail));
        for member in members {
            let member = self.node_mut(member)?;
            // a member pinned by an already-installed nested fragment keeps
            // its claim; everything else now reports this proxy
            if !member.claimed_parent.is_pinned() {
                member.claimed_parent.bind(Some(placeholder));
            }
        }

        tracing::trace!(
            fragment = %name,
            id = ?placeholder,
            parent = ?real_parent,
            "mounted fragment"
        );
        Ok(placeholder)
    }
}
