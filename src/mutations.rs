//! The DOM-facing mutation operations.
//!
//! Every operation dispatches on what its arguments are rather than on which
//! node it was called against: a fragment parent routes to the proxy path,
//! scoped to the fragment's member list; a real parent routes to the host
//! path, which redirects any fragment reference or insertee into or around
//! the fragment's marker-delimited region. Callers cannot tell the two
//! apart, which is the point.

use crate::error::{DomError, Result};
use crate::node::{FragmentStatus, MarkerEnd, NodeData};
use crate::real_dom::{NodeId, RealDom};
use smallvec::SmallVec;

impl RealDom {
    /// Insert `insertee` under `parent` immediately before `reference`, or
    /// at the end when `reference` is `None`.
    ///
    /// `parent`, `insertee`, and `reference` may each be an installed
    /// fragment; the insertion is redirected so the caller observes
    /// ordinary single-node semantics.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        insertee: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        self.node(parent)?;
        self.node(insertee)?;
        if let Some(reference) = reference {
            self.node(reference)?;
            self.reject_removed_fragment(reference)?;
        }
        if insertee == self.root() {
            return Err(DomError::CannotMutateRoot);
        }
        self.reject_removed_fragment(parent)?;
        self.reject_removed_fragment(insertee)?;
        if self.is_installed_fragment(parent) {
            self.fragment_insert_before(parent, insertee, reference)
        } else {
            self.host_insert_before(parent, insertee, reference)
        }
    }

    /// Append `child` as the last child of `parent`. On a fragment parent
    /// this also re-orders `child` to the end if it was already a member.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.root() {
            return Err(DomError::CannotMutateRoot);
        }
        self.reject_removed_fragment(parent)?;
        self.reject_removed_fragment(child)?;
        if self.is_installed_fragment(parent) {
            self.fragment_append_child(parent, child)
        } else {
            self.host_insert_before(parent, child, None)
        }
    }

    /// Remove `child` from `parent`. Removing an installed fragment tears
    /// down its whole region: members, markers, and all parent claims.
    /// Removed nodes are detached, not destroyed; markers are destroyed.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.root() {
            return Err(DomError::CannotMutateRoot);
        }
        self.reject_removed_fragment(parent)?;
        if self.is_installed_fragment(parent) {
            self.fragment_remove_child(parent, child)
        } else if self.is_installed_fragment(child) {
            self.teardown_fragment(parent, child)
        } else {
            if self.position_of(parent, child).is_none() {
                return Err(DomError::NotAChild {
                    parent,
                    reference: child,
                });
            }
            self.raw_detach(child);
            Ok(())
        }
    }

    /// A torn-down proxy is discarded, never reused.
    fn reject_removed_fragment(&self, id: NodeId) -> Result<()> {
        match self.get(id) {
            Some(NodeData::Fragment(fragment)) if !fragment.is_installed() => {
                Err(DomError::NotInstalled(id))
            }
            _ => Ok(()),
        }
    }

    // ---- host path: a real parent whose mutations may touch fragments ----

    fn host_insert_before(
        &mut self,
        parent: NodeId,
        insertee: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        // "before this virtual node" means before its head marker
        let hosts = self.node(parent)?.hosts_fragments;
        let anchor = match reference {
            Some(reference) if hosts && self.is_installed_fragment(reference) => {
                Some(self.fragment(reference)?.head())
            }
            other => other,
        };
        if self.is_installed_fragment(insertee) {
            self.spread_fragment(parent, insertee, anchor)
        } else {
            self.raw_insert_before(parent, insertee, anchor)
        }
    }

    /// A fragment cannot exist as a literal child; moving one spreads its
    /// head marker, every node of its region, and its tail marker into
    /// `parent` at the anchor, in order.
    fn spread_fragment(
        &mut self,
        parent: NodeId,
        fragment: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<()> {
        let old_parent = self.fragment(fragment)?.real_parent();
        let (start, end) = self.verify_region(fragment)?;
        let region: SmallVec<[NodeId; 8]> = self.node(old_parent)?.children[start..=end]
            .iter()
            .copied()
            .collect();
        if let Some(anchor) = anchor {
            // a fragment cannot land inside its own region
            if region.contains(&anchor) {
                return Err(DomError::NotAChild {
                    parent,
                    reference: anchor,
                });
            }
        }
        // a fragment leaving an owner's region also leaves its member list
        let old_owner = self
            .node(fragment)?
            .claimed_parent
            .read()
            .filter(|owner| self.is_installed_fragment(*owner));
        for id in &region {
            self.raw_detach(*id);
        }
        for id in &region {
            self.raw_insert_before(parent, *id, anchor)?;
        }
        if let Some(owner) = old_owner {
            let frag = self.fragment_mut(owner)?;
            if let Some(index) = frag.members.iter().position(|m| *m == fragment) {
                frag.members.remove(index);
            }
        }
        self.fragment_mut(fragment)?.real_parent = parent;
        self.retarget_region_fragments(&region, old_parent, parent)?;
        self.node_mut(fragment)?.claimed_parent.bind(Some(parent));
        self.node_mut(parent)?.hosts_fragments = true;
        tracing::trace!(?fragment, ?parent, "moved fragment region");
        Ok(())
    }

    /// Re-home every fragment whose region rode along in a moved slice of
    /// real children. The slice physically contains the head marker of each
    /// nested fragment however deep, so one pass over it finds them all.
    fn retarget_region_fragments(
        &mut self,
        region: &[NodeId],
        old_parent: NodeId,
        new_parent: NodeId,
    ) -> Result<()> {
        for id in region {
            let owner = match self.get(*id) {
                Some(NodeData::Marker(marker)) if marker.end == MarkerEnd::Head => marker.owner,
                _ => continue,
            };
            if !self.is_installed_fragment(owner) {
                continue;
            }
            self.fragment_mut(owner)?.real_parent = new_parent;
            // a nested fragment pinned straight to the old real parent must
            // follow the move; one pinned to an owning proxy keeps its claim
            let node = self.node_mut(owner)?;
            if node.claimed_parent.is_pinned() && node.claimed_parent.read() == Some(old_parent) {
                node.claimed_parent.bind(Some(new_parent));
            }
        }
        Ok(())
    }

    fn teardown_fragment(&mut self, parent: NodeId, fragment: NodeId) -> Result<()> {
        let real_parent = self.fragment(fragment)?.real_parent();
        if parent != real_parent {
            return Err(DomError::Desynchronized { fragment });
        }
        let (start, end) = self.verify_region(fragment)?;
        let swept: Vec<NodeId> = self
            .node_mut(parent)?
            .children
            .drain(start..=end)
            .collect();
        for id in swept {
            let node = self.node_mut(id)?;
            node.parent = None;
            node.claimed_parent.follow(None);
            let is_marker = matches!(node.data, NodeData::Marker(_));
            // markers are scaffolding; nothing may keep them alive
            if is_marker {
                self.purge(id);
            }
        }
        self.release_fragment_claims(fragment)?;
        let node = self.node_mut(fragment)?;
        node.claimed_parent.release(None);
        if let Some(fragment) = node.data.as_fragment_mut() {
            fragment.status = FragmentStatus::Removed;
        }
        tracing::trace!(?fragment, "tore down fragment region");
        Ok(())
    }

    /// Clear the parent claims of every member, recursing through members
    /// that are themselves fragments so no nested marker or claim survives.
    fn release_fragment_claims(&mut self, fragment: NodeId) -> Result<()> {
        let members = self.fragment(fragment)?.members().to_vec();
        for member in members {
            if !self.contains(member) {
                continue;
            }
            self.node_mut(member)?.claimed_parent.release(None);
            if self.is_installed_fragment(member) {
                let (head, tail) = {
                    let inner = self.fragment(member)?;
                    (inner.head(), inner.tail())
                };
                self.purge(head);
                self.purge(tail);
                self.release_fragment_claims(member)?;
                self.fragment_mut(member)?.status = FragmentStatus::Removed;
            }
        }
        Ok(())
    }

    // ---- proxy path: operations scoped to a fragment's member list ----

    fn fragment_insert_before(
        &mut self,
        fragment: NodeId,
        insertee: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        self.verify_region(fragment)?;
        let (tail, real_parent) = {
            let frag = self.fragment(fragment)?;
            (frag.tail(), frag.real_parent())
        };
        let anchor = match reference {
            Some(reference) => {
                if !self.fragment(fragment)?.members().contains(&reference) {
                    return Err(DomError::NotAMember {
                        fragment,
                        reference,
                    });
                }
                // inserting a member before itself leaves the region unchanged
                if reference == insertee {
                    return Ok(());
                }
                reference
            }
            // no reference appends just inside the region's end
            None => tail,
        };
        // re-inserting an existing member moves it, keeping the member list
        // aligned with the real sibling order
        let frag = self.fragment_mut(fragment)?;
        if let Some(existing) = frag.members.iter().position(|m| *m == insertee) {
            frag.members.remove(existing);
        }
        self.insert_before(real_parent, insertee, Some(anchor))?;
        let frag = self.fragment_mut(fragment)?;
        let index = match reference {
            Some(reference) => frag
                .members
                .iter()
                .position(|m| *m == reference)
                .expect("membership verified above"),
            None => frag.members.len(),
        };
        frag.members.insert(index, insertee);
        self.node_mut(insertee)?.claimed_parent.bind(Some(fragment));
        Ok(())
    }

    fn fragment_append_child(&mut self, fragment: NodeId, appendee: NodeId) -> Result<()> {
        self.verify_region(fragment)?;
        let (tail, real_parent) = {
            let frag = self.fragment(fragment)?;
            (frag.tail(), frag.real_parent())
        };
        let frag = self.fragment_mut(fragment)?;
        if let Some(existing) = frag.members.iter().position(|m| *m == appendee) {
            frag.members.remove(existing);
        }
        self.insert_before(real_parent, appendee, Some(tail))?;
        self.fragment_mut(fragment)?.members.push(appendee);
        self.node_mut(appendee)?.claimed_parent.bind(Some(fragment));
        Ok(())
    }

    fn fragment_remove_child(&mut self, fragment: NodeId, removee: NodeId) -> Result<()> {
        self.verify_region(fragment)?;
        let real_parent = self.fragment(fragment)?.real_parent();
        let Some(index) = self
            .fragment(fragment)?
            .members()
            .iter()
            .position(|m| *m == removee)
        else {
            return Err(DomError::NotAMember {
                fragment,
                reference: removee,
            });
        };
        self.remove_child(real_parent, removee)?;
        self.fragment_mut(fragment)?.members.remove(index);
        if self.contains(removee) {
            self.node_mut(removee)?.claimed_parent.release(None);
        }
        Ok(())
    }

    // ---- consistency ----

    /// Cheap check run before every proxy operation: both markers must still
    /// sit under the fragment's real parent, head first. An external actor
    /// that mutated the region behind the proxy's back fails here instead of
    /// silently corrupting the member list.
    pub(crate) fn verify_region(&self, fragment: NodeId) -> Result<(usize, usize)> {
        let frag = self.fragment(fragment)?;
        if !frag.is_installed() {
            return Err(DomError::NotInstalled(fragment));
        }
        let start = self.position_of(frag.real_parent(), frag.head());
        let end = self.position_of(frag.real_parent(), frag.tail());
        match (start, end) {
            (Some(start), Some(end)) if start <= end => Ok((start, end)),
            _ => Err(DomError::Desynchronized { fragment }),
        }
    }

    /// Full consistency check: the real siblings strictly between the
    /// markers must equal the member list, expanded through nested regions.
    pub fn check_fragment(&self, fragment: NodeId) -> Result<()> {
        let (start, end) = self.verify_region(fragment)?;
        let frag = self.fragment(fragment)?;
        let mut expected = Vec::new();
        for member in frag.members() {
            self.region_footprint(*member, &mut expected);
        }
        let actual = &self.node(frag.real_parent())?.children[start + 1..end];
        if actual == expected.as_slice() {
            Ok(())
        } else {
            Err(DomError::Desynchronized { fragment })
        }
    }

    /// The physical nodes a member contributes to its owner's region:
    /// itself, or for a nested fragment its whole marker-delimited
    /// footprint.
    fn region_footprint(&self, member: NodeId, out: &mut Vec<NodeId>) {
        match self.get(member) {
            Some(NodeData::Fragment(frag)) if frag.is_installed() => {
                out.push(frag.head());
                for inner in frag.members() {
                    self.region_footprint(*inner, out);
                }
                out.push(frag.tail());
            }
            _ => out.push(member),
        }
    }
}
