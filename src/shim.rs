//! Property spoofing for nodes that must lie about where they sit in the
//! tree.
//!
//! A fragment's members physically live under the fragment's real ancestor,
//! but must report the fragment as their parent; the fragment itself reports
//! a parent and next sibling it does not physically have. These slots back
//! the reported values: a `Stored` slot is ordinary storage that tracks the
//! physical tree, a `Pinned` slot spoofs a constant, and a [`Computed`]
//! strategy recomputes the value on every read. External writes to a pinned
//! slot are rejected with a warning and have no effect.

use crate::real_dom::NodeId;

/// The slot backing a node's reported parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParentClaim {
    /// Ordinary mutable storage, kept in sync with the physical tree.
    Stored(Option<NodeId>),
    /// A spoofed constant claim. Physical moves and external writes do not
    /// touch it until it is released.
    Pinned(Option<NodeId>),
}

impl ParentClaim {
    pub fn read(&self) -> Option<NodeId> {
        match self {
            Self::Stored(value) | Self::Pinned(value) => *value,
        }
    }

    /// An external write attempt. Rejected non-fatally when pinned.
    pub fn write(&mut self, value: Option<NodeId>) -> bool {
        match self {
            Self::Stored(slot) => {
                *slot = value;
                true
            }
            Self::Pinned(current) => {
                tracing::warn!(
                    ?value,
                    ?current,
                    "rejected write to a pinned parent property"
                );
                false
            }
        }
    }

    /// Track a physical re-parenting. A pinned claim shadows the physical
    /// link, so it is left untouched.
    pub fn follow(&mut self, physical: Option<NodeId>) {
        if let Self::Stored(slot) = self {
            *slot = physical;
        }
    }

    /// Replace the slot with a spoofed constant.
    pub fn bind(&mut self, value: Option<NodeId>) {
        *self = Self::Pinned(value);
    }

    /// Restore ordinary mutable storage, initialized to `default`.
    pub fn release(&mut self, default: Option<NodeId>) {
        *self = Self::Stored(default);
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Pinned(_))
    }
}

/// A reported property recomputed against the live tree on every read,
/// never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Computed {
    /// The current next sibling of the given node. Bound on a fragment with
    /// its tail marker so the fragment's reported next sibling is whatever
    /// follows its region right now.
    NextSiblingOf(NodeId),
}
