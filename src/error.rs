//! Errors surfaced by the DOM mutation API.

use crate::real_dom::NodeId;
use thiserror::Error;

pub type Result<T, E = DomError> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} does not exist in the tree")]
    NodeNotFound(NodeId),

    #[error("node {0:?} is detached from the tree")]
    Detached(NodeId),

    #[error("node {0:?} is not a fragment placeholder")]
    NotAPlaceholder(NodeId),

    #[error("node {0:?} is not a fragment")]
    NotAFragment(NodeId),

    #[error("fragment {0:?} is not installed")]
    NotInstalled(NodeId),

    #[error("node {reference:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, reference: NodeId },

    #[error("node {reference:?} is not a member of fragment {fragment:?}")]
    NotAMember { fragment: NodeId, reference: NodeId },

    #[error("the markers of fragment {fragment:?} are out of sync with the real tree")]
    Desynchronized { fragment: NodeId },

    #[error("the tree root cannot be moved or removed")]
    CannotMutateRoot,
}
