//! Virtual fragment nodes for a mutable ordered tree.
//!
//! A fragment is a grouping node that behaves, to every collaborator, like
//! an ordinary node, even though the underlying tree only supports
//! single-rooted subtrees. Mounting one splices its children plus two
//! invisible boundary markers into the real parent in place of a disposable
//! placeholder; from then on the mutation API redirects any insert or
//! remove that references the fragment into or around its marker-delimited
//! region, and the fragment spoofs its own parent and next sibling so
//! upstream code cannot tell it from a real node.
//!
//! ```
//! use fragment_dom::{ElementNode, RealDom};
//!
//! let mut dom = RealDom::new(ElementNode::new("body"));
//! let root = dom.root();
//! let heading = dom.create_element("h1");
//! dom.append_child(root, heading).unwrap();
//!
//! // a placeholder groups several children without a wrapper element
//! let placeholder = dom.create_placeholder(Some("list"));
//! dom.append_child(root, placeholder).unwrap();
//! let first = dom.create_text("first");
//! let second = dom.create_text("second");
//! dom.append_child(placeholder, first).unwrap();
//! dom.append_child(placeholder, second).unwrap();
//!
//! // mounting splices the children into the body between two markers
//! let fragment = dom.mount_fragment(placeholder).unwrap();
//! assert_eq!(dom.parent_id(fragment), Some(root));
//! assert_eq!(dom.parent_id(first), Some(fragment));
//! assert_eq!(dom.child_ids(fragment).unwrap(), &[first, second]);
//!
//! // the fragment is a valid argument anywhere a real node is expected
//! let divider = dom.create_element("hr");
//! dom.insert_before(root, divider, Some(fragment)).unwrap();
//! dom.remove_child(root, fragment).unwrap();
//! assert_eq!(dom.parent_id(first), None);
//! ```
//!
//! Execution is single threaded and synchronous; every operation
//! establishes its invariants before returning. Mutating a fragment's
//! region without going through the tree is detected by the next proxy
//! operation (or [`RealDom::check_fragment`]) as a
//! [`DomError::Desynchronized`] failure rather than silent corruption.

pub mod error;
mod fragment;
mod mutations;
pub mod node;
pub mod real_dom;
mod shim;

pub use error::{DomError, Result};
pub use node::{
    ElementNode, FragmentNode, FragmentStatus, MarkerEnd, MarkerNode, NodeData,
    TextNode, FRAGMENT_STUB_ATTRIBUTE,
};
pub use real_dom::{NodeId, RealDom};
