//! Errors returned by the fallible operations of this crate.
//!
//! Not finding a value is never an error: searches return `Option`s. Errors are reserved for
//! misuse that a caller can detect and recover from, like building a tree out of nothing or
//! handing a tree a `NodeId` it doesn't own anymore.

use crate::mutable::NodeId;

/// Errors produced by the [`mutable`][crate::mutable] tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A tree was built from an empty sequence. A tree always starts with a root.
    #[error("cannot build a tree from an empty sequence of values")]
    EmptyInput,
    /// The handle doesn't address a live node in this tree. Either the node was removed or the
    /// handle came from somewhere else.
    #[error("{0:?} does not refer to a node in this tree")]
    InvalidNode(NodeId),
}
