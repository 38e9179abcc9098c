//! This crate exposes ordered containers meant to be used as building blocks: backing stores for
//! schedulers, symbol tables, event queues and the like.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to insert, find, and delete
//! stored values. BSTs are typically defined recursively using the notion of a `Node`. A `Node`
//! stores a value and will sometimes have child `Node`s. The trees in this crate keep duplicate
//! values, so their invariants are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a value less than its
//!    own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a value greater than
//!    or equal to its own value.
//!
//! Searching takes `O(height)`. Neither tree rebalances itself, so inserting sorted input gives a
//! tree as tall as it has values. BSTs naturally support sorted iteration by visiting the left
//! subtree, then the subtree root, then the right subtree.
//!
//! - [`mutable`] is modified in place and every node knows its parent.
//! - [`persistent`] never changes; inserting returns a new tree sharing structure with the old.
//!
//! ## Binary Heap
//!
//! [`heap`] is a priority queue: a complete binary tree stored in an array where no element
//! outranks its parent, so the highest priority element is always at the front.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod error;
pub mod heap;
pub mod mutable;
pub mod persistent;
