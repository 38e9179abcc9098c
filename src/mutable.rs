//! A mutable BST whose nodes know their parents. Nodes are stored in a flat table owned by the
//! [`Tree`] and addressed by [`NodeId`] handles, so parent links are plain indices rather than
//! owning pointers. Operations that the textbook version calls "on a node" take that node's
//! `NodeId` instead.
//!
//! This tree keeps duplicates: inserting a value equal to one already in the tree adds another
//! node in the right subtree of the existing one. It never rebalances.
//!
//! # Examples
//!
//! ```
//! use arbor::mutable::Tree;
//!
//! let mut tree = Tree::from_values([5, 2, 8, 1, 3]).unwrap();
//! assert_eq!(tree.to_string(), "((1) <- 2 (3) <-) <- 5 (8) <-");
//!
//! // Nodes are addressed by handle.
//! let two = tree.search(&2).unwrap();
//! assert_eq!(tree.depth(two), Ok(1));
//!
//! // Removing a node splices its successor into its place.
//! let removed = tree.remove(two).unwrap();
//! assert_eq!(removed.value, 2);
//! assert_eq!(tree.value(removed.replacement.unwrap()), Ok(&3));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 3, 5, 8]);
//! ```

use std::cmp::Ordering;
use std::fmt;

use tracing::trace;

use crate::error::TreeError;

/// A handle to a node in a [`Tree`]. Handles stay valid until the node they point at is removed.
/// Using a handle after that is reported as [`TreeError::InvalidNode`], even if the tree has since
/// reused the storage for another node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

type Link = Option<NodeId>;

#[derive(Clone)]
struct Node<T> {
    value: T,
    left: Link,
    right: Link,
    /// Only used for navigation. A node is owned by the `left` or `right` link of its parent.
    parent: Link,
}

impl<T> Node<T> {
    fn new(value: T, parent: Link) -> Self {
        Self {
            value,
            left: None,
            right: None,
            parent,
        }
    }
}

#[derive(Clone)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// What is left over after [`Tree::remove`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Removed<T> {
    /// The value of the removed node.
    pub value: T,
    /// The node now sitting where the removed node was, if the removed node had any descendants.
    pub replacement: Option<NodeId>,
}

/// A Binary Search Tree with parent links that is modified in place.
#[derive(Clone)]
pub struct Tree<T> {
    slots: Vec<Slot<T>>,
    /// Indices of vacant slots, reused before the table grows.
    free: Vec<usize>,
    root: Link,
    len: usize,
}

impl<T> Tree<T> {
    /// Creates a tree holding a single value at its root.
    pub fn new(value: T) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        };
        tree.root = Some(tree.allocate(Node::new(value, None)));
        tree
    }

    /// Builds a tree by inserting each value in turn. The first value becomes the root.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyInput`] if `values` yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use arbor::{error::TreeError, mutable::Tree};
    ///
    /// let tree = Tree::from_values([2, 1, 3]).unwrap();
    /// assert_eq!(tree.len(), 3);
    ///
    /// assert_eq!(Tree::<i32>::from_values([]).unwrap_err(), TreeError::EmptyInput);
    /// ```
    pub fn from_values<I>(values: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = T>,
        T: Ord,
    {
        let mut values = values.into_iter();
        let first = values.next().ok_or(TreeError::EmptyInput)?;
        let mut tree = Self::new(first);
        for value in values {
            tree.insert(value);
        }
        trace!(len = tree.len, "built tree from values");
        Ok(tree)
    }

    /// The root of the tree. `None` once every node has been removed.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether every node has been removed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `value` below the root and returns the new node. Values less than a node's value
    /// go left, everything else (including equal values) goes right. Inserting into an empty tree
    /// makes `value` the root.
    pub fn insert(&mut self, value: T) -> NodeId
    where
        T: Ord,
    {
        let Some(mut current) = self.root else {
            let id = self.allocate(Node::new(value, None));
            self.root = Some(id);
            return id;
        };

        loop {
            let node = self.linked(current);
            let go_left = value < node.value;
            match if go_left { node.left } else { node.right } {
                Some(next) => current = next,
                None => {
                    let id = self.allocate(Node::new(value, Some(current)));
                    let parent = self.linked_mut(current);
                    if go_left {
                        parent.left = Some(id);
                    } else {
                        parent.right = Some(id);
                    }
                    return id;
                }
            }
        }
    }

    /// Finds the node closest to the root holding a value equal to `value`.
    pub fn search(&self, value: &T) -> Option<NodeId>
    where
        T: Ord,
    {
        self.descend(self.root, value)
    }

    /// Like [`search`][Tree::search] but only looks in the subtree rooted at `id`.
    pub fn search_from(&self, id: NodeId, value: &T) -> Result<Option<NodeId>, TreeError>
    where
        T: Ord,
    {
        self.node(id)?;
        Ok(self.descend(Some(id), value))
    }

    /// Whether any node holds a value equal to `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: Ord,
    {
        self.search(value).is_some()
    }

    /// The value stored at `id`.
    pub fn value(&self, id: NodeId) -> Result<&T, TreeError> {
        self.node(id).map(|node| &node.value)
    }

    /// The parent of `id`, `None` for the root.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, TreeError> {
        self.node(id).map(|node| node.parent)
    }

    /// The left child of `id`.
    pub fn left(&self, id: NodeId) -> Result<Option<NodeId>, TreeError> {
        self.node(id).map(|node| node.left)
    }

    /// The right child of `id`.
    pub fn right(&self, id: NodeId) -> Result<Option<NodeId>, TreeError> {
        self.node(id).map(|node| node.right)
    }

    /// Whether `id` has no parent.
    pub fn is_root(&self, id: NodeId) -> Result<bool, TreeError> {
        self.node(id).map(|node| node.parent.is_none())
    }

    /// Whether `id` has no children.
    pub fn is_leaf(&self, id: NodeId) -> Result<bool, TreeError> {
        self.node(id).map(|node| node.left.is_none() && node.right.is_none())
    }

    /// Whether `id` is the left child of its parent.
    pub fn is_left_child(&self, id: NodeId) -> Result<bool, TreeError> {
        let node = self.node(id)?;
        Ok(node
            .parent
            .is_some_and(|parent| self.linked(parent).left == Some(id)))
    }

    /// Whether `id` is the right child of its parent.
    pub fn is_right_child(&self, id: NodeId) -> Result<bool, TreeError> {
        let node = self.node(id)?;
        Ok(node
            .parent
            .is_some_and(|parent| self.linked(parent).right == Some(id)))
    }

    /// Whether `id` has a left child.
    pub fn has_left_child(&self, id: NodeId) -> Result<bool, TreeError> {
        self.left(id).map(|left| left.is_some())
    }

    /// Whether `id` has a right child.
    pub fn has_right_child(&self, id: NodeId) -> Result<bool, TreeError> {
        self.right(id).map(|right| right.is_some())
    }

    /// Whether `id` has at least one child.
    pub fn has_any_child(&self, id: NodeId) -> Result<bool, TreeError> {
        self.is_leaf(id).map(|leaf| !leaf)
    }

    /// Whether `id` has two children.
    pub fn has_both_children(&self, id: NodeId) -> Result<bool, TreeError> {
        self.node(id).map(|node| node.left.is_some() && node.right.is_some())
    }

    /// The leftmost node of the subtree rooted at `id`.
    pub fn minimum(&self, id: NodeId) -> Result<NodeId, TreeError> {
        self.node(id)?;
        Ok(self.leftmost(id))
    }

    /// The rightmost node of the subtree rooted at `id`.
    pub fn maximum(&self, id: NodeId) -> Result<NodeId, TreeError> {
        self.node(id)?;
        Ok(self.rightmost(id))
    }

    /// The smallest value in the tree.
    pub fn min(&self) -> Option<&T> {
        self.root.map(|root| &self.linked(self.leftmost(root)).value)
    }

    /// The largest value in the tree. With duplicates, this is the rightmost one.
    pub fn max(&self) -> Option<&T> {
        self.root.map(|root| &self.linked(self.rightmost(root)).value)
    }

    /// How many edges separate `id` from the root. The root has a depth of 0.
    pub fn depth(&self, id: NodeId) -> Result<usize, TreeError> {
        let mut node = self.node(id)?;
        let mut edges = 0;
        while let Some(parent) = node.parent {
            node = self.linked(parent);
            edges += 1;
        }
        Ok(edges)
    }

    /// How many edges separate `id` from its deepest descendant. A leaf has a height of 0.
    pub fn height(&self, id: NodeId) -> Result<usize, TreeError> {
        self.node(id)?;
        Ok(self.subtree_height(id))
    }

    /// The number of nodes in the subtree rooted at `id`, `id` included.
    pub fn count(&self, id: NodeId) -> Result<usize, TreeError> {
        self.node(id)?;
        Ok(self.subtree_count(id))
    }

    /// Removes `id` from the tree and returns its value along with the node that took its place.
    ///
    /// The replacement is the smallest node of the right subtree if there is one, otherwise the
    /// largest node of the left subtree. It is first removed from its own position the same way,
    /// then adopts both of `id`'s children and `id`'s slot in its parent. Removing the root
    /// makes the replacement the new root.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidNode`] if `id` isn't in this tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use arbor::mutable::Tree;
    ///
    /// let mut tree = Tree::from_values([2, 1, 3]).unwrap();
    /// let root = tree.root().unwrap();
    ///
    /// let removed = tree.remove(root).unwrap();
    /// assert_eq!(removed.value, 2);
    /// assert_eq!(tree.root(), removed.replacement);
    /// assert_eq!(tree.to_string(), "(1) <- 3");
    ///
    /// // The handle is dead now.
    /// assert!(tree.value(root).is_err());
    /// ```
    pub fn remove(&mut self, id: NodeId) -> Result<Removed<T>, TreeError> {
        self.node(id)?;
        let replacement = self.splice_out(id);
        let node = self.release(id);
        trace!(?id, ?replacement, len = self.len, "removed node");
        Ok(Removed {
            value: node.value,
            replacement,
        })
    }

    /// Visits the subtree rooted at `id` in sorted order: left subtree, node, right subtree.
    pub fn traverse_in_order<F>(&self, id: NodeId, mut visit: F) -> Result<(), TreeError>
    where
        F: FnMut(&T),
    {
        self.node(id)?;
        self.in_order(id, &mut visit);
        Ok(())
    }

    /// Visits the subtree rooted at `id`: node, left subtree, right subtree.
    pub fn traverse_pre_order<F>(&self, id: NodeId, mut visit: F) -> Result<(), TreeError>
    where
        F: FnMut(&T),
    {
        self.node(id)?;
        self.pre_order(id, &mut visit);
        Ok(())
    }

    /// Visits the subtree rooted at `id`: left subtree, right subtree, node.
    pub fn traverse_post_order<F>(&self, id: NodeId, mut visit: F) -> Result<(), TreeError>
    where
        F: FnMut(&T),
    {
        self.node(id)?;
        self.post_order(id, &mut visit);
        Ok(())
    }

    /// Applies `formula` to every value of the subtree rooted at `id`, in sorted order, and
    /// collects the results. The result is flat, not tree shaped.
    pub fn map<U, F>(&self, id: NodeId, mut formula: F) -> Result<Vec<U>, TreeError>
    where
        F: FnMut(&T) -> U,
    {
        let mut mapped = Vec::new();
        self.traverse_in_order(id, |value| mapped.push(formula(value)))?;
        Ok(mapped)
    }

    /// Iterates over every value in the tree in sorted order.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// A view of the subtree rooted at `id`, for display and comparison.
    pub fn subtree(&self, id: NodeId) -> Result<Subtree<'_, T>, TreeError> {
        self.node(id)?;
        Ok(Subtree { tree: self, id })
    }

    fn node(&self, id: NodeId) -> Result<&Node<T>, TreeError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(TreeError::InvalidNode(id))
    }

    /// Follows a link. Links only ever point at live nodes.
    fn linked(&self, id: NodeId) -> &Node<T> {
        self.slots[id.index]
            .node
            .as_ref()
            .expect("Links point at live nodes")
    }

    fn linked_mut(&mut self, id: NodeId) -> &mut Node<T> {
        self.slots[id.index]
            .node
            .as_mut()
            .expect("Links point at live nodes")
    }

    fn allocate(&mut self, node: Node<T>) -> NodeId {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    /// Frees the slot of a node that has already been unlinked from the tree. A slot whose
    /// generation has run out is never handed out again.
    fn release(&mut self, id: NodeId) -> Node<T> {
        let slot = &mut self.slots[id.index];
        let node = slot.node.take().expect("Released nodes are live");
        if let Some(generation) = slot.generation.checked_add(1) {
            slot.generation = generation;
            self.free.push(id.index);
        } else {
            trace!(index = id.index, "retired slot");
        }
        self.len -= 1;
        node
    }

    fn descend(&self, mut link: Link, value: &T) -> Option<NodeId>
    where
        T: Ord,
    {
        while let Some(id) = link {
            let node = self.linked(id);
            link = match value.cmp(&node.value) {
                Ordering::Less => node.left,
                Ordering::Equal => return Some(id),
                Ordering::Greater => node.right,
            };
        }
        None
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.linked(id).left {
            id = left;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.linked(id).right {
            id = right;
        }
        id
    }

    fn subtree_height(&self, id: NodeId) -> usize {
        let mut height = 0;
        let mut pending = vec![(id, 0)];
        while let Some((id, depth)) = pending.pop() {
            height = height.max(depth);
            let node = self.linked(id);
            pending.extend(
                [node.left, node.right]
                    .into_iter()
                    .flatten()
                    .map(|child| (child, depth + 1)),
            );
        }
        height
    }

    fn subtree_count(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            count += 1;
            let node = self.linked(id);
            pending.extend(node.left.into_iter().chain(node.right));
        }
        count
    }

    /// The node that takes `id`'s place when `id` is removed.
    fn replacement(&self, id: NodeId) -> Link {
        let node = self.linked(id);
        match (node.left, node.right) {
            (_, Some(right)) => Some(self.leftmost(right)),
            (Some(left), None) => Some(self.rightmost(left)),
            (None, None) => None,
        }
    }

    /// Unlinks `id` from the tree, moving its replacement into its position. Leaves `id` with no
    /// links at all but doesn't free it.
    ///
    /// The replacement has to leave its own position first, which needs its own replacement, and
    /// so on. Each one is the leftmost node of a subtree (no left child) or the rightmost one (no
    /// right child) so the chain only goes deeper and ends at a leaf. It is moved up from the
    /// bottom.
    fn splice_out(&mut self, id: NodeId) -> Link {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(next) = self.replacement(current) {
            chain.push(next);
            current = next;
        }
        trace!(?id, steps = chain.len(), "splicing");

        let replacement = chain.get(1).copied();
        let mut below = None;
        for current in chain.into_iter().rev() {
            self.move_into(current, below);
            below = Some(current);
        }
        replacement
    }

    /// Puts `replacement`, already unlinked, where `id` is and unlinks `id`.
    fn move_into(&mut self, id: NodeId, replacement: Link) {
        // Unlinking the replacement may have rewired our children so read them now.
        let node = self.linked(id);
        let (parent, left, right) = (node.parent, node.left, node.right);

        if let Some(replacement) = replacement {
            let adopter = self.linked_mut(replacement);
            adopter.left = left;
            adopter.right = right;
            adopter.parent = parent;
        }
        for child in [left, right].into_iter().flatten() {
            self.linked_mut(child).parent = replacement;
        }

        match parent {
            Some(parent) => {
                let parent = self.linked_mut(parent);
                if parent.left == Some(id) {
                    parent.left = replacement;
                } else {
                    parent.right = replacement;
                }
            }
            None => self.root = replacement,
        }

        let node = self.linked_mut(id);
        node.parent = None;
        node.left = None;
        node.right = None;
    }

    fn in_order<F: FnMut(&T)>(&self, id: NodeId, visit: &mut F) {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
        };
        iter.push_left_spine(Some(id));
        iter.for_each(visit);
    }

    fn pre_order<F: FnMut(&T)>(&self, id: NodeId, visit: &mut F) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let node = self.linked(id);
            visit(&node.value);
            pending.extend(node.right.into_iter().chain(node.left));
        }
    }

    /// Node, right, left is post-order backwards.
    fn post_order<F: FnMut(&T)>(&self, id: NodeId, visit: &mut F) {
        let mut reversed = Vec::new();
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let node = self.linked(id);
            reversed.push(&node.value);
            pending.extend(node.left.into_iter().chain(node.right));
        }
        reversed.into_iter().rev().for_each(visit);
    }

    /// Structural equality between a subtree of `self` and a subtree of `other`.
    fn same_shape(&self, link: Link, other: &Self, other_link: Link) -> bool
    where
        T: PartialEq,
    {
        let mut pending = vec![(link, other_link)];
        while let Some(pair) = pending.pop() {
            match pair {
                (None, None) => {}
                (Some(id), Some(other_id)) => {
                    let (node, other_node) = (self.linked(id), other.linked(other_id));
                    if node.value != other_node.value {
                        return false;
                    }
                    pending.push((node.left, other_node.left));
                    pending.push((node.right, other_node.right));
                }
                _ => return false,
            }
        }
        true
    }
}

/// Two trees are equal when they have the same shape and equal values at every position. Where
/// the nodes happen to be stored doesn't matter.
impl<T: PartialEq> PartialEq for Tree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.same_shape(self.root, other, other.root)
    }
}

impl<T: Eq> Eq for Tree<T> {}

impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(id) => fmt::Display::fmt(&Subtree { tree: self, id }, f),
            None => Ok(()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.len)
            .field("root", &self.root.map(|id| Subtree { tree: self, id }))
            .finish()
    }
}

enum Piece {
    Subtree(NodeId),
    Value(NodeId),
    Text(&'static str),
}

/// A borrowed view of the subtree rooted at some node. See [`Tree::subtree`].
pub struct Subtree<'a, T> {
    tree: &'a Tree<T>,
    id: NodeId,
}

impl<'a, T> Subtree<'a, T> {
    /// The root of this subtree.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The value at the root of this subtree.
    pub fn value(&self) -> &'a T {
        &self.tree.linked(self.id).value
    }

    /// Writes `(<left>) <- <value> (<right>) <-`, leaving out missing sides. Works through an
    /// explicit stack of pieces still to write.
    fn render(
        &self,
        f: &mut fmt::Formatter<'_>,
        write_value: fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
    ) -> fmt::Result {
        let mut pending = vec![Piece::Subtree(self.id)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Value(id) => write_value(&self.tree.linked(id).value, f)?,
                Piece::Subtree(id) => {
                    let node = self.tree.linked(id);
                    if let Some(right) = node.right {
                        pending.extend([
                            Piece::Text(") <-"),
                            Piece::Subtree(right),
                            Piece::Text(" ("),
                        ]);
                    }
                    pending.push(Piece::Value(id));
                    if let Some(left) = node.left {
                        pending.extend([
                            Piece::Text(") <- "),
                            Piece::Subtree(left),
                            Piece::Text("("),
                        ]);
                    }
                }
            }
        }
        Ok(())
    }
}

impl<T: PartialEq> PartialEq for Subtree<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.tree
            .same_shape(Some(self.id), other.tree, Some(other.id))
    }
}

impl<T: fmt::Display> fmt::Display for Subtree<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, <T as fmt::Display>::fmt)
    }
}

/// Same layout as `Display` with values in their `Debug` form.
impl<T: fmt::Debug> fmt::Debug for Subtree<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, <T as fmt::Debug>::fmt)
    }
}

/// Sorted iterator over a [`Tree`]. See [`Tree::iter`].
pub struct Iter<'a, T> {
    tree: &'a Tree<T>,
    /// Nodes whose left subtrees have been pushed but which haven't been yielded yet.
    stack: Vec<NodeId>,
}

impl<'a, T> Iter<'a, T> {
    fn push_left_spine(&mut self, mut link: Link) {
        while let Some(id) = link {
            self.stack.push(id);
            link = self.tree.linked(id).left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let node = tree.linked(self.stack.pop()?);
        self.push_left_spine(node.right);
        Some(&node.value)
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
