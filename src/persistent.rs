//! A persistent BST. This is modeled after a BST one would see in a functional language like
//! Haskell. `insert` doesn't modify the tree; it returns a new tree that shares every subtree
//! the insertion didn't touch with the original.
//!
//! Like the [`mutable`][crate::mutable] tree, duplicates are kept (they go to the right) and
//! nothing is rebalanced.
//!
//! # Examples
//!
//! ```
//! use arbor::persistent::Tree;
//!
//! let tree = Tree::new();
//! assert!(!tree.contains(&1));
//!
//! // This `insert` returns a new tree!
//! let new_tree = tree.insert(1);
//! let newer_tree = new_tree.insert(0);
//!
//! // All history is preserved.
//! assert_eq!(newer_tree.count(), 2);
//! assert_eq!(new_tree.count(), 1);
//! assert_eq!(tree.count(), 0);
//!
//! assert_eq!(newer_tree.to_string(), "(0) <- 1");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// An immutable Binary Search Tree. Values and subtrees are reference counted so new versions of
/// a tree can point at the parts of old versions they have in common.
///
/// Nothing here recurses, so a tree that degenerates into a long chain is as safe to build,
/// compare, print and drop as a balanced one.
pub enum Tree<T> {
    /// The tree with nothing in it. Also marks a missing child of a [`Node`][Tree::Node].
    Empty,
    /// A single value without children.
    Leaf(Rc<T>),
    /// A value with a left and a right subtree. At least one of them is not
    /// [`Empty`][Tree::Empty].
    Node(Rc<Tree<T>>, Rc<T>, Rc<Tree<T>>),
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Manual implementation of `Clone` so we don't clone values when `T` is `Clone`. Cloning a tree
/// only bumps reference counts.
impl<T> Clone for Tree<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Leaf(value) => Self::Leaf(Rc::clone(value)),
            Self::Node(left, value, right) => {
                Self::Node(Rc::clone(left), Rc::clone(value), Rc::clone(right))
            }
        }
    }
}

impl<T> Tree<T> {
    /// Generates a new, empty `Tree`.
    pub fn new() -> Self {
        Self::Empty
    }

    /// Returns a new tree that also contains `value`. Only the nodes on the path from the root to
    /// the new value are rebuilt; every other subtree is shared with `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use arbor::persistent::Tree;
    ///
    /// let tree = Tree::new().insert(2).insert(1);
    /// let new_tree = tree.insert(3);
    ///
    /// assert_eq!(new_tree.to_string(), "(1) <- 2 (3) <-");
    /// assert_eq!(tree.to_string(), "(1) <- 2");
    /// ```
    pub fn insert(&self, value: T) -> Self
    where
        T: Ord,
    {
        // The nodes passed on the way down and which side we took at each.
        let mut path = Vec::new();
        let mut tree = self;
        let mut rebuilt = loop {
            match tree {
                Self::Empty => break Self::Leaf(Rc::new(value)),
                Self::Leaf(existing) => {
                    let goes_left = value < **existing;
                    let new_leaf = Rc::new(Self::Leaf(Rc::new(value)));
                    let empty = Rc::new(Self::Empty);
                    break if goes_left {
                        Self::Node(new_leaf, Rc::clone(existing), empty)
                    } else {
                        Self::Node(empty, Rc::clone(existing), new_leaf)
                    };
                }
                Self::Node(left, existing, right) => {
                    let goes_left = value < **existing;
                    path.push((left, existing, right, goes_left));
                    tree = if goes_left { &**left } else { &**right };
                }
            }
        };

        for (left, existing, right, went_left) in path.into_iter().rev() {
            rebuilt = if went_left {
                Self::Node(Rc::new(rebuilt), Rc::clone(existing), Rc::clone(right))
            } else {
                Self::Node(Rc::clone(left), Rc::clone(existing), Rc::new(rebuilt))
            };
        }
        rebuilt
    }

    /// Finds the subtree closest to the root whose value equals `x`. The returned tree is part of
    /// `self`, not a copy.
    pub fn search(&self, x: &T) -> Option<&Self>
    where
        T: Ord,
    {
        let mut tree = self;
        loop {
            match tree {
                Self::Empty => return None,
                Self::Leaf(value) => return (**value == *x).then_some(tree),
                Self::Node(left, value, right) => {
                    tree = match x.cmp(&**value) {
                        Ordering::Less => &**left,
                        Ordering::Equal => return Some(tree),
                        Ordering::Greater => &**right,
                    }
                }
            }
        }
    }

    /// Whether any value in the tree equals `x`.
    pub fn contains(&self, x: &T) -> bool
    where
        T: Ord,
    {
        self.search(x).is_some()
    }

    /// The number of values in the tree. This visits every node.
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(tree) = pending.pop() {
            match tree {
                Self::Empty => {}
                Self::Leaf(_) => count += 1,
                Self::Node(left, _, right) => {
                    count += 1;
                    pending.push(&**left);
                    pending.push(&**right);
                }
            }
        }
        count
    }

    /// The number of edges between the root and the deepest value: 0 for a single value, -1 for
    /// an empty tree. This visits every node.
    pub fn height(&self) -> isize {
        let mut height = -1;
        let mut pending = vec![(self, 0)];
        while let Some((tree, depth)) = pending.pop() {
            match tree {
                Self::Empty => {}
                Self::Leaf(_) => height = height.max(depth),
                Self::Node(left, _, right) => {
                    height = height.max(depth);
                    pending.push((&**left, depth + 1));
                    pending.push((&**right, depth + 1));
                }
            }
        }
        height
    }

    /// Whether the tree holds no values.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The value at the root of this tree.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Empty => None,
            Self::Leaf(value) | Self::Node(_, value, _) => Some(&**value),
        }
    }

    /// The left subtree. Only a [`Node`][Tree::Node] has one.
    pub fn left(&self) -> Option<&Self> {
        match self {
            Self::Node(left, _, _) => Some(&**left),
            _ => None,
        }
    }

    /// The right subtree. Only a [`Node`][Tree::Node] has one.
    pub fn right(&self) -> Option<&Self> {
        match self {
            Self::Node(_, _, right) => Some(&**right),
            _ => None,
        }
    }

    /// The leftmost subtree holding a value. Follows left edges until they run out and returns
    /// either the [`Leaf`][Tree::Leaf] it ends on or the last [`Node`][Tree::Node] whose left side
    /// is empty. An empty tree returns itself.
    pub fn minimum(&self) -> &Self {
        let mut tree = self;
        let mut previous = self;
        while let Self::Node(next, _, _) = tree {
            previous = tree;
            tree = &**next;
        }
        match tree {
            Self::Leaf(_) => tree,
            _ => previous,
        }
    }

    /// The rightmost subtree holding a value. The mirror image of [`minimum`][Tree::minimum].
    pub fn maximum(&self) -> &Self {
        let mut tree = self;
        let mut previous = self;
        while let Self::Node(_, _, next) = tree {
            previous = tree;
            tree = &**next;
        }
        match tree {
            Self::Leaf(_) => tree,
            _ => previous,
        }
    }

    /// The smallest value in the tree.
    pub fn min_value(&self) -> Option<&T> {
        self.minimum().value()
    }

    /// The largest value in the tree. With duplicates, this is the rightmost one.
    pub fn max_value(&self) -> Option<&T> {
        self.maximum().value()
    }

    /// Iterates over the values in sorted order.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(self);
        iter
    }
}

impl<T: Ord> FromIterator<T> for Tree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(values: I) -> Self {
        values
            .into_iter()
            .fold(Self::new(), |tree, value| tree.insert(value))
    }
}

impl<T: PartialEq> PartialEq for Tree<T> {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Self::Empty, Self::Empty) => {}
                (Self::Leaf(value), Self::Leaf(other_value)) if value == other_value => {}
                (Self::Node(left, value, right), Self::Node(other_left, other_value, other_right))
                    if value == other_value =>
                {
                    pending.push((&**left, &**other_left));
                    pending.push((&**right, &**other_right));
                }
                _ => return false,
            }
        }
        true
    }
}

impl<T: Eq> Eq for Tree<T> {}

enum Piece<'a, T> {
    Tree(&'a Tree<T>),
    Value(&'a T),
    Text(&'static str),
}

impl<T> Tree<T> {
    /// Writes `(<left>) <- <value> (<right>) <-`, leaving out empty sides.
    fn render(
        &self,
        f: &mut fmt::Formatter<'_>,
        write_value: fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
    ) -> fmt::Result {
        let mut pending = vec![Piece::Tree(self)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Value(value) => write_value(value, f)?,
                Piece::Tree(Self::Empty) => {}
                Piece::Tree(Self::Leaf(value)) => write_value(&**value, f)?,
                Piece::Tree(Self::Node(left, value, right)) => {
                    if !right.is_empty() {
                        pending.extend([
                            Piece::Text(") <-"),
                            Piece::Tree(&**right),
                            Piece::Text(" ("),
                        ]);
                    }
                    pending.push(Piece::Value(&**value));
                    if !left.is_empty() {
                        pending.extend([
                            Piece::Text(") <- "),
                            Piece::Tree(&**left),
                            Piece::Text("("),
                        ]);
                    }
                }
            }
        }
        Ok(())
    }
}

impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, <T as fmt::Display>::fmt)
    }
}

/// Same layout as `Display` with values in their `Debug` form.
impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, <T as fmt::Debug>::fmt)
    }
}

/// Dropping a subtree the usual way drops its children first, one stack frame per level. This
/// takes uniquely owned children out of their parents and drops them one at a time instead.
/// Shared children only lose a reference.
impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        let Self::Node(left, _, right) = self else {
            return;
        };
        if left.is_empty() && right.is_empty() {
            return;
        }

        let empty = Rc::new(Self::Empty);
        let mut pending = vec![
            mem::replace(left, Rc::clone(&empty)),
            mem::replace(right, Rc::clone(&empty)),
        ];
        while let Some(tree) = pending.pop() {
            if let Ok(mut tree) = Rc::try_unwrap(tree) {
                if let Self::Node(left, _, right) = &mut tree {
                    pending.push(mem::replace(left, Rc::clone(&empty)));
                    pending.push(mem::replace(right, Rc::clone(&empty)));
                }
            }
        }
    }
}

/// Sorted iterator over a [`Tree`]. See [`Tree::iter`].
pub struct Iter<'a, T> {
    /// Subtrees whose values haven't been yielded yet. Their left sides already have been.
    stack: Vec<&'a Tree<T>>,
}

impl<'a, T> Iter<'a, T> {
    fn push_left_spine(&mut self, mut tree: &'a Tree<T>) {
        loop {
            match tree {
                Tree::Empty => return,
                Tree::Leaf(_) => {
                    self.stack.push(tree);
                    return;
                }
                Tree::Node(left, _, _) => {
                    self.stack.push(tree);
                    tree = &**left;
                }
            }
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stack.pop()? {
            Tree::Empty => None,
            Tree::Leaf(value) => Some(&**value),
            Tree::Node(_, value, right) => {
                self.push_left_spine(right);
                Some(&**value)
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
