//! An array backed binary heap for use as a priority queue.
//!
//! The heap is generic over what "higher priority" means. [`HeapOrder`] covers the usual
//! largest-first and smallest-first cases for `Ord` values and any `Fn(&T, &T) -> bool` closure
//! can be used instead when the priority isn't the natural order of `T`.
//!
//! # Examples
//!
//! ```
//! use arbor::heap::{HeapOrder, PriorityHeap};
//!
//! let mut heap = PriorityHeap::new();
//! for x in [5, 3, 8, 1] {
//!     heap.push(x);
//! }
//! assert_eq!(heap.peek(), Some(&8));
//! assert_eq!(heap.into_sorted_vec(), [8, 5, 3, 1]);
//!
//! // Smallest first.
//! let heap = PriorityHeap::from_vec(vec![5, 3, 8, 1], HeapOrder::Min);
//! assert_eq!(heap.into_sorted_vec(), [1, 3, 5, 8]);
//!
//! // Anything else.
//! let by_urgency = |a: &(&str, u8), b: &(&str, u8)| a.1 > b.1;
//! let mut jobs = PriorityHeap::with_priority(Vec::<(&str, u8)>::new(), by_urgency);
//! jobs.push(("lint", 1));
//! jobs.push(("deploy", 9));
//! assert_eq!(jobs.pop(), Some(("deploy", 9)));
//! ```

use std::fmt;

use tracing::trace;

/// Decides which of two elements belongs closer to the root of a [`PriorityHeap`].
pub trait Priority<T> {
    /// Whether `a` must come out of the heap before `b`. Must be a strict order: never true for
    /// both `(a, b)` and `(b, a)`.
    fn outranks(&self, a: &T, b: &T) -> bool;
}

/// The natural orders of an `Ord` type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeapOrder {
    /// Largest element first.
    #[default]
    Max,
    /// Smallest element first.
    Min,
}

impl<T: Ord> Priority<T> for HeapOrder {
    fn outranks(&self, a: &T, b: &T) -> bool {
        match self {
            Self::Max => a > b,
            Self::Min => a < b,
        }
    }
}

impl<T, F> Priority<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn outranks(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// A binary heap stored in a `Vec`. The children of the element at `i` live at `2i + 1` and
/// `2i + 2` and neither outranks it.
#[derive(Clone)]
pub struct PriorityHeap<T, P = HeapOrder> {
    heap: Vec<T>,
    priority: P,
}

impl<T: Ord> Default for PriorityHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> PriorityHeap<T> {
    /// Creates an empty max-heap.
    pub fn new() -> Self {
        Self::with_order(HeapOrder::Max)
    }

    /// Creates an empty heap with the given order.
    pub fn with_order(order: HeapOrder) -> Self {
        Self {
            heap: Vec::new(),
            priority: order,
        }
    }

    /// Builds a heap with the given order out of `values` in `O(n)`.
    pub fn from_vec(values: Vec<T>, order: HeapOrder) -> Self {
        Self::with_priority(values, order)
    }
}

impl<T, P: Priority<T>> PriorityHeap<T, P> {
    /// Builds a heap out of `values` using a custom priority.
    pub fn with_priority(values: Vec<T>, priority: P) -> Self {
        let mut heap = Self {
            heap: values,
            priority,
        };
        heap.heapify();
        heap
    }

    /// The number of elements in the heap.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The priority this heap was built with.
    pub fn priority(&self) -> &P {
        &self.priority
    }

    /// The element that [`pop`][PriorityHeap::pop] would return, without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    /// The element at `index` in heap order (not priority order).
    pub fn get(&self, index: usize) -> Option<&T> {
        self.heap.get(index)
    }

    /// Adds `value` to the heap in `O(log n)`.
    pub fn push(&mut self, value: T) {
        self.heap.push(value);
        self.swim(self.heap.len() - 1);
    }

    /// Removes and returns the highest priority element in `O(log n)`.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.heap.len().checked_sub(1)?;
        self.heap.swap(0, last);
        let top = self.heap.pop();
        self.sink(0);
        top
    }

    /// Removes the first element equal to `item`, wherever it is in the heap. Finding it takes
    /// `O(n)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use arbor::heap::PriorityHeap;
    ///
    /// let mut heap: PriorityHeap<_> = [4, 7, 4, 1].into_iter().collect();
    /// assert_eq!(heap.remove(&4), Some(4));
    /// assert_eq!(heap.remove(&4), Some(4));
    /// assert_eq!(heap.remove(&4), None);
    /// assert_eq!(heap.into_sorted_vec(), [7, 1]);
    /// ```
    pub fn remove(&mut self, item: &T) -> Option<T>
    where
        T: PartialEq,
    {
        let index = self.heap.iter().position(|value| value == item)?;
        let removed = self.heap.swap_remove(index);
        // The element that took `index` may outrank its new parent or be outranked by its new
        // children but not both. Whichever pass has nothing to do is a no-op.
        if index < self.heap.len() {
            self.swim(index);
            self.sink(index);
        }
        trace!(index, len = self.heap.len(), "removed element from heap");
        Some(removed)
    }

    /// Removes every element equal to `item` and returns how many there were.
    pub fn remove_all(&mut self, item: &T) -> usize
    where
        T: PartialEq,
    {
        let mut removed = 0;
        while self.remove(item).is_some() {
            removed += 1;
        }
        removed
    }

    /// Removes every element, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// The elements in heap order.
    pub fn as_slice(&self) -> &[T] {
        &self.heap
    }

    /// Iterates over the elements in heap order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.heap.iter()
    }

    /// The elements in heap order.
    pub fn into_vec(self) -> Vec<T> {
        self.heap
    }

    /// The elements in priority order, highest first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        self.into_iter().collect()
    }

    fn heapify(&mut self) {
        for index in (0..self.heap.len() / 2).rev() {
            self.sink(index);
        }
        trace!(len = self.heap.len(), "heapified");
    }

    /// Moves the element at `index` up until its parent outranks it.
    fn swim(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self
                .priority
                .outranks(&self.heap[index], &self.heap[parent])
            {
                break;
            }
            self.heap.swap(parent, index);
            index = parent;
        }
    }

    /// Moves the element at `index` down until neither child outranks it.
    fn sink(&mut self, mut index: usize) {
        let len = self.heap.len();
        while 2 * index + 1 < len {
            let mut child = 2 * index + 1;
            if child + 1 < len
                && self
                    .priority
                    .outranks(&self.heap[child + 1], &self.heap[child])
            {
                child += 1;
            }
            if !self
                .priority
                .outranks(&self.heap[child], &self.heap[index])
            {
                break;
            }
            self.heap.swap(index, child);
            index = child;
        }
    }
}

impl<T: Ord> FromIterator<T> for PriorityHeap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(values: I) -> Self {
        Self::from_vec(values.into_iter().collect(), HeapOrder::Max)
    }
}

impl<T, P: Priority<T>> Extend<T> for PriorityHeap<T, P> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for value in values {
            self.push(value);
        }
    }
}

/// Pops elements in priority order. See [`PriorityHeap::into_iter`].
pub struct IntoIter<T, P> {
    heap: PriorityHeap<T, P>,
}

impl<T, P: Priority<T>> Iterator for IntoIter<T, P> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.heap.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len(), Some(self.heap.len()))
    }
}

impl<T, P: Priority<T>> ExactSizeIterator for IntoIter<T, P> {}

/// Consumes the heap, yielding its elements highest priority first.
impl<T, P: Priority<T>> IntoIterator for PriorityHeap<T, P> {
    type Item = T;
    type IntoIter = IntoIter<T, P>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { heap: self }
    }
}

impl<T: fmt::Debug, P> fmt::Debug for PriorityHeap<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.heap).finish()
    }
}

/// Writes the elements in heap order, like `[8, 5, 3, 1]`.
impl<T: fmt::Display, P> fmt::Display for PriorityHeap<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.heap.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}
