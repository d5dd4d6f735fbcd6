//! Comparator-ordered binary min-heap.

use core::cmp::Ordering;

/// Priority container ordered by a caller-supplied comparator.
///
/// `compare(a, b) == Ordering::Less` means `a` has strictly higher priority
/// than `b`. The highest-priority element sits at the root of a 0-based,
/// array-backed heap: for index `i`, the parent is `(i - 1) / 2` and the
/// children are `2i + 1` and `2i + 2`. Every parent compares `<=` both of its
/// children. Ties come out in unspecified order.
pub struct RankedQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    heap: Vec<T>,
    compare: F,
}

impl<T, F> RankedQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    pub fn new(compare: F) -> Self {
        Self {
            heap: Vec::new(),
            compare,
        }
    }

    pub fn with_capacity(capacity: usize, compare: F) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            compare,
        }
    }

    /// Insert and sift up. Amortized O(log n).
    pub fn enqueue(&mut self, item: T) {
        self.heap.push(item);
        self.sift_up(self.heap.len() - 1);
    }

    /// Remove and return the highest-priority element. O(log n).
    pub fn dequeue(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        // Promote the last element to the root, then restore heap order.
        let top = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    pub fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    pub fn size(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Up to `n` elements in full priority order, without touching the queue.
    ///
    /// Sorts a clone of the backing store, so the cost is O(m log m) on a
    /// snapshot and later queue operations are unaffected.
    pub fn top_k(&self, n: usize) -> Vec<T>
    where
        T: Clone,
    {
        let mut snapshot = self.heap.clone();
        snapshot.sort_by(&self.compare);
        snapshot.truncate(n);
        snapshot
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if (self.compare)(&self.heap[index], &self.heap[parent]) == Ordering::Less {
                self.heap.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut best = index;

            if left < len && (self.compare)(&self.heap[left], &self.heap[best]) == Ordering::Less {
                best = left;
            }
            if right < len && (self.compare)(&self.heap[right], &self.heap[best]) == Ordering::Less
            {
                best = right;
            }
            if best == index {
                break;
            }
            self.heap.swap(index, best);
            index = best;
        }
    }
}

impl<T, F> Extend<T> for RankedQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.enqueue(item);
        }
    }
}

impl<T, F> core::fmt::Debug for RankedQueue<T, F>
where
    T: core::fmt::Debug,
    F: Fn(&T, &T) -> Ordering,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RankedQueue").field("heap", &self.heap).finish()
    }
}
