use std::mem::replace;

// -----------------------------------------------------------------------------
// 		- Ring -
// -----------------------------------------------------------------------------
/// Fixed size circular storage.
///
/// Not synchronised: the owner guards it and only calls `push_back` when
/// the ring is not full and `pop_front` when it is not empty.
///
/// The `count` live items are the slots from `head` going forward,
/// ending just before `tail`, so `tail == (head + count) % capacity`.
#[derive(Debug)]
pub(crate) struct Ring<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    count: usize,
}

impl<T> Ring<T> {
    /// `capacity` has to be at least one
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        let slots = (0..capacity).map(|_| None).collect::<Vec<_>>();

        Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }

    pub(crate) fn push_back(&mut self, item: T) {
        debug_assert!(!self.is_full());
        let prev = replace(&mut self.slots[self.tail], Some(item));
        debug_assert!(prev.is_none());
        self.tail = self.advance(self.tail);
        self.count += 1;
        self.check();
    }

    /// Returns `None` only if the ring is empty
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = self.advance(self.head);
        self.count -= 1;
        self.check();
        item
    }

    /// Live items, oldest first
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.count)
            .map(move |offset| (self.head + offset) % self.capacity())
            .filter_map(move |index| self.slots[index].as_ref())
    }

    #[inline]
    fn check(&self) {
        debug_assert!(self.count <= self.capacity());
        debug_assert!(self.head < self.capacity());
        debug_assert!(self.tail < self.capacity());
        debug_assert_eq!(self.tail, (self.head + self.count) % self.capacity());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop_in_order() {
        let mut ring = Ring::with_capacity(3);
        ring.push_back(1);
        ring.push_back(2);
        ring.push_back(3);
        assert!(ring.is_full());

        assert_eq!(ring.pop_front(), Some(1));
        assert_eq!(ring.pop_front(), Some(2));
        assert_eq!(ring.pop_front(), Some(3));
        assert!(ring.is_empty());
    }

    #[test]
    fn pop_empty() {
        let mut ring: Ring<i32> = Ring::with_capacity(1);
        assert_eq!(ring.pop_front(), None);
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn indices_wrap_around() {
        let mut ring = Ring::with_capacity(2);
        for i in 0..7 {
            ring.push_back(i);
            assert_eq!(ring.pop_front(), Some(i));
        }
        assert_eq!(ring.head, 1);
        assert_eq!(ring.tail, 1);
        assert!(ring.is_empty());
    }

    #[test]
    fn iter_follows_head_across_the_wrap() {
        let mut ring = Ring::with_capacity(3);
        ring.push_back(1);
        ring.push_back(2);
        ring.pop_front();
        ring.push_back(3);
        ring.push_back(4);

        let live = ring.iter().cloned().collect::<Vec<_>>();
        assert_eq!(live, vec![2, 3, 4]);
        assert_eq!(ring.tail, (ring.head + ring.len()) % ring.capacity());
    }

    #[test]
    fn single_slot() {
        let mut ring = Ring::with_capacity(1);
        ring.push_back("a");
        assert!(ring.is_full());
        assert_eq!(ring.pop_front(), Some("a"));
        ring.push_back("b");
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![&"b"]);
    }
}
