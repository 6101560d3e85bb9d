//! Bounded buffers shared between producer and consumer threads.
use std::time::Duration;

use crate::errors::{Error, Rejected, Result};

mod ring;
pub mod buffer;
pub mod channel;

pub use buffer::{BoundedBuffer, BufferState};
pub use channel::ChannelBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Buffer capacity.
///
/// A buffer always has room for at least one item.
pub struct Capacity(usize);

impl Capacity {
    /// Validate a capacity.
    /// Zero is rejected with [`Error::InvalidCapacity`].
    ///
    /// [`Error::InvalidCapacity`]: ../errors/enum.Error.html
    pub fn new(capacity: usize) -> Result<Self> {
        match capacity {
            0 => Err(Error::InvalidCapacity(capacity)),
            cap => Ok(Capacity(cap)),
        }
    }

    /// The number of items the buffer can hold
    pub fn get(self) -> usize {
        self.0
    }
}

// -----------------------------------------------------------------------------
// 		- Exchange -
// -----------------------------------------------------------------------------
/// Blocking exchange of items between producers and consumers.
///
/// Every implementation is FIFO: the first item inserted is the first item
/// fetched. Which of several blocked threads is woken first is not specified.
pub trait Exchange<T>: Sync {
    /// Insert an item, blocking while the buffer is full
    fn insert(&self, item: T);

    /// Fetch the oldest item, blocking while the buffer is empty
    fn fetch(&self) -> T;

    /// Insert an item, blocking for at most `timeout`.
    fn insert_timeout(&self, item: T, timeout: Duration) -> std::result::Result<(), Rejected<T>>;

    /// Fetch the oldest item, blocking for at most `timeout`.
    fn fetch_timeout(&self, timeout: Duration) -> Result<T>;

    /// The fixed number of items the buffer can hold
    fn capacity(&self) -> usize;

    /// The number of items currently held
    fn len(&self) -> usize;

    /// `true` if no items are held
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(Capacity::new(0), Err(Error::InvalidCapacity(0)));
    }

    #[test]
    fn positive_capacity() {
        assert_eq!(Capacity::new(200).unwrap().get(), 200);
    }
}
