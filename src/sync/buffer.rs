//! Lock based bounded buffer
use std::fmt::{self, Debug};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::errors::{Error, Rejected, Result};

use super::ring::Ring;
use super::{Capacity, Exchange};

/// How full a buffer is.
///
/// `insert` is blocked while the buffer is `Full` and `fetch` while it is `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// No items
    Empty,
    /// Some items but room for more
    Partial,
    /// No room for another item
    Full,
}

// -----------------------------------------------------------------------------
// 		- Bounded buffer -
// -----------------------------------------------------------------------------
/// A fixed capacity FIFO queue shared between producer and consumer threads.
///
/// The storage is guarded by a single lock with two condition variables
/// bound to it: producers wait for "not full", consumers wait for "not empty".
/// Every insert wakes one waiting consumer and every fetch wakes one
/// waiting producer.
///
/// ```
/// # use std::sync::Arc;
/// # use std::thread;
/// use boundbuf::sync::BoundedBuffer;
///
/// # fn main() -> boundbuf::errors::Result<()> {
/// let buffer = Arc::new(BoundedBuffer::new(2)?);
///
/// let producer = {
///     let buffer = buffer.clone();
///     thread::spawn(move || {
///         for i in 0..10 {
///             buffer.insert(i);
///         }
///     })
/// };
///
/// let fetched = (0..10).map(|_| buffer.fetch()).collect::<Vec<i32>>();
/// assert_eq!(fetched, (0..10).collect::<Vec<_>>());
/// # producer.join().unwrap();
/// # Ok(())
/// # }
/// ```
pub struct BoundedBuffer<T> {
    capacity: Capacity,
    ring: Mutex<Ring<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedBuffer<T> {
    /// Create a buffer with room for `capacity` items.
    ///
    /// A capacity of zero returns [`Error::InvalidCapacity`].
    ///
    /// [`Error::InvalidCapacity`]: ../../errors/enum.Error.html
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = Capacity::new(capacity)?;
        debug!("new bounded buffer, capacity: {}", capacity.get());
        Ok(Self::with_capacity(capacity))
    }

    /// Create a buffer from an already validated capacity
    pub fn with_capacity(capacity: Capacity) -> Self {
        Self {
            capacity,
            ring: Mutex::new(Ring::with_capacity(capacity.get())),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// Insert an item at the back of the buffer.
    ///
    /// Blocks while the buffer is full. The condition is checked again
    /// every time the thread wakes up, as another producer might have
    /// taken the free slot first.
    pub fn insert(&self, item: T) {
        let mut ring = self.ring.lock();
        while ring.is_full() {
            trace!("insert: buffer full, waiting");
            self.not_full.wait(&mut ring);
        }

        ring.push_back(item);
        self.not_empty.notify_one();
    }

    /// Fetch the oldest item in the buffer.
    ///
    /// Blocks while the buffer is empty.
    pub fn fetch(&self) -> T {
        let mut ring = self.ring.lock();
        loop {
            if let Some(item) = ring.pop_front() {
                self.not_full.notify_one();
                break item;
            }
            trace!("fetch: buffer empty, waiting");
            self.not_empty.wait(&mut ring);
        }
    }

    /// Insert an item, waiting at most `timeout` for a free slot.
    ///
    /// On timeout the buffer is left untouched and the item is returned
    /// in a [`Rejected`] with the reason `Error::TimedOut`.
    ///
    /// [`Rejected`]: ../../errors/struct.Rejected.html
    pub fn insert_timeout(&self, item: T, timeout: Duration) -> std::result::Result<(), Rejected<T>> {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => {
                self.insert(item);
                return Ok(());
            }
        };

        let mut ring = self.ring.lock();
        while ring.is_full() {
            let res = self.not_full.wait_until(&mut ring, deadline);
            if res.timed_out() && ring.is_full() {
                trace!("insert: timed out");
                return Err(Rejected::new(item, Error::TimedOut));
            }
        }

        ring.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Fetch the oldest item, waiting at most `timeout` for one to arrive.
    pub fn fetch_timeout(&self, timeout: Duration) -> Result<T> {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => return Ok(self.fetch()),
        };

        let mut ring = self.ring.lock();
        loop {
            if let Some(item) = ring.pop_front() {
                self.not_full.notify_one();
                break Ok(item);
            }
            if self.not_empty.wait_until(&mut ring, deadline).timed_out() && ring.is_empty() {
                trace!("fetch: timed out");
                break Err(Error::TimedOut);
            }
        }
    }

    /// Insert without blocking.
    /// Returns the item with `Error::Full` if there is no free slot.
    pub fn try_insert(&self, item: T) -> std::result::Result<(), Rejected<T>> {
        let mut ring = self.ring.lock();
        if ring.is_full() {
            return Err(Rejected::new(item, Error::Full));
        }
        ring.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Fetch without blocking.
    /// Returns `Error::Empty` if there is nothing to fetch.
    pub fn try_fetch(&self) -> Result<T> {
        let mut ring = self.ring.lock();
        match ring.pop_front() {
            Some(item) => {
                self.not_full.notify_one();
                Ok(item)
            }
            None => Err(Error::Empty),
        }
    }

    /// The fixed number of items the buffer can hold
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of items currently in the buffer.
    /// The value may be stale as soon as it's returned.
    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    /// `true` if there are no items in the buffer
    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    /// `true` if there is no room for another item
    pub fn is_full(&self) -> bool {
        self.ring.lock().is_full()
    }

    /// Current state of the buffer
    pub fn state(&self) -> BufferState {
        let ring = self.ring.lock();
        if ring.is_empty() {
            BufferState::Empty
        } else if ring.is_full() {
            BufferState::Full
        } else {
            BufferState::Partial
        }
    }
}

impl<T: Clone> BoundedBuffer<T> {
    /// Copy of the items in the buffer, oldest first
    pub fn snapshot(&self) -> Vec<T> {
        self.ring.lock().iter().cloned().collect()
    }
}

impl<T: Send> Exchange<T> for BoundedBuffer<T> {
    fn insert(&self, item: T) {
        BoundedBuffer::insert(self, item)
    }

    fn fetch(&self) -> T {
        BoundedBuffer::fetch(self)
    }

    fn insert_timeout(&self, item: T, timeout: Duration) -> std::result::Result<(), Rejected<T>> {
        BoundedBuffer::insert_timeout(self, item, timeout)
    }

    fn fetch_timeout(&self, timeout: Duration) -> Result<T> {
        BoundedBuffer::fetch_timeout(self, timeout)
    }

    fn capacity(&self) -> usize {
        BoundedBuffer::capacity(self)
    }

    fn len(&self) -> usize {
        BoundedBuffer::len(self)
    }
}

impl<T> Debug for BoundedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ring = self.ring.lock();
        f.debug_struct("BoundedBuffer")
            .field("capacity", &self.capacity.get())
            .field("len", &ring.len())
            .finish()
    }
}
