//! Channel backed bounded buffer
use std::fmt::{self, Debug};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, Sender};
use crossbeam::channel::{RecvTimeoutError, SendTimeoutError, TryRecvError, TrySendError};

use crate::errors::{Error, Rejected, Result};

use super::{BufferState, Capacity, Exchange};

// -----------------------------------------------------------------------------
//              - Channel buffer -
// -----------------------------------------------------------------------------
/// A bounded buffer on top of a bounded channel.
///
/// The channel owns the wait queues: sending blocks while the channel is full
/// and receiving blocks while it is empty. Both ends are kept here so the
/// channel can never disconnect while the buffer is alive.
pub struct ChannelBuffer<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    capacity: Capacity,
}

impl<T> ChannelBuffer<T> {
    /// Create a buffer with room for `capacity` items.
    /// A capacity of zero is rejected, it would turn the channel into a rendezvous.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = Capacity::new(capacity)?;
        Ok(Self::with_capacity(capacity))
    }

    /// Create a buffer from an already validated capacity
    pub fn with_capacity(capacity: Capacity) -> Self {
        let (sender, receiver) = bounded(capacity.get());
        debug!("new channel buffer, capacity: {}", capacity.get());
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Insert an item, blocking while the buffer is full
    pub fn insert(&self, item: T) {
        if self.sender.send(item).is_err() {
            unreachable!("receiver is owned by the buffer");
        }
    }

    /// Fetch the oldest item, blocking while the buffer is empty
    pub fn fetch(&self) -> T {
        match self.receiver.recv() {
            Ok(item) => item,
            Err(_) => unreachable!("sender is owned by the buffer"),
        }
    }

    /// Insert an item, waiting at most `timeout` for a free slot
    pub fn insert_timeout(&self, item: T, timeout: Duration) -> std::result::Result<(), Rejected<T>> {
        match self.sender.send_timeout(item, timeout) {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(item)) | Err(SendTimeoutError::Disconnected(item)) => {
                Err(Rejected::new(item, Error::TimedOut))
            }
        }
    }

    /// Fetch the oldest item, waiting at most `timeout` for one to arrive
    pub fn fetch_timeout(&self, timeout: Duration) -> Result<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(item) => Ok(item),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Err(Error::TimedOut),
        }
    }

    /// Insert without blocking
    pub fn try_insert(&self, item: T) -> std::result::Result<(), Rejected<T>> {
        match self.sender.try_send(item) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(item)) | Err(TrySendError::Disconnected(item)) => {
                Err(Rejected::new(item, Error::Full))
            }
        }
    }

    /// Fetch without blocking
    pub fn try_fetch(&self) -> Result<T> {
        match self.receiver.try_recv() {
            Ok(item) => Ok(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Err(Error::Empty),
        }
    }

    /// The fixed number of items the buffer can hold
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of items currently in the buffer
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// `true` if there are no items in the buffer
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// `true` if there is no room for another item
    pub fn is_full(&self) -> bool {
        self.receiver.is_full()
    }

    /// Current state of the buffer
    pub fn state(&self) -> BufferState {
        match self.len() {
            0 => BufferState::Empty,
            n if n == self.capacity() => BufferState::Full,
            _ => BufferState::Partial,
        }
    }
}

impl<T: Send> Exchange<T> for ChannelBuffer<T> {
    fn insert(&self, item: T) {
        ChannelBuffer::insert(self, item)
    }

    fn fetch(&self) -> T {
        ChannelBuffer::fetch(self)
    }

    fn insert_timeout(&self, item: T, timeout: Duration) -> std::result::Result<(), Rejected<T>> {
        ChannelBuffer::insert_timeout(self, item, timeout)
    }

    fn fetch_timeout(&self, timeout: Duration) -> Result<T> {
        ChannelBuffer::fetch_timeout(self, timeout)
    }

    fn capacity(&self) -> usize {
        ChannelBuffer::capacity(self)
    }

    fn len(&self) -> usize {
        ChannelBuffer::len(self)
    }
}

impl<T> Debug for ChannelBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ChannelBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
