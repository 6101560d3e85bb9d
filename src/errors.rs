//! Boundbuf default `Error`
use std::fmt;

/// Result type: `std::result::Result<T, Error>`
pub type Result<T> = std::result::Result<T, Error>;


/// Wrapping error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A buffer can not be created with room for zero items
    InvalidCapacity(usize),

    /// A timed insert / fetch gave up before the buffer
    /// had space / an item. The buffer was not touched.
    TimedOut,

    /// The buffer was full and the caller did not want to wait
    Full,

    /// The buffer was empty and the caller did not want to wait
    Empty,

    /// The number of items produced does not match the number of items
    /// the consumers expect to fetch: the workload can never finish.
    Unbalanced {
        /// Total number of items the producers insert
        produced: usize,
        /// Total number of items the consumers fetch
        fetched: usize,
    },

    /// A workload size does not fit: a total overflows `usize` or
    /// a producer would insert items beyond `i32::MAX`
    Overflow,

    /// A producer or consumer thread panicked
    ThreadPanicked,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidCapacity(cap) => write!(f, "invalid buffer capacity: {}", cap),
            Error::TimedOut => write!(f, "operation timed out"),
            Error::Full => write!(f, "buffer is full"),
            Error::Empty => write!(f, "buffer is empty"),
            Error::Unbalanced { produced, fetched } => write!(
                f,
                "unbalanced workload: {} produced, {} fetched",
                produced, fetched
            ),
            Error::Overflow => write!(f, "workload size overflows"),
            Error::ThreadPanicked => write!(f, "worker thread panicked"),
        }
    }
}

impl std::error::Error for Error {}


// -----------------------------------------------------------------------------
// 		- Rejected insert -
// -----------------------------------------------------------------------------
/// An insert that did not happen.
///
/// The item is handed back so the caller can retry without losing it.
#[derive(Debug, PartialEq, Eq)]
pub struct Rejected<T> {
    item: T,
    reason: Error,
}

impl<T> Rejected<T> {
    pub(crate) fn new(item: T, reason: Error) -> Self {
        Self { item, reason }
    }

    /// Why the item was not inserted
    pub fn reason(&self) -> &Error {
        &self.reason
    }

    /// Take back the item that was not inserted
    pub fn into_inner(self) -> T {
        self.item
    }
}

impl<T> From<Rejected<T>> for Error {
    fn from(rejected: Rejected<T>) -> Error {
        rejected.reason
    }
}

impl<T> fmt::Display for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "insert rejected: {}", self.reason)
    }
}

impl<T: fmt::Debug> std::error::Error for Rejected<T> {}
