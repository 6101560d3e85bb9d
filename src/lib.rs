#![deny(missing_docs)]
//! # Bounded buffers for producer / consumer threads
//!
//! A fixed capacity FIFO queue that any number of producer and consumer
//! threads can share. Producers block while the buffer is full, consumers
//! block while it's empty, and nobody spins.
//!
//! * [`BoundedBuffer`]: one lock and two condition variables.
//! * [`ChannelBuffer`]: the same contract on top of a bounded channel.
//! * [`driver`]: runs producer and consumer threads against either one.
//!
//! [`BoundedBuffer`]: sync/buffer/struct.BoundedBuffer.html
//! [`ChannelBuffer`]: sync/channel/struct.ChannelBuffer.html
//! [`driver`]: driver/index.html
#[macro_use] extern crate log;

pub mod errors;
pub mod sync;
pub mod driver;

// Pub uses
pub use sync::{BoundedBuffer, BufferState, Capacity, ChannelBuffer, Exchange};
