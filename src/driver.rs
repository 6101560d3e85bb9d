//! Producer / consumer driver.
//!
//! Runs a fixed number of producer and consumer threads against one shared
//! buffer until every produced item has been fetched.
//!
//! ```
//! use std::time::Duration;
//! use boundbuf::driver::{self, Workload};
//!
//! # fn main() -> boundbuf::errors::Result<()> {
//! let workload = Workload::default()
//!     .capacity(4)
//!     .producers(2, 6)
//!     .consumers(3, 4)
//!     .delays(Duration::from_millis(0), Duration::from_millis(0));
//!
//! let buffer = workload.buffer()?;
//! let report = driver::run(&workload, &buffer)?;
//! assert_eq!(report.total_fetched(), 12);
//! # Ok(())
//! # }
//! ```
use std::convert::TryFrom;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::errors::{Error, Result};
use crate::sync::{BoundedBuffer, Capacity, Exchange};

// -----------------------------------------------------------------------------
// 		- Workload -
// -----------------------------------------------------------------------------
/// How many threads to run, how much work each does and how fast.
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    capacity: usize,
    producers: usize,
    items_per_producer: usize,
    consumers: usize,
    items_per_consumer: usize,
    produce_delay: Duration,
    consume_delay: Duration,
}

impl Default for Workload {
    /// Two producers inserting 75 items each and three consumers fetching
    /// 50 items each through a buffer of 200.
    fn default() -> Self {
        Self {
            capacity: 200,
            producers: 2,
            items_per_producer: 75,
            consumers: 3,
            items_per_consumer: 50,
            produce_delay: Duration::from_millis(100),
            consume_delay: Duration::from_millis(250),
        }
    }
}

impl Workload {
    /// Set the buffer capacity used by [`buffer`](#method.buffer)
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Number of producer threads and the number of items each one inserts
    pub fn producers(mut self, threads: usize, items: usize) -> Self {
        self.producers = threads;
        self.items_per_producer = items;
        self
    }

    /// Number of consumer threads and the number of items each one fetches
    pub fn consumers(mut self, threads: usize, items: usize) -> Self {
        self.consumers = threads;
        self.items_per_consumer = items;
        self
    }

    /// Pause after each insert / fetch
    pub fn delays(mut self, produce: Duration, consume: Duration) -> Self {
        self.produce_delay = produce;
        self.consume_delay = consume;
        self
    }

    /// Total number of items inserted by all producers.
    /// Fails with `Error::Overflow` if the total does not fit in a `usize`.
    pub fn total_produced(&self) -> Result<usize> {
        self.producers
            .checked_mul(self.items_per_producer)
            .ok_or(Error::Overflow)
    }

    /// Total number of items fetched by all consumers
    pub fn total_fetched(&self) -> Result<usize> {
        self.consumers
            .checked_mul(self.items_per_consumer)
            .ok_or(Error::Overflow)
    }

    /// Check that the workload can run to completion.
    ///
    /// Producers and consumers have to agree on the number of items,
    /// otherwise some thread would block forever.
    pub fn validate(&self) -> Result<()> {
        Capacity::new(self.capacity)?;
        self.validate_totals()
    }

    // The capacity only matters for `buffer`; `run` works on any buffer.
    fn validate_totals(&self) -> Result<()> {
        let (produced, fetched) = (self.total_produced()?, self.total_fetched()?);
        if produced != fetched {
            return Err(Error::Unbalanced { produced, fetched });
        }
        self.items_as_i32()?;
        Ok(())
    }

    // Producers insert `0..items_per_producer` as `i32`
    fn items_as_i32(&self) -> Result<i32> {
        i32::try_from(self.items_per_producer).map_err(|_| Error::Overflow)
    }

    /// Create a lock based buffer with the workload's capacity
    pub fn buffer(&self) -> Result<BoundedBuffer<i32>> {
        BoundedBuffer::new(self.capacity)
    }
}

// -----------------------------------------------------------------------------
// 		- Report -
// -----------------------------------------------------------------------------
/// What every thread did during a run
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Number of items inserted, per producer
    pub produced: Vec<usize>,
    /// Items fetched, per consumer, in the order they were fetched
    pub fetched: Vec<Vec<i32>>,
}

impl Report {
    /// Total number of items inserted
    pub fn total_produced(&self) -> usize {
        self.produced.iter().sum()
    }

    /// Total number of items fetched
    pub fn total_fetched(&self) -> usize {
        self.fetched.iter().map(Vec::len).sum()
    }

    /// Every fetched item, sorted
    pub fn fetched_sorted(&self) -> Vec<i32> {
        let mut all = self.fetched.iter().flatten().cloned().collect::<Vec<_>>();
        all.sort();
        all
    }
}

// -----------------------------------------------------------------------------
// 		- Run -
// -----------------------------------------------------------------------------
/// Run the workload against `buffer` and wait for every thread to finish.
///
/// Producer `n` inserts `0..items_per_producer`; consumers fetch
/// `items_per_consumer` items each. The workload's capacity is not
/// used here, the buffer decides how many items it holds.
///
/// If any producer or consumer panics the others give up within
/// one poll interval and `Error::ThreadPanicked` is returned.
pub fn run<B: Exchange<i32>>(workload: &Workload, buffer: &B) -> Result<Report> {
    workload.validate_totals()?;
    let items = workload.items_as_i32()?;
    info!(
        "starting {} producers and {} consumers, capacity {}",
        workload.producers,
        workload.consumers,
        buffer.capacity()
    );

    let aborted = AtomicBool::new(false);
    let aborted = &aborted;

    let report = crossbeam::scope(|s| {
        let consumers = (0..workload.consumers)
            .map(|id| s.spawn(move |_| {
                let _guard = AbortOnPanic(aborted);
                consume(id, workload, buffer, aborted)
            }))
            .collect::<Vec<_>>();

        let producers = (0..workload.producers)
            .map(|id| s.spawn(move |_| {
                let _guard = AbortOnPanic(aborted);
                produce(id, items, workload, buffer, aborted)
            }))
            .collect::<Vec<_>>();

        // Join every handle before looking at the results
        let produced = producers
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>();

        let fetched = consumers
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>();

        let produced = produced
            .into_iter()
            .map(|res| res.ok().and_then(|n| n))
            .collect::<Option<Vec<_>>>();
        let fetched = fetched
            .into_iter()
            .map(|res| res.ok().and_then(|values| values))
            .collect::<Option<Vec<_>>>();

        match (produced, fetched) {
            (Some(produced), Some(fetched)) => Ok(Report { produced, fetched }),
            _ => {
                error!("a worker thread panicked, run aborted");
                Err(Error::ThreadPanicked)
            }
        }
    })
    .map_err(|_| Error::ThreadPanicked)??;

    info!(
        "done: {} produced, {} fetched",
        report.total_produced(),
        report.total_fetched()
    );
    Ok(report)
}

// How long a worker blocks before checking if the run was aborted
const POLL_INTERVAL: Duration = Duration::from_millis(20);

// Flags the run as aborted when the owning thread unwinds
struct AbortOnPanic<'a>(&'a AtomicBool);

impl<'a> Drop for AbortOnPanic<'a> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::SeqCst);
        }
    }
}

// Returns `None` if the run was aborted
fn produce<B: Exchange<i32>>(
    id: usize,
    items: i32,
    workload: &Workload,
    buffer: &B,
    aborted: &AtomicBool,
) -> Option<usize> {
    for i in 0..items {
        let mut item = i;
        while let Err(rejected) = buffer.insert_timeout(item, POLL_INTERVAL) {
            if aborted.load(Ordering::SeqCst) {
                debug!("producer {} aborted", id);
                return None;
            }
            item = rejected.into_inner();
        }
        info!("producer {} produced {}", id, i);
        pause(workload.produce_delay);
    }
    Some(workload.items_per_producer)
}

// Returns `None` if the run was aborted
fn consume<B: Exchange<i32>>(
    id: usize,
    workload: &Workload,
    buffer: &B,
    aborted: &AtomicBool,
) -> Option<Vec<i32>> {
    let mut fetched = Vec::with_capacity(workload.items_per_consumer);
    while fetched.len() < workload.items_per_consumer {
        match buffer.fetch_timeout(POLL_INTERVAL) {
            Ok(value) => {
                info!("consumer {} fetched {}", id, value);
                fetched.push(value);
                pause(workload.consume_delay);
            }
            Err(_) if aborted.load(Ordering::SeqCst) => {
                debug!("consumer {} aborted", id);
                return None;
            }
            Err(_) => {}
        }
    }
    Some(fetched)
}

fn pause(delay: Duration) {
    if delay > Duration::from_millis(0) {
        thread::sleep(delay);
    }
}
