use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;

use boundbuf::driver::{self, Workload};
use boundbuf::errors::{Error, Rejected, Result};
use boundbuf::sync::{BoundedBuffer, ChannelBuffer, Exchange};

// -----------------------------------------------------------------------------
// 		- Flaky -
// 		A buffer that panics when it sees a given item
// -----------------------------------------------------------------------------
struct Flaky {
    inner: BoundedBuffer<i32>,
    panic_on_insert: Option<i32>,
    panic_on_fetch: Option<i32>,
}

impl Flaky {
    fn new(capacity: usize) -> Self {
        Self {
            inner: BoundedBuffer::new(capacity).unwrap(),
            panic_on_insert: None,
            panic_on_fetch: None,
        }
    }

    fn check_insert(&self, item: i32) {
        if self.panic_on_insert == Some(item) {
            panic!("insert {}", item);
        }
    }

    fn check_fetch(&self, item: i32) -> i32 {
        if self.panic_on_fetch == Some(item) {
            panic!("fetch {}", item);
        }
        item
    }
}

impl Exchange<i32> for Flaky {
    fn insert(&self, item: i32) {
        self.check_insert(item);
        self.inner.insert(item)
    }

    fn fetch(&self) -> i32 {
        self.check_fetch(self.inner.fetch())
    }

    fn insert_timeout(&self, item: i32, timeout: Duration) -> std::result::Result<(), Rejected<i32>> {
        self.check_insert(item);
        self.inner.insert_timeout(item, timeout)
    }

    fn fetch_timeout(&self, timeout: Duration) -> Result<i32> {
        self.inner.fetch_timeout(timeout).map(|item| self.check_fetch(item))
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

// Run on a helper thread so a hang fails the test instead of stalling it
fn run_with_deadline(workload: Workload, buffer: Flaky) -> Result<usize> {
    let (tx, rx) = channel();
    thread::spawn(move || {
        let res = driver::run(&workload, &buffer).map(|report| report.total_fetched());
        let _ = tx.send(res);
    });
    rx.recv_timeout(Duration::from_secs(10))
        .expect("driver::run did not return after a worker panic")
}

fn quick() -> Workload {
    Workload::default().delays(Duration::from_millis(0), Duration::from_millis(0))
}

fn expected(producers: usize, items: usize) -> Vec<i32> {
    let mut all = (0..producers)
        .flat_map(|_| 0..items as i32)
        .collect::<Vec<_>>();
    all.sort();
    all
}

#[test]
fn test_default_shape() {
    // -----------------------------------------------------------------------------
    // 		- Two producers, three consumers, no pacing -
    // -----------------------------------------------------------------------------
    let _ = env_logger::builder().is_test(true).try_init();
    let workload = quick();
    let buffer = workload.buffer().unwrap();

    let report = driver::run(&workload, &buffer).unwrap();

    assert_eq!(report.produced, vec![75, 75]);
    assert_eq!(report.fetched.len(), 3);
    assert!(report.fetched.iter().all(|values| values.len() == 50));
    assert_eq!(report.fetched_sorted(), expected(2, 75));
    assert!(buffer.is_empty());
}

#[test]
fn test_small_buffer_many_threads() {
    let workload = quick().capacity(1).producers(6, 40).consumers(4, 60);
    let buffer = workload.buffer().unwrap();

    let report = driver::run(&workload, &buffer).unwrap();
    assert_eq!(report.total_produced(), 240);
    assert_eq!(report.total_fetched(), 240);
    assert_eq!(report.fetched_sorted(), expected(6, 40));
}

#[test]
fn test_channel_buffer() {
    let workload = quick().producers(3, 20).consumers(2, 30);
    let buffer = ChannelBuffer::new(4).unwrap();

    let report = driver::run(&workload, &buffer).unwrap();
    assert_eq!(report.fetched_sorted(), expected(3, 20));
}

#[test]
fn test_paced_run_completes() {
    let workload = Workload::default()
        .capacity(2)
        .producers(2, 5)
        .consumers(1, 10)
        .delays(Duration::from_millis(1), Duration::from_millis(2));
    let buffer = workload.buffer().unwrap();

    let report = driver::run(&workload, &buffer).unwrap();
    assert_eq!(report.total_fetched(), 10);
}

#[test]
fn test_unbalanced_is_rejected() {
    let workload = quick().producers(2, 10).consumers(3, 10);
    let buffer = workload.buffer().unwrap();

    match driver::run(&workload, &buffer) {
        Err(Error::Unbalanced { produced: 20, fetched: 30 }) => {}
        other => panic!("Should return an Unbalanced error, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_producer_panic_is_reported() {
    let workload = quick().producers(2, 5).consumers(1, 10);
    let mut buffer = Flaky::new(4);
    buffer.panic_on_insert = Some(2);

    assert_eq!(run_with_deadline(workload, buffer), Err(Error::ThreadPanicked));
}

#[test]
fn test_consumer_panic_is_reported() {
    // The producer fills the buffer and would block forever
    // without the abort
    let workload = quick().producers(1, 20).consumers(1, 20);
    let mut buffer = Flaky::new(2);
    buffer.panic_on_fetch = Some(3);

    assert_eq!(run_with_deadline(workload, buffer), Err(Error::ThreadPanicked));
}

#[test]
fn test_buffer_decides_capacity() {
    let workload = quick().capacity(0).producers(1, 10).consumers(2, 5);
    let buffer = BoundedBuffer::new(3).unwrap();

    let report = driver::run(&workload, &buffer).unwrap();
    assert_eq!(report.total_fetched(), 10);
}

#[test]
fn test_overflowing_workload_is_rejected() {
    let workload = quick().producers(usize::MAX, 2).consumers(1, 1);
    let buffer = BoundedBuffer::new(1).unwrap();

    match driver::run(&workload, &buffer) {
        Err(Error::Overflow) => {}
        other => panic!("Should return an Overflow error, got: {:?}", other.map(|_| ())),
    }
}
