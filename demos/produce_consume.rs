use std::env;

use boundbuf::driver::{self, Workload};
use boundbuf::errors::Result;

// -----------------------------------------------------------------------------
// 		- Produce / consume -
// 		Two producers and three consumers sharing a buffer of 200.
// 		Run with RUST_LOG=info to see every item.
// -----------------------------------------------------------------------------
fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let workload = Workload::default();
    let buffer = workload.buffer()?;
    let report = driver::run(&workload, &buffer)?;

    for (id, values) in report.fetched.iter().enumerate() {
        println!("consumer {} fetched {} items", id, values.len());
    }
    Ok(())
}
