#![allow(dead_code)]

pub mod synthetic_pair;

/// Install a logger that prints through the test harness.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
