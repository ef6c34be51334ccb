pub mod processor;

pub use processor::{process_transaction, run_worker, ProcessOutcome};
