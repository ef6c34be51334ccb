pub mod client;

pub use client::{SettlementClient, SettlementError};
