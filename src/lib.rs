//! weekrot: weekly rotation allocation scheduler.
//!
//! Computes a daily 0%/100% target-allocation schedule for a single
//! leveraged-ETF weekly rotation strategy from historical Open/Close prices.
//! Hexagonal architecture: domain logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
