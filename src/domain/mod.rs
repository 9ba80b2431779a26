//! Core domain types and logic.

pub mod calendar;
pub mod prices;
pub mod position;
pub mod rotation;
pub mod schedule;
pub mod strategy;
pub mod config_validation;
pub mod error;
