//! Bulk UPI address lookup.
//!
//! A phone number is expanded into one candidate VPA per known bank handle,
//! each candidate is checked against the verification oracle under a bounded
//! worker pool, and the confirmed addresses are returned in input order.

pub mod config;
pub mod error;
pub mod lookup;
pub mod telemetry;
