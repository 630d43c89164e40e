//! Helm CLI Client
//!
//! Thin wrapper around the `helm` binary used to upgrade the chart that
//! deploys the monitoring operator and to check whether a release exists.

pub mod client;
pub mod error;
pub mod runner;

pub use client::*;
pub use error::*;
pub use runner::*;
