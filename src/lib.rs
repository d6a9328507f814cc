//! stockscope: financial time-series analytics.
//!
//! Hexagonal architecture: pure analytics in [`domain`], port traits in
//! [`ports`], concrete file-backed implementations in [`adapters`], and a thin
//! command-line driver in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
