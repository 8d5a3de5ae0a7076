//! Shared pieces of the `sk` binary: repository discovery, config, logging

pub mod config;
pub mod logging;
pub mod util;
