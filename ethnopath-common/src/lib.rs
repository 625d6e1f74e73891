//! # EthnoPath Common Library
//!
//! Shared code for the EthnoPath digitization services:
//! - Common error type
//! - TOML bootstrap configuration and config file resolution
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
