//! Error handling for the NEPSE client
//!
//! This module defines error types and handling patterns used throughout the crate.

pub mod types;

pub use types::{Error, Result, ValidationError};
