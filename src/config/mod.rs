//! Configuration management for the NEPSE client
//!
//! This module handles loading and managing configuration settings from
//! files, environment variables, and CLI overrides.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{ApiSettings, LoggingSettings, OracleSettings, RetrySettings, Settings};
