//! Type definitions for the NEPSE client
//!
//! This module contains the wire structures and closed enums used across the
//! session and endpoint layers.

pub mod auth;
pub mod market;
pub mod serde_helpers;

pub use auth::{DescrambledCredential, RawTokenResponse, SaltQuintuple};
pub use market::{BrokerQuery, MarketStatus, PayloadCategory, TopListCategory};
