//! Session layer for the NEPSE web API
//!
//! This module holds the pieces every authenticated request passes through:
//! token descrambling, payload identifier computation, the retry policies,
//! and the session manager that ties them together over HTTP.

pub mod descrambler;
pub mod manager;
pub mod payload;
pub mod retry;

pub use descrambler::TokenDescrambler;
pub use manager::{ApiSession, ApiSessionGeneric};
pub use retry::RetryPolicy;
