//! Authentication wire types
//!
//! Defines the scrambled token payload issued by the authentication endpoint
//! and the descrambled credential the session keeps.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::serde_helpers::deserialize_flexible_i32;

/// The five per-session salts issued alongside each scrambled token pair.
///
/// Immutable once received. They drive both the descrambling oracle and the
/// payload identifier formula, and are only meaningful together with the
/// token pair they arrived with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaltQuintuple {
    pub salt1: i32,
    pub salt2: i32,
    pub salt3: i32,
    pub salt4: i32,
    pub salt5: i32,
}

impl SaltQuintuple {
    /// Create a new salt quintuple
    pub fn new(salt1: i32, salt2: i32, salt3: i32, salt4: i32, salt5: i32) -> Self {
        Self {
            salt1,
            salt2,
            salt3,
            salt4,
            salt5,
        }
    }
}

/// Raw payload of the authentication endpoint.
///
/// The token strings arrive scrambled and the salts arrive string-encoded.
/// Transient: consumed immediately by the descrambler.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenResponse {
    /// Server clock at issuance, epoch milliseconds
    pub server_time: Option<i64>,

    /// Scrambled access token
    pub access_token: String,

    /// Scrambled refresh token
    pub refresh_token: String,

    /// Bearer scheme hint sent by the server (ignored; the scheme is fixed)
    pub token_type: Option<String>,

    #[serde(deserialize_with = "deserialize_flexible_i32")]
    pub salt1: i32,
    #[serde(deserialize_with = "deserialize_flexible_i32")]
    pub salt2: i32,
    #[serde(deserialize_with = "deserialize_flexible_i32")]
    pub salt3: i32,
    #[serde(deserialize_with = "deserialize_flexible_i32")]
    pub salt4: i32,
    #[serde(deserialize_with = "deserialize_flexible_i32")]
    pub salt5: i32,
}

impl RawTokenResponse {
    /// The salts as one value, in issuance order
    pub fn salts(&self) -> SaltQuintuple {
        SaltQuintuple::new(self.salt1, self.salt2, self.salt3, self.salt4, self.salt5)
    }
}

/// A usable bearer credential produced by one authentication round.
///
/// The salts stay attached to the tokens they were issued with; payload
/// computation must use exactly this quintuple, never one from a different
/// authentication.
#[derive(Debug, Clone)]
pub struct DescrambledCredential {
    /// Descrambled access token, sent as `Authorization: Salter <token>`
    pub access_token: String,

    /// Descrambled refresh token. The upstream exposes no refresh endpoint
    /// contract, so this is held for completeness only.
    pub refresh_token: String,

    /// Salts this credential was derived from
    pub salts: SaltQuintuple,

    /// Instant the credential was descrambled
    pub issued_at: DateTime<Utc>,
}

impl DescrambledCredential {
    /// Create a credential stamped with the current time
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        salts: SaltQuintuple,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            salts,
            issued_at: Utc::now(),
        }
    }

    /// Age of this credential
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.issued_at
    }

    /// Best-effort expiry of the access token, decoded from its JWT `exp`
    /// claim. The upstream never signals expiry out of band; callers that
    /// want refresh behavior can watch this and drop the session's cached
    /// credential when it passes.
    pub fn access_token_expiry(&self) -> Option<DateTime<Utc>> {
        decode_jwt_expiry(&self.access_token)
    }
}

/// Decode the `exp` claim from a JWT without verifying its signature.
fn decode_jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    DateTime::<Utc>::from_timestamp(exp, 0)
}
