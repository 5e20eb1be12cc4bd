//! Data models for accounts and wallets

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;

use crate::money::Amount;

/// Balance credited to every wallet at registration
pub const STARTING_BALANCE: Amount = Amount::from_major_units(1000);

/// Registered user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    /// Payment identifier, immutable once assigned
    pub upi_id: String,
    #[sqlx(rename = "created_at_ms", try_from = "UnixMillis")]
    pub created_at: DateTime<Utc>,
}

/// Balance record owned by exactly one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Wallet {
    pub id: i64,
    pub account_id: i64,
    #[sqlx(try_from = "i64")]
    pub balance: Amount,
}

/// Timestamp column in milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
pub struct UnixMillis(pub i64);

#[derive(Debug, Error)]
#[error("timestamp out of range: {0} ms")]
pub struct TimestampOutOfRange(i64);

impl TryFrom<UnixMillis> for DateTime<Utc> {
    type Error = TimestampOutOfRange;

    fn try_from(ms: UnixMillis) -> Result<Self, Self::Error> {
        DateTime::from_timestamp_millis(ms.0).ok_or(TimestampOutOfRange(ms.0))
    }
}
