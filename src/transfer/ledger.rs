//! Transaction ledger
//!
//! Append-only. Rows are written by the transfer workflow inside its
//! transaction and never updated or deleted. Identifiers are copies, not
//! foreign keys, so entries stay readable whatever happens to the accounts.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor};

use crate::account::models::UnixMillis;
use crate::money::Amount;

/// One completed transfer
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LedgerEntry {
    pub id: i64,
    pub sender_upi_id: String,
    pub receiver_upi_id: String,
    #[sqlx(try_from = "i64")]
    pub amount: Amount,
    pub description: Option<String>,
    #[sqlx(rename = "created_at_ms", try_from = "UnixMillis")]
    pub created_at: DateTime<Utc>,
}

/// Which side of an entry a given account is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

impl LedgerEntry {
    pub fn direction_for(&self, upi_id: &str) -> Direction {
        if self.sender_upi_id == upi_id {
            Direction::Sent
        } else {
            Direction::Received
        }
    }

    /// The other party from `upi_id`'s point of view
    pub fn counterparty_for(&self, upi_id: &str) -> &str {
        match self.direction_for(upi_id) {
            Direction::Sent => &self.receiver_upi_id,
            Direction::Received => &self.sender_upi_id,
        }
    }
}

pub struct LedgerRepository;

impl LedgerRepository {
    /// Append one entry. Call inside the transfer transaction.
    pub async fn append(
        conn: &mut SqliteConnection,
        sender_upi_id: &str,
        receiver_upi_id: &str,
        amount: Amount,
        description: Option<&str>,
        created_at_ms: i64,
    ) -> Result<LedgerEntry, sqlx::Error> {
        sqlx::query_as(
            r#"INSERT INTO ledger_entries
                   (sender_upi_id, receiver_upi_id, amount, description, created_at_ms)
               VALUES (?, ?, ?, ?, ?)
               RETURNING id, sender_upi_id, receiver_upi_id, amount, description, created_at_ms"#,
        )
        .bind(sender_upi_id)
        .bind(receiver_upi_id)
        .bind(amount.minor_units())
        .bind(description)
        .bind(created_at_ms)
        .fetch_one(conn)
        .await
    }

    /// Entries where `upi_id` is sender or receiver, newest first
    pub async fn list_for_upi_id<'e>(
        exec: impl SqliteExecutor<'e>,
        upi_id: &str,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT id, sender_upi_id, receiver_upi_id, amount, description, created_at_ms
               FROM ledger_entries
               WHERE sender_upi_id = ? OR receiver_upi_id = ?
               ORDER BY created_at_ms DESC, id DESC"#,
        )
        .bind(upi_id)
        .bind(upi_id)
        .fetch_all(exec)
        .await
    }

    pub async fn count<'e>(exec: impl SqliteExecutor<'e>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries")
            .fetch_one(exec)
            .await
    }
}
