//! Repository layer for accounts and wallets
//!
//! Single-statement reads accept any SQLite executor (pool or open
//! transaction). Mutations take a connection so callers decide the
//! transaction boundary.

use super::models::{Account, Wallet};
use crate::db::Database;
use crate::money::Amount;
use sqlx::{SqliteConnection, SqliteExecutor};

/// Account repository
pub struct AccountRepository;

impl AccountRepository {
    /// Get account by ID
    pub async fn get_by_id<'e>(
        exec: impl SqliteExecutor<'e>,
        account_id: i64,
    ) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT id, name, email, password_hash, upi_id, created_at_ms
               FROM accounts WHERE id = ?"#,
        )
        .bind(account_id)
        .fetch_optional(exec)
        .await
    }

    /// Get account by (already normalized) email
    pub async fn get_by_email<'e>(
        exec: impl SqliteExecutor<'e>,
        email: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT id, name, email, password_hash, upi_id, created_at_ms
               FROM accounts WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(exec)
        .await
    }

    /// Get account by payment identifier
    pub async fn get_by_upi_id<'e>(
        exec: impl SqliteExecutor<'e>,
        upi_id: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT id, name, email, password_hash, upi_id, created_at_ms
               FROM accounts WHERE upi_id = ?"#,
        )
        .bind(upi_id)
        .fetch_optional(exec)
        .await
    }

    pub async fn email_exists<'e>(
        exec: impl SqliteExecutor<'e>,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(exec)
            .await?;
        Ok(found.is_some())
    }

    pub async fn upi_id_exists<'e>(
        exec: impl SqliteExecutor<'e>,
        upi_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM accounts WHERE upi_id = ?")
            .bind(upi_id)
            .fetch_optional(exec)
            .await?;
        Ok(found.is_some())
    }

    /// Insert an account row, returning its ID
    pub async fn insert(
        conn: &mut SqliteConnection,
        name: &str,
        email: &str,
        password_hash: &str,
        upi_id: &str,
        created_at_ms: i64,
    ) -> Result<i64, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"INSERT INTO accounts (name, email, password_hash, upi_id, created_at_ms)
               VALUES (?, ?, ?, ?, ?) RETURNING id"#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(upi_id)
        .bind(created_at_ms)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    /// Delete an account together with the wallet it owns.
    ///
    /// The wallet goes first and both deletes share one transaction, so no
    /// orphan wallet and no wallet-less account is ever observable. Ledger
    /// entries are kept: they carry denormalized identifiers.
    /// Returns `false` when the account does not exist.
    pub async fn delete_account(db: &Database, account_id: i64) -> Result<bool, sqlx::Error> {
        let _gate = db.write_gate().await;
        let mut tx = db.pool().begin().await?;

        sqlx::query("DELETE FROM wallets WHERE account_id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted == 1)
    }
}

/// Wallet repository
pub struct WalletRepository;

impl WalletRepository {
    /// Create the wallet for a freshly inserted account
    pub async fn create(
        conn: &mut SqliteConnection,
        account_id: i64,
        balance: Amount,
    ) -> Result<i64, sqlx::Error> {
        let id: i64 =
            sqlx::query_scalar("INSERT INTO wallets (account_id, balance) VALUES (?, ?) RETURNING id")
                .bind(account_id)
                .bind(balance.minor_units())
                .fetch_one(conn)
                .await?;

        Ok(id)
    }

    pub async fn get_by_account<'e>(
        exec: impl SqliteExecutor<'e>,
        account_id: i64,
    ) -> Result<Option<Wallet>, sqlx::Error> {
        sqlx::query_as("SELECT id, account_id, balance FROM wallets WHERE account_id = ?")
            .bind(account_id)
            .fetch_optional(exec)
            .await
    }

    /// Subtract `amount` if the balance covers it.
    ///
    /// Returns `false` (and changes nothing) when funds are insufficient.
    pub async fn debit(
        conn: &mut SqliteConnection,
        wallet_id: i64,
        amount: Amount,
    ) -> Result<bool, sqlx::Error> {
        let affected =
            sqlx::query("UPDATE wallets SET balance = balance - ? WHERE id = ? AND balance >= ?")
                .bind(amount.minor_units())
                .bind(wallet_id)
                .bind(amount.minor_units())
                .execute(conn)
                .await?
                .rows_affected();
        Ok(affected == 1)
    }

    pub async fn credit(
        conn: &mut SqliteConnection,
        wallet_id: i64,
        amount: Amount,
    ) -> Result<(), sqlx::Error> {
        let affected = sqlx::query("UPDATE wallets SET balance = balance + ? WHERE id = ?")
            .bind(amount.minor_units())
            .bind(wallet_id)
            .execute(conn)
            .await?
            .rows_affected();

        if affected != 1 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    /// Sum of every wallet balance
    pub async fn total_balance<'e>(exec: impl SqliteExecutor<'e>) -> Result<Amount, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(balance), 0) FROM wallets")
            .fetch_one(exec)
            .await?;
        Ok(Amount::from_minor_units(total))
    }

    pub async fn count_for_account<'e>(
        exec: impl SqliteExecutor<'e>,
        account_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM wallets WHERE account_id = ?")
            .bind(account_id)
            .fetch_one(exec)
            .await
    }
}
