//! Payment identifier generation
//!
//! `alice@x.com` becomes `alice@mockupi`; if that is taken, `alice1@mockupi`,
//! then `alice2@mockupi`, and so on.

use super::repository::AccountRepository;
use super::validation::Email;
use sqlx::SqliteConnection;

/// Domain suffix of every generated payment identifier
pub const UPI_DOMAIN: &str = "mockupi";

/// The `n`-th candidate for a local part (`n == 0` carries no suffix)
pub fn candidate(local_part: &str, n: u32) -> String {
    if n == 0 {
        format!("{}@{}", local_part, UPI_DOMAIN)
    } else {
        format!("{}{}@{}", local_part, n, UPI_DOMAIN)
    }
}

/// First candidate for `email` that no account holds.
///
/// Every candidate is checked against the store, so call this on the same
/// connection (and under the same write gate) that will insert the account.
pub async fn generate_unique(
    conn: &mut SqliteConnection,
    email: &Email,
) -> Result<String, sqlx::Error> {
    let local_part = email.local_part();

    for n in 0..=u32::MAX {
        let upi_id = candidate(local_part, n);
        if !AccountRepository::upi_id_exists(&mut *conn, &upi_id).await? {
            if n > 0 {
                tracing::debug!(%upi_id, attempts = n + 1, "Resolved payment ID collision");
            }
            return Ok(upi_id);
        }
    }

    Err(sqlx::Error::Protocol(format!(
        "payment ID space exhausted for '{}'",
        local_part
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_candidate_format() {
        assert_eq!(candidate("alice", 0), "alice@mockupi");
        assert_eq!(candidate("bob", 1), "bob1@mockupi");
        assert_eq!(candidate("bob", 12), "bob12@mockupi");
    }

    async fn insert(conn: &mut SqliteConnection, email: &str, upi_id: &str) {
        AccountRepository::insert(conn, "T", email, "hash", upi_id, 0)
            .await
            .expect("insert");
    }

    #[tokio::test]
    async fn test_generate_without_collision() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let email = Email::parse("alice@x.com").unwrap();
        let upi_id = generate_unique(&mut conn, &email).await.unwrap();
        assert_eq!(upi_id, "alice@mockupi");
    }

    #[tokio::test]
    async fn test_generate_skips_taken_candidates() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        insert(&mut conn, "bob@x.com", "bob@mockupi").await;
        let email = Email::parse("bob@y.com").unwrap();
        assert_eq!(
            generate_unique(&mut conn, &email).await.unwrap(),
            "bob1@mockupi"
        );

        insert(&mut conn, "bob@y.com", "bob1@mockupi").await;
        // bob2 is free even though bob3 is taken
        insert(&mut conn, "other@z.com", "bob3@mockupi").await;
        let email = Email::parse("bob@z.com").unwrap();
        assert_eq!(
            generate_unique(&mut conn, &email).await.unwrap(),
            "bob2@mockupi"
        );
    }

    #[tokio::test]
    async fn test_generate_uses_normalized_local_part() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let email = Email::parse("Carol.Smith@Example.com").unwrap();
        assert_eq!(
            generate_unique(&mut conn, &email).await.unwrap(),
            "carol.smith@mockupi"
        );
    }
}
