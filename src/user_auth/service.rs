use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::account::{
    Account, AccountRepository, Database, NewAccount, STARTING_BALANCE, ValidationError,
    WalletRepository, upi_id,
};
use crate::db::is_unique_violation;
use crate::qr::{QrArtifact, QrArtifactStore, QrError};

/// Session token claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (account id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Email already registered. Please use a different email or log in.")]
    EmailTaken,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Storage(sqlx::Error),

    #[error("QR artifact failed: {0}")]
    Artifact(#[from] QrError),
}

impl RegistrationError {
    /// User input problem, as opposed to a server-side failure
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RegistrationError::Invalid(_) | RegistrationError::EmailTaken
        )
    }

    pub fn user_message(&self) -> String {
        if self.is_user_error() {
            self.to_string()
        } else {
            "Registration failed. Please try again later.".to_string()
        }
    }
}

impl From<sqlx::Error> for RegistrationError {
    fn from(e: sqlx::Error) -> Self {
        // Lost a race with another registration for the same email
        let email_conflict = is_unique_violation(&e) && e.to_string().contains("accounts.email");
        if email_conflict {
            RegistrationError::EmailTaken
        } else {
            RegistrationError::Storage(e)
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or wrong password; deliberately indistinguishable
    #[error("Invalid email or password. Please try again.")]
    InvalidCredentials,

    #[error("Invalid or expired session")]
    InvalidSession,

    #[error("Failed to issue session: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Newly registered account plus its QR artifact
#[derive(Debug, Clone)]
pub struct Registration {
    pub account: Account,
    pub qr: QrArtifact,
}

pub struct UserAuthService {
    db: Arc<Database>,
    qr: Arc<QrArtifactStore>,
    jwt_secret: String,
    session_ttl: Duration,
}

impl UserAuthService {
    pub fn new(
        db: Arc<Database>,
        qr: Arc<QrArtifactStore>,
        jwt_secret: String,
        session_ttl_hours: i64,
    ) -> Self {
        Self {
            db,
            qr,
            jwt_secret,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Register a new account with its wallet and QR artifact.
    ///
    /// Email check, payment ID resolution and both inserts share one
    /// transaction under the write gate. The QR artifact is rendered after
    /// commit; failing to render fails the call but keeps the account.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Registration, RegistrationError> {
        // 1. Validate input
        let new_account = NewAccount::new(name, email, password)?;

        // 2. Hash password
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(new_account.password().as_bytes(), &salt)
            .map_err(|e| RegistrationError::Hashing(e.to_string()))?
            .to_string();

        // 3. Insert account + wallet
        let account_id = {
            let _gate = self.db.write_gate().await;
            let mut tx = self.db.pool().begin().await?;

            let email = new_account.email();
            if AccountRepository::email_exists(&mut *tx, email.as_str()).await? {
                return Err(RegistrationError::EmailTaken);
            }

            let upi_id = upi_id::generate_unique(&mut tx, email).await?;
            let account_id = AccountRepository::insert(
                &mut tx,
                new_account.name(),
                email.as_str(),
                &password_hash,
                &upi_id,
                Utc::now().timestamp_millis(),
            )
            .await?;
            WalletRepository::create(&mut tx, account_id, STARTING_BALANCE).await?;

            tx.commit().await?;
            account_id
        };

        let account = AccountRepository::get_by_id(self.db.pool(), account_id)
            .await?
            .ok_or(RegistrationError::Storage(sqlx::Error::RowNotFound))?;

        tracing::info!(
            account_id,
            upi_id = %account.upi_id,
            "Account registered"
        );

        // 4. QR artifact
        let qr = self.qr.clone().ensure_async(account.upi_id.clone()).await?;

        Ok(Registration { account, qr })
    }

    /// Check credentials. Unknown email and wrong password fail the same way.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = email.trim().to_lowercase();

        // 1. Find account by email
        let account = AccountRepository::get_by_email(self.db.pool(), &email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // 2. Verify password
        let parsed_hash =
            PasswordHash::new(&account.password_hash).map_err(|_| AuthError::InvalidCredentials)?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        Ok(account)
    }

    /// Issue a signed session token for an account
    pub fn issue_session(&self, account_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            exp: (now + self.session_ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?)
    }

    /// Verify a session token and return the account id it is bound to
    pub fn verify_session(&self, token: &str) -> Result<i64, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data =
            decode::<Claims>(token, &decoding_key, &validation).map_err(|_| AuthError::InvalidSession)?;
        token_data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidSession)
    }

    /// Resolve a session token to a live account.
    ///
    /// `Ok(None)` means the token was valid but its account is gone.
    pub async fn session_account(&self, token: &str) -> Result<Option<Account>, AuthError> {
        let account_id = self.verify_session(token)?;
        Ok(AccountRepository::get_by_id(self.db.pool(), account_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::LedgerRepository;

    struct Harness {
        service: UserAuthService,
        db: Arc<Database>,
        _dir: tempfile::TempDir,
    }

    async fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::connect("sqlite::memory:").await.unwrap());
        let qr = Arc::new(QrArtifactStore::new(dir.path()));
        let service = UserAuthService::new(db.clone(), qr, "test-secret".to_string(), 24);
        Harness {
            service,
            db,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_register_creates_account_wallet_and_qr() {
        let h = harness().await;
        let reg = h
            .service
            .register("Alice", "Alice@X.com", "pw1")
            .await
            .unwrap();

        assert_eq!(reg.account.upi_id, "alice@mockupi");
        assert_eq!(reg.account.email, "alice@x.com");
        assert_ne!(reg.account.password_hash, "pw1");
        assert!(reg.qr.created);
        assert!(reg.qr.path.exists());

        let wallet = WalletRepository::get_by_account(h.db.pool(), reg.account.id)
            .await
            .unwrap()
            .expect("wallet must exist");
        assert_eq!(wallet.balance, STARTING_BALANCE);
        assert_eq!(
            WalletRepository::count_for_account(h.db.pool(), reg.account.id)
                .await
                .unwrap(),
            1
        );
        assert_eq!(LedgerRepository::count(h.db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_resolves_payment_id_collision() {
        let h = harness().await;
        let first = h.service.register("Bob", "bob@x.com", "pw").await.unwrap();
        let second = h.service.register("Bob Two", "bob@y.com", "pw").await.unwrap();
        let third = h.service.register("Bob Three", "BOB@z.com", "pw").await.unwrap();

        assert_eq!(first.account.upi_id, "bob@mockupi");
        assert_eq!(second.account.upi_id, "bob1@mockupi");
        assert_eq!(third.account.upi_id, "bob2@mockupi");
        assert_ne!(first.qr.key, second.qr.key);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email_case_insensitively() {
        let h = harness().await;
        h.service.register("Alice", "alice@x.com", "pw").await.unwrap();

        let err = h
            .service
            .register("Alice Again", " ALICE@X.COM ", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::EmailTaken));
        assert!(err.is_user_error());
    }

    #[tokio::test]
    async fn test_register_validation_errors() {
        let h = harness().await;

        let err = h.service.register("", "a@x.com", "pw").await.unwrap_err();
        assert_eq!(err.user_message(), "All fields are required.");

        let err = h.service.register("A", "ax.com", "pw").await.unwrap_err();
        assert_eq!(err.user_message(), "Please enter a valid email address.");
    }

    #[tokio::test]
    async fn test_unique_backstop_mapping() {
        let h = harness().await;
        let mut conn = h.db.pool().acquire().await.unwrap();
        AccountRepository::insert(&mut conn, "A", "a@x.com", "h", "a@mockupi", 0)
            .await
            .unwrap();

        let err = AccountRepository::insert(&mut conn, "A", "a@x.com", "h", "a1@mockupi", 0)
            .await
            .unwrap_err();
        assert!(matches!(
            RegistrationError::from(err),
            RegistrationError::EmailTaken
        ));

        let err = AccountRepository::insert(&mut conn, "B", "b@x.com", "h", "a@mockupi", 0)
            .await
            .unwrap_err();
        assert!(matches!(
            RegistrationError::from(err),
            RegistrationError::Storage(_)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_get_distinct_ids() {
        let h = harness().await;
        let service = Arc::new(h.service);

        let mut handles = Vec::new();
        for i in 0..5 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .register("Bob", &format!("bob@host{}.com", i), "pw")
                    .await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().account.upi_id);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5, "payment IDs must be unique: {:?}", ids);
    }

    #[tokio::test]
    async fn test_login_success_and_generic_failure() {
        let h = harness().await;
        let reg = h.service.register("Alice", "alice@x.com", "pw1").await.unwrap();

        let account = h.service.login(" Alice@x.com", "pw1").await.unwrap();
        assert_eq!(account.id, reg.account.id);

        let wrong_pw = h.service.login("alice@x.com", "nope").await.unwrap_err();
        let unknown = h.service.login("ghost@x.com", "pw1").await.unwrap_err();
        assert!(matches!(wrong_pw, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_session_round_trip_and_stale_account() {
        let h = harness().await;
        let reg = h.service.register("Alice", "alice@x.com", "pw1").await.unwrap();

        let token = h.service.issue_session(reg.account.id).unwrap();
        assert_eq!(h.service.verify_session(&token).unwrap(), reg.account.id);

        let live = h.service.session_account(&token).await.unwrap();
        assert_eq!(live.map(|a| a.id), Some(reg.account.id));

        AccountRepository::delete_account(&h.db, reg.account.id)
            .await
            .unwrap();
        assert!(h.service.session_account(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_rejects_foreign_or_tampered_tokens() {
        let h = harness().await;
        let other = UserAuthService::new(
            h.db.clone(),
            Arc::new(QrArtifactStore::new(h._dir.path())),
            "another-secret".to_string(),
            24,
        );

        let foreign = other.issue_session(1).unwrap();
        assert!(matches!(
            h.service.verify_session(&foreign),
            Err(AuthError::InvalidSession)
        ));
        assert!(matches!(
            h.service.verify_session("not-a-token"),
            Err(AuthError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let h = harness().await;
        let expired = UserAuthService::new(
            h.db.clone(),
            Arc::new(QrArtifactStore::new(h._dir.path())),
            "test-secret".to_string(),
            -2,
        );
        let token = expired.issue_session(1).unwrap();
        assert!(matches!(
            h.service.verify_session(&token),
            Err(AuthError::InvalidSession)
        ));
    }
}
