use std::sync::Arc;

use crate::account::Database;
use crate::config::AppConfig;
use crate::qr::QrArtifactStore;
use crate::user_auth::UserAuthService;

/// Shared gateway state, handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Account, wallet and ledger store
    pub db: Arc<Database>,
    /// QR artifact directory
    pub qr: Arc<QrArtifactStore>,
    /// Registration, login and session tokens
    pub user_auth: Arc<UserAuthService>,
    /// Mark session cookies `Secure`
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        qr: Arc<QrArtifactStore>,
        user_auth: Arc<UserAuthService>,
        cookie_secure: bool,
    ) -> Self {
        Self {
            db,
            qr,
            user_auth,
            cookie_secure,
        }
    }

    /// Open the store and wire every service from configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self, sqlx::Error> {
        let db = Arc::new(Database::connect(&config.database_url).await?);
        let qr = Arc::new(QrArtifactStore::new(config.qr.dir.clone()));
        let user_auth = Arc::new(UserAuthService::new(
            db.clone(),
            qr.clone(),
            config.secret_key.clone(),
            config.session.ttl_hours,
        ));
        Ok(Self::new(db, qr, user_auth, config.session.cookie_secure))
    }
}
