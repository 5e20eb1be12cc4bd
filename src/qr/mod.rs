//! QR artifact generation
//!
//! Each payment identifier maps to one PNG under the artifact directory,
//! named by the md5 of the identifier. Artifacts are written once and never
//! overwritten: the image is rendered to a temp file and hard-linked into
//! place, so a concurrent duplicate render loses the race harmlessly and a
//! half-written file is never visible under the final name.

use image::{ImageFormat, Luma};
use qrcode::QrCode;
use std::fs;
use std::io::{self, Cursor};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::money::CURRENCY;

/// Payee name embedded in every payment URL
pub const PAYEE_NAME: &str = "WalletUser";

/// Public path prefix under which artifacts are served
pub const URL_PREFIX: &str = "/qrcodes";

const EXTENSION: &str = "png";

#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("QR rendering failed: {0}")]
    Render(#[from] image::ImageError),

    #[error("QR artifact I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("QR task failed: {0}")]
    Task(String),
}

/// Reference to a stored artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrArtifact {
    /// File name, `<md5 hex>.png`
    pub key: String,
    pub path: PathBuf,
    /// True if this call wrote the file
    pub created: bool,
}

impl QrArtifact {
    pub fn url(&self) -> String {
        format!("{}/{}", URL_PREFIX, self.key)
    }
}

/// `upi://pay?pa=<id>&pn=WalletUser&cu=INR`
pub fn payment_url(upi_id: &str) -> String {
    format!("upi://pay?pa={}&pn={}&cu={}", upi_id, PAYEE_NAME, CURRENCY)
}

/// Content-addressed file name for an identifier
pub fn artifact_key(upi_id: &str) -> String {
    format!("{:x}.{}", md5::compute(upi_id.as_bytes()), EXTENSION)
}

/// Accepts only names `artifact_key` can produce
pub fn is_valid_key(key: &str) -> bool {
    match key.strip_suffix(".png") {
        Some(stem) => stem.len() == 32 && stem.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')),
        None => false,
    }
}

/// Render the payment URL for `upi_id` as PNG bytes
pub fn render_png(upi_id: &str) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(payment_url(upi_id).as_bytes())?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(240, 240)
        .build();

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Directory-backed artifact store
#[derive(Debug, Clone)]
pub struct QrArtifactStore {
    dir: PathBuf,
}

impl QrArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, upi_id: &str) -> PathBuf {
        self.dir.join(artifact_key(upi_id))
    }

    /// Make sure the artifact for `upi_id` exists; render it only if absent.
    pub fn ensure(&self, upi_id: &str) -> Result<QrArtifact, QrError> {
        let key = artifact_key(upi_id);
        let path = self.dir.join(&key);

        if path.exists() {
            return Ok(QrArtifact {
                key,
                path,
                created: false,
            });
        }

        fs::create_dir_all(&self.dir)?;
        let bytes = render_png(upi_id)?;

        let nonce: [u8; 8] = rand::random();
        let tmp = self.dir.join(format!(".{}.{}.tmp", key, hex::encode(nonce)));
        fs::write(&tmp, &bytes)?;

        let linked = fs::hard_link(&tmp, &path);
        let _ = fs::remove_file(&tmp);

        let created = match linked {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => false,
            Err(e) => return Err(e.into()),
        };

        if created {
            tracing::info!(%upi_id, key = %key, "QR artifact generated");
        }

        Ok(QrArtifact { key, path, created })
    }

    /// [`ensure`](Self::ensure) on the blocking pool
    pub async fn ensure_async(self: Arc<Self>, upi_id: String) -> Result<QrArtifact, QrError> {
        tokio::task::spawn_blocking(move || self.ensure(&upi_id))
            .await
            .map_err(|e| QrError::Task(e.to_string()))?
    }

    /// Read an artifact by key. `None` for unknown or malformed keys.
    pub async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, QrError> {
        if !is_valid_key(key) {
            return Ok(None);
        }
        match tokio::fs::read(self.dir.join(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
