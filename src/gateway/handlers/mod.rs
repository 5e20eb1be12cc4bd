pub mod api;
pub mod health;
pub mod pages;
pub mod qr;

pub use api::{create_transfer, get_account, get_history};
pub use health::{HealthResponse, health_check};
pub use pages::{dashboard, history, index, transfer};
pub use qr::qr_image;

