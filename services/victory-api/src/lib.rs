//! HTTP front end for Victory identity verification.
//!
//! # Endpoints
//!
//! - `POST /api/v1/validate` - Is a public key registered
//! - `POST /api/v1/register` - Submit a registration, mails a code
//! - `POST /api/v1/update` - Submit an alias or email change, mails a code
//! - `GET /api/v1/user?email=` - Alias for an email
//! - `POST /api/v1/verify-registration` - Redeem a registration code
//! - `POST /api/v1/verify-update` - Redeem an update code
//! - `GET /health` - Health check

pub mod config;
pub mod dto;
pub mod handlers;
pub mod mailer;
pub mod router;
pub mod state;
pub mod sweeper;
pub mod template;

pub use config::{ConfigError, ServiceConfig};
pub use router::create_router;
pub use state::AppState;
