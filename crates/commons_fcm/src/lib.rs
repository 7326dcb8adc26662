//! Firebase Cloud Messaging client for the legacy `fcm/send` HTTP endpoint.
//!
//! ```no_run
//! use commons_fcm::FcmClient;
//!
//! # async fn run() -> Result<(), commons_fcm::FcmError> {
//! let client = FcmClient::from_env()?;
//! let response = client.notify_device("device-token", None, "You have mail").await?;
//! println!("delivered: {}", response.success);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;

pub use client::FcmClient;
pub use commons_config::FcmConfig;
pub use error::FcmError;
pub use models::{FcmResponse, FcmResult, Message, Notification};
