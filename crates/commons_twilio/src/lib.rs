// --- File: crates/commons_twilio/src/lib.rs ---

pub mod error; // Client errors and Twilio exceptions
pub mod models; // SMS response
pub mod sms; // The SMS client

pub use commons_config::TwilioConfig;
pub use error::{TwilioError, TwilioException};
pub use models::SmsResponse;
pub use sms::TwilioClient;
