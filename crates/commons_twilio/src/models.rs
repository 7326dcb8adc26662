use serde::{Deserialize, Serialize};

/// Twilio's representation of a queued message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsResponse {
    pub sid: String,
    pub date_created: Option<String>,
    pub date_updated: Option<String>,
    pub date_sent: Option<String>,
    pub account_sid: String,
    pub to: String,
    pub from: String,
    pub num_media: Option<String>,
    pub body: String,
    pub status: String,
    pub direction: Option<String>,
    pub api_version: Option<String>,
    pub price: Option<String>,
    pub uri: Option<String>,
}
