use commons_config::FcmConfig;
use commons_core::Context;
use reqwest::{header, Client, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::FcmError;
use crate::models::{FcmResponse, Message, Notification};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SEND_PATH: &str = "fcm/send";

/// Client for the FCM legacy HTTP API.
#[derive(Debug, Clone)]
pub struct FcmClient {
    client: Client,
    config: FcmConfig,
}

impl FcmClient {
    pub fn new(config: FcmConfig) -> Result<Self, FcmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Builds a client from `FCM_API_KEY` and `FCM_URL`.
    pub fn from_env() -> Result<Self, FcmError> {
        Self::new(FcmConfig::from_env())
    }

    pub fn config(&self) -> &FcmConfig {
        &self.config
    }

    /// Sends a titled notification, with optional data, to one device.
    pub async fn notify_device(
        &self,
        device_id: &str,
        data: Option<Map<String, Value>>,
        title: &str,
    ) -> Result<FcmResponse, FcmError> {
        let message = Message {
            to: device_id.to_string(),
            notification: Some(Notification::titled(title)),
            data,
            ..Message::default()
        };
        self.send_custom_message(&message).await
    }

    /// Sends a titled notification, with optional data, to several devices at once.
    pub async fn notify_devices(
        &self,
        device_ids: &[String],
        data: Option<Map<String, Value>>,
        title: &str,
    ) -> Result<FcmResponse, FcmError> {
        let message = Message {
            registration_ids: device_ids.to_vec(),
            notification: Some(Notification::titled(title)),
            data,
            ..Message::default()
        };
        self.send_custom_message(&message).await
    }

    /// Sends a fully specified message.
    ///
    /// An `error` reported in an otherwise successful response becomes
    /// [`FcmError::Api`], which still carries the response.
    pub async fn send_custom_message(&self, message: &Message) -> Result<FcmResponse, FcmError> {
        let url = format!("{}/{SEND_PATH}", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, "sending FCM message");

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("key={}", self.config.api_key))
            .json(message)
            .send()
            .await
            .context("client - failed to execute request")?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(FcmResponse::default());
        }
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "FCM rejected the request");
            return Err(FcmError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let response: FcmResponse = response
            .json()
            .await
            .context("unable to unmarshal response body")?;
        match response.error.as_deref() {
            Some(error) if !error.is_empty() => {
                warn!(error = %error, "FCM reported an error");
                Err(FcmError::Api { response })
            }
            _ => Ok(response),
        }
    }
}
