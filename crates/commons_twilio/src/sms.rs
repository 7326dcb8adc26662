use commons_config::TwilioConfig;
use commons_core::Context;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{TwilioError, TwilioException};
use crate::models::SmsResponse;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends SMS through Twilio's Messages resource.
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: Client,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Builds a client from the `TWILIO_*` environment variables.
    pub fn from_env() -> Result<Self, TwilioError> {
        Self::new(TwilioConfig::from_env())
    }

    pub fn config(&self) -> &TwilioConfig {
        &self.config
    }

    /// Sends `body` to `to` from the configured phone number.
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<SmsResponse, TwilioError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_sid
        );
        let form = [
            ("From", self.config.phone_number.as_str()),
            ("To", to),
            ("Body", body),
        ];
        let (username, password) = self.config.basic_auth();

        let response = self
            .client
            .post(&url)
            .basic_auth(username, Some(password))
            .form(&form)
            .send()
            .await
            .context("unable to do request")?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response
                .text()
                .await
                .with_context(|| format!("unable to read exception response, status code={status}"))?;
            warn!(status = status.as_u16(), "Twilio rejected the message");
            return Err(match serde_json::from_str::<TwilioException>(&body) {
                Ok(exception) => TwilioError::Exception(exception),
                Err(_) => TwilioError::UnexpectedResponse {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let sms: SmsResponse = response
            .json()
            .await
            .context("unable to unmarshal response")?;
        info!(sid = %sms.sid, "SMS queued");
        Ok(sms)
    }
}
