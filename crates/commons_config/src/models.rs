use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MAX_UPLOAD_MEMORY: usize = 20_000_000;
pub const DEFAULT_FCM_URL: &str = "https://fcm.googleapis.com";
pub const DEFAULT_TWILIO_URL: &str = "https://api.twilio.com/2010-04-01";

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub fcm: Option<FcmConfig>,
    #[serde(default)]
    pub twilio: Option<TwilioConfig>,
}

// --- HTTP toolkit ---
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HttpConfig {
    /// In-memory budget for multipart uploads, in bytes. Larger parts spill to disk.
    /// Pass it to `commons_core::extract_files_with` and friends.
    #[serde(default = "default_max_upload_memory")]
    pub max_upload_memory: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_upload_memory: DEFAULT_MAX_UPLOAD_MEMORY,
        }
    }
}

fn default_max_upload_memory() -> usize {
    DEFAULT_MAX_UPLOAD_MEMORY
}

// --- FCM ---
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FcmConfig {
    pub api_key: String,
    #[serde(default = "default_fcm_url")]
    pub base_url: String,
}

fn default_fcm_url() -> String {
    DEFAULT_FCM_URL.to_string()
}

impl FcmConfig {
    /// Reads `FCM_API_KEY` and `FCM_URL`.
    pub fn from_env() -> Self {
        crate::ensure_dotenv_loaded();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup("FCM_API_KEY").unwrap_or_default(),
            base_url: lookup("FCM_URL")
                .filter(|url| !url.is_empty())
                .unwrap_or_else(default_fcm_url),
        }
    }
}

impl fmt::Debug for FcmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FcmConfig")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .finish()
    }
}

// --- Twilio ---
// Either the account SID and auth token or an API key pair authenticate requests.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub phone_number: String,
    #[serde(default = "default_twilio_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key_sid: Option<String>,
    #[serde(default)]
    pub api_key_secret: Option<String>,
}

fn default_twilio_url() -> String {
    DEFAULT_TWILIO_URL.to_string()
}

impl TwilioConfig {
    /// Reads `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_PHONE_NUMBER` and the
    /// optional `TWILIO_API_KEY_SID` / `TWILIO_API_KEY_SECRET`.
    pub fn from_env() -> Self {
        crate::ensure_dotenv_loaded();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            account_sid: lookup("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            auth_token: lookup("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            phone_number: lookup("TWILIO_PHONE_NUMBER").unwrap_or_default(),
            base_url: default_twilio_url(),
            api_key_sid: non_empty("TWILIO_API_KEY_SID"),
            api_key_secret: non_empty("TWILIO_API_KEY_SECRET"),
        }
    }

    /// Username and password for HTTP basic auth. The API key pair wins when set.
    pub fn basic_auth(&self) -> (&str, &str) {
        match &self.api_key_sid {
            Some(key_sid) => (
                key_sid.as_str(),
                self.api_key_secret.as_deref().unwrap_or_default(),
            ),
            None => (self.account_sid.as_str(), self.auth_token.as_str()),
        }
    }
}

impl fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &REDACTED)
            .field("phone_number", &self.phone_number)
            .field("base_url", &self.base_url)
            .field("api_key_sid", &self.api_key_sid)
            .field("api_key_secret", &self.api_key_secret.as_ref().map(|_| REDACTED))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn fcm_defaults_the_base_url() {
        let config = FcmConfig::from_vars(vars(&[("FCM_API_KEY", "k")]));
        assert_eq!(config.api_key, "k");
        assert_eq!(config.base_url, DEFAULT_FCM_URL);

        let config = FcmConfig::from_vars(vars(&[("FCM_URL", "http://localhost:9")]));
        assert_eq!(config.base_url, "http://localhost:9");
    }

    #[test]
    fn twilio_prefers_the_api_key_pair() {
        let base = [
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "token"),
            ("TWILIO_PHONE_NUMBER", "+15550001"),
        ];
        let config = TwilioConfig::from_vars(vars(&base));
        assert_eq!(config.basic_auth(), ("AC123", "token"));
        assert_eq!(config.base_url, DEFAULT_TWILIO_URL);

        let mut with_key = base.to_vec();
        with_key.push(("TWILIO_API_KEY_SID", "SK9"));
        with_key.push(("TWILIO_API_KEY_SECRET", "shh"));
        let config = TwilioConfig::from_vars(vars(&with_key));
        assert_eq!(config.basic_auth(), ("SK9", "shh"));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let fcm = FcmConfig::from_vars(vars(&[("FCM_API_KEY", "top-secret")]));
        let twilio = TwilioConfig::from_vars(vars(&[
            ("TWILIO_AUTH_TOKEN", "token-secret"),
            ("TWILIO_API_KEY_SID", "SK1"),
            ("TWILIO_API_KEY_SECRET", "key-secret"),
        ]));
        let rendered = format!("{fcm:?} {twilio:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("token-secret"));
        assert!(!rendered.contains("key-secret"));
        assert!(rendered.contains("SK1"));
    }

    #[test]
    fn http_config_default() {
        assert_eq!(HttpConfig::default().max_upload_memory, 20_000_000);
    }
}
