use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn is_false(value: &bool) -> bool {
    !*value
}

/// The user-visible part of a push message. Empty fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(rename = "android_channel_id", skip_serializing_if = "String::is_empty")]
    pub channel_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sound: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub badge: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub click_action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body_loc_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body_loc_args: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title_loc_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title_loc_args: String,
}

impl Notification {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Targets, options and payload of one `fcm/send` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub to: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub registration_ids: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub condition: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub collapse_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub priority: String,
    #[serde(skip_serializing_if = "is_false")]
    pub content_available: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub mutable_content: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub delay_while_idle: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_live: Option<u32>,
    #[serde(skip_serializing_if = "is_false")]
    pub delivery_receipt_requested: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub dry_run: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub restricted_package_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webpush: Option<Map<String, Value>>,
}

/// FCM's answer to a send request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FcmResponse {
    pub multicast_id: i64,
    pub success: i32,
    pub failure: i32,
    pub canonical_ids: i32,
    pub results: Vec<FcmResult>,
    // device group messages
    pub failed_registration_ids: Vec<String>,
    // topic messages
    pub message_id: i64,
    pub error: Option<String>,
}

/// Delivery outcome for one target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FcmResult {
    pub message_id: Option<String>,
    pub registration_id: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_fields_are_omitted() {
        let message = Message {
            to: "device-1".into(),
            notification: Some(Notification::titled("Hello")),
            ..Message::default()
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"to": "device-1", "notification": {"title": "Hello"}})
        );
    }

    #[test]
    fn channel_id_uses_the_android_key() {
        let notification = Notification {
            channel_id: "alerts".into(),
            ..Notification::default()
        };
        assert_eq!(
            serde_json::to_value(&notification).unwrap(),
            json!({"android_channel_id": "alerts"})
        );
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let response: FcmResponse = serde_json::from_value(json!({
            "multicast_id": 7,
            "success": 1,
            "results": [{"message_id": "0:1"}]
        }))
        .unwrap();
        assert_eq!(response.success, 1);
        assert_eq!(response.results[0].message_id.as_deref(), Some("0:1"));
        assert!(response.error.is_none());
    }
}
