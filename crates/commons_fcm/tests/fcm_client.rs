use commons_fcm::{FcmClient, FcmConfig, FcmError, Message, Notification};
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> FcmClient {
    FcmClient::new(FcmConfig {
        api_key: "test-key".into(),
        base_url: server.uri(),
    })
    .unwrap()
}

#[tokio::test]
async fn notify_device_posts_a_titled_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fcm/send"))
        .and(header("authorization", "key=test-key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "to": "device-1",
            "notification": {"title": "Hello"},
            "data": {"orderId": 42}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "multicast_id": 99,
            "success": 1,
            "failure": 0,
            "results": [{"message_id": "0:abc"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut data = Map::new();
    data.insert("orderId".into(), Value::from(42));
    let response = client_for(&server)
        .await
        .notify_device("device-1", Some(data), "Hello")
        .await
        .unwrap();

    assert_eq!(response.multicast_id, 99);
    assert_eq!(response.success, 1);
    assert_eq!(response.results[0].message_id.as_deref(), Some("0:abc"));
}

#[tokio::test]
async fn notify_devices_uses_registration_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fcm/send"))
        .and(body_partial_json(json!({"registration_ids": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let ids = vec!["a".to_string(), "b".to_string()];
    let response = client_for(&server)
        .await
        .notify_devices(&ids, None, "Hi all")
        .await
        .unwrap();
    assert_eq!(response.success, 2);
}

#[tokio::test]
async fn no_content_is_an_empty_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let message = Message {
        condition: "'news' in topics".into(),
        notification: Some(Notification::titled("Breaking")),
        ..Message::default()
    };
    let response = client_for(&server)
        .await
        .send_custom_message(&message)
        .await
        .unwrap();
    assert_eq!(response, Default::default());
}

#[tokio::test]
async fn unexpected_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .notify_device("device-1", None, "Hello")
        .await
        .unwrap_err();

    match err {
        FcmError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Unauthorized");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn error_in_body_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "InvalidRegistration"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .notify_device("bad-token", None, "Hello")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "FCM API error: InvalidRegistration");
    assert!(matches!(
        err,
        FcmError::Api { ref response } if response.error.as_deref() == Some("InvalidRegistration")
    ));
}

#[tokio::test]
async fn undecodable_body_is_wrapped_with_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .notify_device("device-1", None, "Hello")
        .await
        .unwrap_err();

    assert!(matches!(err, FcmError::Wrapped(_)));
    assert!(err
        .to_string()
        .starts_with("unable to unmarshal response body: "));
}
