use contact_relay::prelude::*;
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn filled() -> ContactForm {
    let mut form = ContactForm::new();
    form.set(Field::Name, "Ana");
    form.set(Field::Email, "ana@x.com");
    form.set(Field::Message, "Hi");
    form
}

fn endpoint(server: &MockServer) -> Url {
    Url::parse(&server.url("/api/sendEmail")).unwrap()
}

#[tokio::test]
async fn success_clears_fields() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/sendEmail")
                .header("content-type", "application/json")
                .json_body(json!({"name": "Ana", "email": "ana@x.com", "message": "Hi"}));
            then.status(200)
                .json_body(json!({"success": true, "userMail": {"id": "1"}}));
        })
        .await;
    let mut form = filled();

    let status = form.submit(&client(), &endpoint(&server)).await;

    mock.assert_async().await;
    assert_eq!(status, Status::Sent);
    assert!(status.to_string().contains("success"));
    assert_eq!(form.status_tone(), StatusTone::Success);
    for field in Field::ALL {
        assert_eq!(form.value(field), "");
    }
    assert!(!form.is_loading());
    assert!(form.can_submit());
}

#[tokio::test]
async fn failure_envelope_keeps_fields() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/sendEmail");
            then.status(500)
                .json_body(json!({"success": false, "error": {"name": "missing_api_key"}}));
        })
        .await;
    let mut form = filled();

    let status = form.submit(&client(), &endpoint(&server)).await;

    assert_eq!(status, Status::Failed);
    assert_eq!(status.to_string(), "❌ Failed to send email.");
    assert_eq!(form.status_tone(), StatusTone::Failure);
    assert_eq!(form.fields(), filled().fields());
    assert!(!form.is_loading());
}

#[tokio::test]
async fn unreadable_answer_is_an_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/sendEmail");
            then.status(502).body("<html>Bad Gateway</html>");
        })
        .await;
    let mut form = filled();

    let status = form.submit(&client(), &endpoint(&server)).await;

    assert_eq!(status, Status::Errored);
    assert_eq!(form.status(), Some(Status::Errored));
    assert_eq!(form.value(Field::Message), "Hi");
    assert!(!form.is_loading());
}

#[tokio::test]
async fn unreachable_endpoint_is_an_error_status() {
    // Nothing listens on the discard port.
    let endpoint = Url::parse("http://127.0.0.1:9/api/sendEmail").unwrap();
    let mut form = filled();

    let status = form.submit(&client(), &endpoint).await;

    assert_eq!(status, Status::Errored);
    assert_eq!(status.to_string(), "❌ Error sending email.");
    assert_eq!(form.value(Field::Name), "Ana");
    assert!(form.can_submit());
    assert_eq!(form.submit_label(), "Send Message");
}

#[tokio::test]
async fn every_submit_is_one_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/sendEmail");
            then.status(500).json_body(json!({"success": false, "error": {}}));
        })
        .await;
    let mut form = filled();

    form.submit(&client(), &endpoint(&server)).await;
    form.submit(&client(), &endpoint(&server)).await;

    assert_eq!(mock.hits_async().await, 2);
}

#[tokio::test]
async fn reply_without_success_key_is_a_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/sendEmail");
            then.status(500).json_body(json!({"error": "boom"}));
        })
        .await;
    let mut form = filled();

    let status = form.submit(&client(), &endpoint(&server)).await;

    assert_eq!(status, Status::Failed);
    assert_eq!(form.value(Field::Email), "ana@x.com");
}

#[tokio::test]
async fn button_shows_sending_while_in_flight() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/sendEmail");
            then.status(200)
                .json_body(json!({"success": true, "userMail": {}}))
                .delay(Duration::from_millis(300));
        })
        .await;
    let mut form = filled();
    let mut button = form.submit_button();
    assert!(button.enabled());
    assert_eq!(button.label(), "Send Message");
    let client = client();
    let endpoint = endpoint(&server);

    let (status, during) = tokio::join!(form.submit(&client, &endpoint), async {
        assert!(button.changed().await);
        (button.is_loading(), button.enabled(), button.label())
    });

    assert_eq!(during, (true, false, "Sending..."));
    assert_eq!(status, Status::Sent);
    assert!(button.enabled());
    assert_eq!(button.label(), "Send Message");
    assert!(form.can_submit());
}

#[tokio::test]
async fn dropped_submit_clears_loading() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/sendEmail");
            then.status(200)
                .json_body(json!({"success": true}))
                .delay(Duration::from_secs(5));
        })
        .await;
    let mut form = filled();
    let button = form.submit_button();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(100),
        form.submit(&client(), &endpoint(&server)),
    )
    .await;

    assert!(abandoned.is_err());
    assert!(!form.is_loading());
    assert!(form.can_submit());
    assert_eq!(form.submit_label(), "Send Message");
    assert!(button.enabled());
    assert_eq!(form.status(), None);
    assert_eq!(form.value(Field::Name), "Ana");
}
