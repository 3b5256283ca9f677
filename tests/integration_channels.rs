#![allow(clippy::unwrap_used, clippy::missing_panics_doc, unreachable_pub, missing_debug_implementations)]
use reqwest::StatusCode;
use serde_json::json;
mod common;

fn channel<'a>(body: &'a serde_json::Value, name: &str) -> &'a serde_json::Value {
    body["channels"].as_array().unwrap().iter().find(|c| c["channel"] == name).unwrap()
}

#[tokio::test]
async fn test_whatsapp_without_api_presents_deep_link() {
    let app = common::TestApp::spawn().await;

    let resp = app.post_contact(&common::ana()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    let whatsapp = channel(&body, "whatsapp");
    assert_eq!(whatsapp["success"], true);
    let link = whatsapp["link"].as_str().unwrap();
    assert!(link.starts_with("https://wa.me/966504877945?text="));
    assert!(link.contains("Ana"));
    assert!(!link.contains(' '));
}

#[tokio::test]
async fn test_whatsapp_api_receives_composed_message() {
    let sink = common::TestSink::spawn(StatusCode::OK, json!({ "ok": true })).await;
    let config = common::get_test_config(&["--whatsapp-api-endpoint", &sink.url, "--whatsapp-api-token", "tok"]);
    let app = common::TestApp::spawn_with(config, common::RecordingMailer::default()).await;

    let resp = app.post_contact(&common::ana()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    let whatsapp = channel(&body, "whatsapp");
    assert_eq!(whatsapp["success"], true);
    assert!(whatsapp.get("link").is_none());

    let received = sink.received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["to"], "966504877945");
    assert!(received[0]["message"].as_str().unwrap().contains("*Name:* Ana"));
}

#[tokio::test]
async fn test_secondary_failure_does_not_fail_submission() {
    let sink = common::TestSink::spawn(StatusCode::BAD_GATEWAY, json!({ "error": "down" })).await;
    let config = common::get_test_config(&["--channels", "email,relay", "--relay-endpoint", &sink.url]);
    let app = common::TestApp::spawn_with(config, common::RecordingMailer::default()).await;

    let resp = app.post_contact(&common::ana()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(channel(&body, "email")["success"], true);
    assert_eq!(channel(&body, "relay")["success"], false);
    assert!(channel(&body, "relay")["error"].is_string());
    assert_eq!(app.audit_lines().await.len(), 1);
}

#[tokio::test]
async fn test_relay_as_primary_forwards_submission() {
    let sink = common::TestSink::spawn(StatusCode::OK, json!({ "success": true })).await;
    let config = common::get_test_config(&[
        "--channels",
        "relay",
        "--primary-channel",
        "relay",
        "--relay-endpoint",
        &sink.url,
    ]);
    let app = common::TestApp::spawn_with(config, common::RecordingMailer::default()).await;
    let mut payload = common::ana();
    payload["phone"] = json!("+15551234567");

    let resp = app.post_contact(&payload).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(app.mailer.sent.lock().await.is_empty());

    let received = sink.received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["name"], "Ana");
    assert_eq!(received[0]["email"], "ana@x.com");
    assert_eq!(received[0]["phone"], "+15551234567");
    assert_eq!(received[0]["subject"], "Hi");
    assert_eq!(received[0]["message"], "Hello");
    assert!(received[0]["timestamp"].is_string());
}

#[tokio::test]
async fn test_relay_reporting_failure_fails_primary() {
    let sink = common::TestSink::spawn(StatusCode::OK, json!({ "success": false, "error": "quota exceeded" })).await;
    let config = common::get_test_config(&[
        "--channels",
        "relay",
        "--primary-channel",
        "relay",
        "--relay-endpoint",
        &sink.url,
    ]);
    let app = common::TestApp::spawn_with(config, common::RecordingMailer::default()).await;

    let resp = app.post_contact(&common::ana()).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Failed to send message via relay");
    let relay = channel(&body, "relay");
    assert!(relay["error"].as_str().unwrap().contains("quota exceeded"));
    assert_eq!(app.audit_lines().await.len(), 1);
}

#[tokio::test]
async fn test_unconfigured_primary_is_a_delivery_failure() {
    let config = common::get_test_config(&["--channels", "relay", "--primary-channel", "relay"]);
    let app = common::TestApp::spawn_with(config, common::RecordingMailer::default()).await;

    let resp = app.post_contact(&common::ana()).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(channel(&body, "relay")["error"], "Channel is not configured: missing relay endpoint");
}

#[tokio::test]
async fn test_plain_text_channels_receive_values_verbatim() {
    let relay = common::TestSink::spawn(StatusCode::OK, json!({ "success": true })).await;
    let whatsapp_api = common::TestSink::spawn(StatusCode::OK, json!({ "ok": true })).await;
    let config = common::get_test_config(&[
        "--channels",
        "email,whatsapp,relay",
        "--relay-endpoint",
        &relay.url,
        "--whatsapp-api-endpoint",
        &whatsapp_api.url,
    ]);
    let app = common::TestApp::spawn_with(config, common::RecordingMailer::default()).await;
    let payload = json!({
        "name": "Tom & Jerry",
        "email": "o'brien@x.com",
        "subject": "Q&A",
        "message": "2 < 3"
    });

    let resp = app.post_contact(&payload).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let forwarded = relay.received.lock().await;
    assert_eq!(forwarded[0]["name"], "Tom & Jerry");
    assert_eq!(forwarded[0]["email"], "o'brien@x.com");
    assert_eq!(forwarded[0]["subject"], "Q&A");
    assert_eq!(forwarded[0]["message"], "2 < 3");
    drop(forwarded);

    let messages = whatsapp_api.received.lock().await;
    let text = messages[0]["message"].as_str().unwrap();
    assert!(text.contains("*Name:* Tom & Jerry"));
    assert!(text.contains("*Email:* o'brien@x.com"));
    assert!(text.contains("2 < 3"));
    assert!(!text.contains("&amp;") && !text.contains("&#39;") && !text.contains("&lt;"));
    drop(messages);

    let sent = app.mailer.sent.lock().await;
    assert_eq!(sent[0].reply_to, "o'brien@x.com");
    assert_eq!(sent[0].reply_to_name, "Tom & Jerry");
    assert!(sent[0].html_body.contains("Tom &amp; Jerry"));
    assert!(sent[0].html_body.contains("2 &lt; 3"));
    drop(sent);

    let lines = app.audit_lines().await;
    assert!(lines[0].ends_with(" - Tom &amp; Jerry (o'brien@x.com) - Q&amp;A"), "{}", lines[0]);
}

#[tokio::test]
async fn test_deep_link_carries_unescaped_text() {
    let app = common::TestApp::spawn().await;
    let mut payload = common::ana();
    payload["name"] = json!("Tom & Jerry");

    let resp = app.post_contact(&payload).await;

    let body: serde_json::Value = resp.json().await.unwrap();
    let link = channel(&body, "whatsapp")["link"].as_str().unwrap();
    assert!(link.contains("Tom%20%26%20Jerry"));
    assert!(!link.contains("amp"));
}
