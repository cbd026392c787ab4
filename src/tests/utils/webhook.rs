use axum::body::Body;
use hmac::{Hmac, Mac};
use http::Request;
use sha2::Sha256;

pub const TEST_WEBHOOK_SECRET: &str = "ABCDEF";

pub fn sign(body: &str, secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Creates a webhook request signed with [`TEST_WEBHOOK_SECRET`].
pub fn create_webhook_request(event: &str, body: &str) -> Request<Body> {
    create_webhook_request_with_signature(event, body, &sign(body, TEST_WEBHOOK_SECRET))
}

pub fn create_webhook_request_with_signature(
    event: &str,
    body: &str,
    signature: &str,
) -> Request<Body> {
    Request::post("/github")
        .header("x-github-event", event)
        .header("x-hub-signature-256", signature)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
