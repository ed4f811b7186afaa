//! HTTP-level tests for the contact form, newsletter sign-up and their
//! admin views.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, delete_with_cookie, get, get_with_cookie, json_request};
use serde_json::json;

#[tokio::test]
async fn contact_form_lifecycle() {
    let app = build_test_app();
    let cookie = app.admin_cookie().await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/contact",
            json!({
                "name": "Jane Doe",
                "email": "Jane@Example.com",
                "company": "Acme",
                "message": "Do you ship to Norway?"
            }),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let contact = body_json(response).await["data"].clone();
    assert_eq!(contact["email"], "jane@example.com");
    assert_eq!(contact["status"], "new");
    let slug = contact["slug"].as_str().unwrap().to_string();

    // Public callers cannot read the inbox.
    let response = app.send(get("/api/v1/admin/contacts")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(get_with_cookie("/api/v1/admin/contacts?status=new", &cookie))
        .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/admin/contacts/{slug}/status"),
            json!({ "status": "replied" }),
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "replied");

    let response = app
        .send(get_with_cookie("/api/v1/admin/contacts?status=new", &cookie))
        .await;
    assert_eq!(body_json(response).await["data"], json!([]));

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/admin/contacts/{slug}/status"),
            json!({ "status": "archived" }),
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/admin/contacts/{slug}");
    let response = app.send(delete_with_cookie(&uri, &cookie)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.send(get_with_cookie(&uri, &cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn contact_form_validates_required_fields() {
    let app = build_test_app();

    for body in [
        json!({ "email": "a@b.co", "message": "hi" }),
        json!({ "name": "A", "email": "not-an-email", "message": "hi" }),
        json!({ "name": "A", "email": "a@b.co", "message": "   " }),
    ] {
        let response = app
            .send(json_request(Method::POST, "/api/v1/contact", body.clone(), None))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn newsletter_subscribe_unsubscribe_resubscribe() {
    let app = build_test_app();

    let subscribe = || {
        json_request(
            Method::POST,
            "/api/v1/newsletter/subscribe",
            json!({ "email": "Fan@Example.com" }),
            None,
        )
    };

    let response = app.send(subscribe()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await["data"].clone();
    assert_eq!(first["email"], "fan@example.com");
    assert_eq!(first["status"], "active");

    let response = app.send(subscribe()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/newsletter/unsubscribe",
            json!({ "email": "fan@example.com" }),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "inactive");

    let response = app.send(subscribe()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let again = body_json(response).await["data"].clone();
    assert_eq!(again["id"], first["id"]);
    assert_eq!(again["status"], "active");
    assert!(again["unsubscribed_at"].is_null());
}

#[tokio::test]
async fn unsubscribe_link_by_slug() {
    let app = build_test_app();
    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/newsletter/subscribe",
            json!({ "email": "reader@example.com" }),
            None,
        ))
        .await;
    let slug = body_json(response).await["data"]["slug"]
        .as_str()
        .unwrap()
        .to_string();

    let uri = format!("/api/v1/newsletter/unsubscribe/{slug}");
    let response = app.send(get(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "inactive");

    // Following the link twice is harmless.
    let response = app.send(get(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(get("/api/v1/newsletter/unsubscribe/does-not-exist"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_email_unsubscribe_is_not_found() {
    let app = build_test_app();
    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/newsletter/unsubscribe",
            json!({ "email": "ghost@example.com" }),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_newsletter_and_dashboard() {
    let app = build_test_app();
    let cookie = app.admin_cookie().await;

    for email in ["a@example.com", "b@example.com"] {
        app.send(json_request(
            Method::POST,
            "/api/v1/newsletter/subscribe",
            json!({ "email": email }),
            None,
        ))
        .await;
    }
    app.send(json_request(
        Method::POST,
        "/api/v1/newsletter/unsubscribe",
        json!({ "email": "b@example.com" }),
        None,
    ))
    .await;
    app.send(json_request(
        Method::POST,
        "/api/v1/contact",
        json!({ "name": "C", "email": "c@example.com", "message": "hello" }),
        None,
    ))
    .await;

    let response = app
        .send(get_with_cookie("/api/v1/admin/newsletter?status=active", &cookie))
        .await;
    let active = body_json(response).await["data"].clone();
    assert_eq!(active.as_array().unwrap().len(), 1);
    assert_eq!(active[0]["email"], "a@example.com");

    let response = app
        .send(get_with_cookie("/api/v1/admin/dashboard", &cookie))
        .await;
    let inbox = body_json(response).await["data"]["inbox"].clone();
    assert_eq!(inbox["contacts"], 1);
    assert_eq!(inbox["contacts_new"], 1);
    assert_eq!(inbox["subscribers"], 2);
    assert_eq!(inbox["subscribers_active"], 1);

    let slug = active[0]["slug"].as_str().unwrap().to_string();
    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/admin/newsletter/{slug}/status"),
            json!({ "status": "inactive" }),
            Some(&cookie),
        ))
        .await;
    assert_eq!(body_json(response).await["data"]["status"], "inactive");

    let uri = format!("/api/v1/admin/newsletter/{slug}");
    let response = app.send(delete_with_cookie(&uri, &cookie)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.send(delete_with_cookie(&uri, &cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(get_with_cookie("/api/v1/admin/newsletter?status=bogus", &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
