//! Wire-format tests: the exact JSON shapes clients depend on. These pin
//! the envelope keys and the canonical role casing so a refactor cannot
//! silently break a consumer.

use chrono::Utc;
use quillpress::models::{
    LoginResponse, Post, PostListResponse, PostResponse, PostSummary, PublicUser, Role,
};
use uuid::Uuid;

fn sample_post() -> Post {
    let now = Utc::now();
    Post {
        id: Uuid::from_u128(7),
        title: "Hello World".to_string(),
        content: "<p>hi</p>".to_string(),
        slug: "hello-world".to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn login_response_shape() {
    let response = LoginResponse {
        success: true,
        user: PublicUser {
            id: Uuid::from_u128(1),
            username: "casey".to_string(),
            role: Role::Admin,
        },
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["user"]["username"], "casey");
    assert_eq!(json["user"]["role"], "ADMIN");
    // Nothing credential-adjacent in the payload.
    assert!(json["user"].get("password").is_none());
    assert!(json["user"].get("password_hash").is_none());
}

#[test]
fn post_response_shape() {
    let response = PostResponse {
        success: true,
        post: sample_post(),
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["post"]["slug"], "hello-world");
    assert_eq!(json["post"]["content"], "<p>hi</p>");
    assert!(json["post"]["created_at"].is_string());
}

#[test]
fn post_listing_omits_content() {
    let post = sample_post();
    let response = PostListResponse {
        success: true,
        posts: vec![PostSummary {
            id: post.id,
            title: post.title,
            slug: post.slug,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }],
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["posts"][0]["title"], "Hello World");
    assert!(json["posts"][0].get("content").is_none());
}

#[test]
fn request_payloads_tolerate_missing_fields() {
    // A body with a missing field deserializes to an empty string, which the
    // validation layer then rejects as a 400. The deserializer itself never
    // produces a 422.
    let payload: quillpress::models::CreatePostRequest =
        serde_json::from_str(r#"{"title": "Only a title"}"#).unwrap();
    assert_eq!(payload.title, "Only a title");
    assert_eq!(payload.content, "");

    let payload: quillpress::models::LoginRequest = serde_json::from_str("{}").unwrap();
    assert!(payload.username.is_empty());
    assert!(payload.password.is_empty());
}
