//! Posts, likes, comments and feeds through the full router

mod common;

use axum::http::{Method, StatusCode};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_create_post_with_image() {
    let app = TestApp::new().await;
    let alice = create_test_user(&app, "alice").await;

    let response = app
        .multipart(
            Method::POST,
            "/api/v1/posts",
            Some(&alice.token),
            MultipartBody::new()
                .text("description", "sunset")
                .file("imgurl", "sunset.jpg", "image/jpeg", PNG_BYTES),
        )
        .await;

    assert_success(&response, StatusCode::CREATED);
    assert_eq!(response.data()["description"], "sunset");
    assert_eq!(response.data()["user"], alice.id.to_string());
    let imgurl = response.data()["imgurl"].as_str().unwrap();
    assert!(imgurl.starts_with("http://localhost:8000/uploads/"), "{}", imgurl);
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 1);

    let profile = app.get("/api/v1/users/alice", None).await;
    assert_eq!(profile.data()["posts"][0], response.data()["id"]);
}

#[tokio::test]
async fn test_create_post_requires_content_and_session() {
    let app = TestApp::new().await;
    let alice = create_test_user(&app, "alice").await;

    let empty = app
        .multipart(
            Method::POST,
            "/api/v1/posts",
            Some(&alice.token),
            MultipartBody::new().text("description", "   "),
        )
        .await;
    assert_failure(&empty, StatusCode::BAD_REQUEST, "Post must have a description or an image");

    let anonymous = app
        .multipart(
            Method::POST,
            "/api/v1/posts",
            None,
            MultipartBody::new().text("description", "hello"),
        )
        .await;
    assert_failure_status(&anonymous, StatusCode::UNAUTHORIZED);

    let too_long = app
        .multipart(
            Method::POST,
            "/api/v1/posts",
            Some(&alice.token),
            MultipartBody::new().text("description", &"x".repeat(501)),
        )
        .await;
    assert_failure_status(&too_long, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_like_toggles() {
    let app = TestApp::new().await;
    let alice = create_test_user(&app, "alice").await;
    let bob = create_test_user(&app, "bob").await;
    let post = create_text_post(&app, &alice, "hello").await;
    let uri = format!("/api/v1/posts/{}/like", post);

    let liked = app.put_empty(&uri, Some(&bob.token)).await;
    assert_success(&liked, StatusCode::OK);
    assert_eq!(liked.data(), &json!({ "liked": true, "likes": 1 }));

    let unliked = app.put_empty(&uri, Some(&bob.token)).await;
    assert_eq!(unliked.data(), &json!({ "liked": false, "likes": 0 }));

    let malformed = app.put_empty("/api/v1/posts/nope/like", Some(&bob.token)).await;
    assert_failure_status(&malformed, StatusCode::BAD_REQUEST);

    let missing = app
        .put_empty(&format!("/api/v1/posts/{}/like", Uuid::new_v4()), Some(&bob.token))
        .await;
    assert_failure(&missing, StatusCode::NOT_FOUND, "Post not found");
}

#[tokio::test]
async fn test_comment_flow() {
    let app = TestApp::new().await;
    let alice = create_test_user(&app, "alice").await;
    let bob = create_test_user(&app, "bob").await;
    let post = create_text_post(&app, &alice, "hello").await;
    let uri = format!("/api/v1/comments/{}/comments", post);

    let added = app
        .json(Method::POST, &uri, Some(&bob.token), json!({ "description": "nice one" }))
        .await;
    assert_success(&added, StatusCode::CREATED);
    assert_eq!(added.data()["post"]["id"], post.to_string());
    assert_eq!(added.data()["post"]["comments"].as_array().unwrap().len(), 1);
    assert_eq!(added.data()["comments"][0]["author"]["username"], "bob");

    let listed = app.get(&uri, None).await;
    assert_success(&listed, StatusCode::OK);
    let comments = listed.data().as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["description"], "nice one");
    assert_eq!(comments[0]["user"], bob.id.to_string());

    let detail = app.get(&format!("/api/v1/posts/{}", post), None).await;
    assert_success(&detail, StatusCode::OK);
    assert_eq!(detail.data()["user"]["username"], "alice");
    assert_eq!(detail.data()["comments"][0]["author"]["username"], "bob");
}

#[tokio::test]
async fn test_comment_on_missing_post() {
    let app = TestApp::new().await;
    let bob = create_test_user(&app, "bob").await;

    let missing = app
        .json(
            Method::POST,
            &format!("/api/v1/comments/{}/comments", Uuid::new_v4()),
            Some(&bob.token),
            json!({ "description": "anyone?" }),
        )
        .await;
    assert_failure(&missing, StatusCode::NOT_FOUND, "Post not found");

    let malformed = app.get("/api/v1/comments/123/comments", None).await;
    assert_failure_status(&malformed, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_post_cascades() {
    let app = TestApp::new().await;
    let alice = create_test_user(&app, "alice").await;
    let bob = create_test_user(&app, "bob").await;

    let created = app
        .multipart(
            Method::POST,
            "/api/v1/posts",
            Some(&alice.token),
            MultipartBody::new().file("imgurl", "pic.png", "image/png", PNG_BYTES),
        )
        .await;
    let post = created.data()["id"].as_str().unwrap().to_string();
    app.json(
        Method::POST,
        &format!("/api/v1/comments/{}/comments", post),
        Some(&bob.token),
        json!({ "description": "wow" }),
    )
    .await;

    let forbidden = app.delete(&format!("/api/v1/posts/{}", post), Some(&bob.token)).await;
    assert_failure(&forbidden, StatusCode::UNAUTHORIZED, "You can only delete your own posts");

    let deleted = app.delete(&format!("/api/v1/posts/{}", post), Some(&alice.token)).await;
    assert_success(&deleted, StatusCode::OK);
    assert_eq!(deleted.message(), Some("Post deleted successfully"));

    let gone = app.get(&format!("/api/v1/posts/{}", post), None).await;
    assert_failure(&gone, StatusCode::NOT_FOUND, "Post not found");
    let comments = app.get(&format!("/api/v1/comments/{}/comments", post), None).await;
    assert_failure(&comments, StatusCode::NOT_FOUND, "Post not found");

    let count = app.get("/api/v1/users/alice/posts", None).await;
    assert_eq!(count.data()["posts_count"], 0);
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_update_post() {
    let app = TestApp::new().await;
    let alice = create_test_user(&app, "alice").await;
    let bob = create_test_user(&app, "bob").await;
    let post = create_text_post(&app, &alice, "draft").await;
    let uri = format!("/api/v1/posts/{}", post);

    let updated = app
        .json(Method::PUT, &uri, Some(&alice.token), json!({ "description": "final" }))
        .await;
    assert_success(&updated, StatusCode::OK);
    assert_eq!(updated.data()["description"], "final");

    let other = app
        .json(Method::PUT, &uri, Some(&bob.token), json!({ "description": "mine now" }))
        .await;
    assert_failure(&other, StatusCode::UNAUTHORIZED, "You can only update your own posts");

    let blank = app
        .json(Method::PUT, &uri, Some(&alice.token), json!({ "description": "  " }))
        .await;
    assert_failure_status(&blank, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_posts_by_user_include_author() {
    let app = TestApp::new().await;
    let alice = create_test_user(&app, "alice").await;
    create_text_post(&app, &alice, "hello").await;

    let response = app.get("/api/v1/posts/user/alice", None).await;

    assert_success(&response, StatusCode::OK);
    let posts = response.data().as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["description"], "hello");
    assert_eq!(posts[0]["author"]["username"], "alice");

    let unknown = app.get("/api/v1/posts/user/ghost", None).await;
    assert_failure(&unknown, StatusCode::NOT_FOUND, "User not found");
}

#[tokio::test]
async fn test_timeline_own_block_then_followings() {
    let app = TestApp::new().await;
    let alice = create_test_user(&app, "alice").await;
    let bob = create_test_user(&app, "bob").await;
    let carol = create_test_user(&app, "carol").await;
    app.put_empty("/api/v1/users/bob/follow", Some(&alice.token)).await;

    let bob_post = create_text_post(&app, &bob, "from bob").await;
    let alice_post = create_text_post(&app, &alice, "from alice").await;
    create_text_post(&app, &carol, "from carol").await;

    let response = app.get("/api/v1/posts/timeline", Some(&alice.token)).await;

    assert_success(&response, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["page"], 1);
    assert_eq!(data["limit"], 10);
    assert_eq!(data["count"], 2);
    let ids: Vec<&str> = data["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["id"].as_str().unwrap())
        .collect();
    let expected = vec![alice_post.to_string(), bob_post.to_string()];
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());

    let second_page = app
        .get("/api/v1/posts/timeline?page=2&limit=1", Some(&alice.token))
        .await;
    assert_eq!(second_page.data()["count"], 0);
}

#[tokio::test]
async fn test_random_feed_skips_fetched_ids() {
    let app = TestApp::new().await;
    let alice = create_test_user(&app, "alice").await;
    let first = create_text_post(&app, &alice, "one").await;
    let second = create_text_post(&app, &alice, "two").await;

    let all = app.get("/api/v1/posts/random", Some(&alice.token)).await;
    assert_success(&all, StatusCode::OK);
    assert_eq!(all.data().as_array().unwrap().len(), 2);

    let remaining = app
        .get(&format!("/api/v1/posts/random?fetchedPostIds={}", first), Some(&alice.token))
        .await;
    let posts = remaining.data().as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], second.to_string());
    assert_eq!(posts[0]["user"]["username"], "alice");

    let exhausted = app
        .get(
            &format!("/api/v1/posts/random?fetchedPostIds={},{}", first, second),
            Some(&alice.token),
        )
        .await;
    assert_failure(&exhausted, StatusCode::NOT_FOUND, "No posts found");
}
