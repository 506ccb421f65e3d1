// tests/test_community_api.rs


use axum::http::StatusCode;
use serde_json::json;

use std::sync::Arc;

use ecoaware::community::types::CreateWishRequest;
use ecoaware::server::{create_pool, run_migrations};
use ecoaware::state::AppState;
use test_helpers::{create_test_app, delete, get, post, send, sign_in, sign_in_admin, test_config};

#[tokio::test]
async fn test_discussion_threads() {
    let (app, state) = create_test_app().await;
    let admin = sign_in_admin(&state).await;
    let ada = sign_in(&state, "ada", "ada@eco.test").await;
    let alan = sign_in(&state, "alan", "alan@eco.test").await;

    let (status, discussion) = post(
        &app,
        "/api/discussions",
        Some(&ada),
        json!({ "title": "Plastic-free July", "body": "Who is joining?", "topic": "waste" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(discussion["author_name"], "ada");
    assert_eq!(discussion["reply_count"], 0);
    let id = discussion["id"].as_str().unwrap().to_string();
    let replies_uri = format!("/api/discussions/{id}/replies");

    let (status, _) = post(&app, &replies_uri, Some(&alan), json!({ "body": "Count me in" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post(&app, &replies_uri, Some(&ada), json!({ "body": "Great!" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post(&app, &replies_uri, Some(&ada), json!({ "body": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post(&app, "/api/discussions/missing/replies", Some(&ada), json!({ "body": "hi" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, thread) = get(&app, &format!("/api/discussions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["reply_count"], 2);
    assert_eq!(thread["replies"][0]["body"], "Count me in");
    assert_eq!(thread["replies"][0]["author_name"], "alan");

    let (_, list) = get(&app, "/api/discussions", None).await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["reply_count"], 2);

    let (status, _) = delete(&app, &format!("/api/discussions/{id}"), Some(&alan)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = delete(&app, &format!("/api/discussions/{id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stats) = get(&app, "/api/stats", None).await;
    assert_eq!(stats["discussions"], 0);
}

#[tokio::test]
async fn test_wish_votes_toggle() {
    let (app, state) = create_test_app().await;
    let ada = sign_in(&state, "ada", "ada@eco.test").await;
    let alan = sign_in(&state, "alan", "alan@eco.test").await;

    let (status, first) = post(&app, "/api/wishes", Some(&ada), json!({ "title": "Repair cafe" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, second) = post(&app, "/api/wishes", Some(&ada), json!({ "title": "Seed swap" })).await;
    let first_id = first["id"].as_str().unwrap().to_string();
    let second_id = second["id"].as_str().unwrap().to_string();

    let vote_uri = format!("/api/wishes/{first_id}/vote");
    let (status, outcome) = post(&app, &vote_uri, Some(&alan), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome, json!({ "voted": true, "votes": 1 }));

    let (_, outcome) = post(&app, &vote_uri, Some(&ada), json!({})).await;
    assert_eq!(outcome, json!({ "voted": true, "votes": 2 }));

    // Most voted first, and `voted` reflects the caller
    let (_, list) = get(&app, "/api/wishes", Some(&alan)).await;
    assert_eq!(list["items"][0]["id"], first_id.as_str());
    assert_eq!(list["items"][0]["votes"], 2);
    assert_eq!(list["items"][0]["voted"], true);
    assert_eq!(list["items"][1]["id"], second_id.as_str());
    assert_eq!(list["items"][1]["voted"], false);

    // Voting again takes the vote back
    let (_, outcome) = post(&app, &vote_uri, Some(&alan), json!({})).await;
    assert_eq!(outcome, json!({ "voted": false, "votes": 1 }));

    let (status, _) = post(&app, "/api/wishes/missing/vote", Some(&alan), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = post(&app, &vote_uri, None, json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = delete(&app, &format!("/api/wishes/{first_id}"), Some(&alan)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = delete(&app, &format!("/api/wishes/{first_id}"), Some(&ada)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_blog_drafts_and_publishing() {
    let (app, state) = create_test_app().await;
    let admin = sign_in_admin(&state).await;
    let ada = sign_in(&state, "ada", "ada@eco.test").await;
    let alan = sign_in(&state, "alan", "alan@eco.test").await;

    let (status, draft) = post(
        &app,
        "/api/blogs",
        Some(&ada),
        json!({ "title": "Composting at home", "content": "Start small." }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(draft["published"], false);
    assert!(draft["published_at"].is_null());
    let id = draft["id"].as_str().unwrap().to_string();
    let uri = format!("/api/blogs/{id}");

    let (status, published) = post(
        &app,
        "/api/blogs",
        Some(&alan),
        json!({ "title": "Why bees matter", "content": "Pollination.", "published": true }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(published["published_at"].is_i64());

    // Drafts are hidden from everyone but the author and admins
    let (status, _) = get(&app, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&app, &uri, Some(&alan)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&app, &uri, Some(&ada)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, &uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = get(&app, "/api/blogs", Some(&ada)).await;
    assert_eq!(list["total"], 1);
    let (_, list) = get(&app, "/api/blogs?drafts=true", Some(&ada)).await;
    assert_eq!(list["total"], 2);
    let (_, list) = get(&app, "/api/blogs?drafts=true", Some(&alan)).await;
    assert_eq!(list["total"], 1);
    let (_, list) = get(&app, "/api/blogs?drafts=true", Some(&admin)).await;
    assert_eq!(list["total"], 2);

    // Only the author or an admin edits
    let (status, _) = send(&app, "PUT", &uri, Some(&alan), Some(json!({ "title": "Mine now" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, post_now) = send(&app, "PUT", &uri, Some(&ada), Some(json!({ "published": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post_now["published"], true);
    assert_eq!(post_now["title"], "Composting at home");
    let first_published = post_now["published_at"].as_i64().unwrap();

    let (_, unpublished) = send(&app, "PUT", &uri, Some(&admin), Some(json!({ "published": false }))).await;
    assert_eq!(unpublished["published"], false);
    assert_eq!(unpublished["published_at"].as_i64(), Some(first_published));

    let (_, stats) = get(&app, "/api/stats", None).await;
    assert_eq!(stats["blog_posts"], 1);

    let (status, _) = delete(&app, &uri, Some(&alan)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = delete(&app, &uri, Some(&ada)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_replies_keep_posting_order() {
    let (app, state) = create_test_app().await;
    let ada = sign_in(&state, "ada", "ada@eco.test").await;

    let (_, discussion) = post(
        &app,
        "/api/discussions",
        Some(&ada),
        json!({ "title": "Bike to work week", "body": "Routes?" }),
    )
    .await;
    let id = discussion["id"].as_str().unwrap().to_string();
    let replies_uri = format!("/api/discussions/{id}/replies");

    // All within the same second
    let bodies: Vec<String> = (0..12).map(|i| format!("reply {i}")).collect();
    for body in &bodies {
        let (status, _) = post(&app, &replies_uri, Some(&ada), json!({ "body": body })).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, thread) = get(&app, &format!("/api/discussions/{id}"), None).await;
    let got: Vec<&str> = thread["replies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["body"].as_str().unwrap())
        .collect();
    assert_eq!(got, bodies.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_newest_discussion_first_within_a_second() {
    let (app, state) = create_test_app().await;
    let ada = sign_in(&state, "ada", "ada@eco.test").await;

    for title in ["first", "second", "third"] {
        let (status, _) = post(&app, "/api/discussions", Some(&ada), json!({ "title": title, "body": "-" })).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, list) = get(&app, "/api/discussions", None).await;
    let titles: Vec<&str> = list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["third", "second", "first"]);
}

#[tokio::test]
async fn test_public_names_never_show_email() {
    let (app, state) = create_test_app().await;
    let token = sign_in(&state, "quiet", "private.person@mail.test").await;
    sqlx::query("UPDATE users SET first_name = NULL, last_name = NULL WHERE id = 'quiet'")
        .execute(&state.pool)
        .await
        .unwrap();

    let (_, discussion) = post(&app, "/api/discussions", Some(&token), json!({ "title": "Hi", "body": "x" })).await;
    let id = discussion["id"].as_str().unwrap().to_string();
    post(&app, &format!("/api/discussions/{id}/replies"), Some(&token), json!({ "body": "me again" })).await;

    let (_, list) = get(&app, "/api/discussions", None).await;
    assert!(list["items"][0]["author_name"].is_null());
    let (_, thread) = get(&app, &format!("/api/discussions/{id}"), None).await;
    assert!(thread["replies"][0]["author_name"].is_null());
    assert!(!thread.to_string().contains("private.person"));
}

#[tokio::test]
async fn test_concurrent_votes_on_file_database() {
    let path = std::env::temp_dir().join(format!("ecoaware-votes-{}.db", uuid::Uuid::new_v4()));
    let url = format!("sqlite://{}", path.display());
    let pool = create_pool(&url, 8).await.unwrap();
    run_migrations(&pool).await.unwrap();
    let state = Arc::new(AppState::new(pool.clone(), test_config()));

    let voters: Vec<String> = (0..8).map(|i| format!("voter{i}")).collect();
    for voter in &voters {
        sign_in(&state, voter, &format!("{voter}@eco.test")).await;
    }
    let wish = state
        .community_store
        .create_wish(
            &voters[0],
            CreateWishRequest { title: "Tool library".into(), description: None },
        )
        .await
        .unwrap();

    let mut handles = Vec::new();
    for voter in voters.clone() {
        let store = state.community_store.clone();
        let wish_id = wish.id.clone();
        handles.push(tokio::spawn(async move { store.toggle_vote(&wish_id, &voter).await }));
    }
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap().unwrap();
        assert!(outcome.voted);
    }

    let stored = state.community_store.get_wish(&wish.id, None).await.unwrap().unwrap();
    assert_eq!(stored.votes, voters.len() as i64);

    pool.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
