mod common;

use client::{ApiRequest, ErrorKind, RequestClient, ResponseBody};
use url::Url;

async fn signed_in(server: &common::MockServer) -> client::AppContext {
    let context = server.anonymous_context();
    context.session().sign_in("alice", "pass1234").await.unwrap();
    context
}

#[tokio::test]
async fn timeline_carries_session_cookie() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    let posts = context.api().timeline().await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].author_username, "bob");
    assert!(posts[0].is_liked_by_current_user);
}

#[tokio::test]
async fn no_content_decodes_to_empty() {
    let server = common::spawn().await;
    let client = server.client();

    let body = client.send(ApiRequest::delete("posts/1")).await.unwrap();

    assert_eq!(body, ResponseBody::Empty);
}

#[tokio::test]
async fn json_error_message_is_surfaced() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    let err = context
        .api()
        .publish_post("something forbidden")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert_eq!(err.to_string(), "Post rejected by moderation");
    assert!(context.session().is_authenticated());
}

#[tokio::test]
async fn publish_post_sends_trimmed_json() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    let post = context.api().publish_post("  hello relay \n").await.unwrap();

    assert_eq!(post.id, 99);
    assert_eq!(post.content, "hello relay");
}

#[tokio::test]
async fn blank_post_never_reaches_server() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    let err = context.api().publish_post("   ").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert_eq!(err.message(), "Post must not be empty");
}

#[tokio::test]
async fn missing_post_comments_are_not_found() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    let err = context.api().comments(404).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.is_not_found());
    assert!(context.session().is_authenticated());
}

#[tokio::test]
async fn comment_is_sent_as_trimmed_plain_text() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    let comment = context.api().add_comment(5, "  great post!  ").await.unwrap();

    assert_eq!(comment.content, "great post!");
    let bodies = server.recorded.comment_bodies.lock().unwrap().clone();
    assert_eq!(
        bodies,
        vec![(Some("text/plain".to_string()), "great post!".to_string())]
    );
}

#[tokio::test]
async fn deleting_missing_post_counts_as_deleted() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    context.api().delete_post(1).await.unwrap();
    context.api().delete_post(12345).await.unwrap();
}

#[tokio::test]
async fn toggle_like_updates_post() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;
    let mut posts = context.api().timeline().await.unwrap();

    context.api().toggle_like(&mut posts[0]).await.unwrap();
    assert!(!posts[0].is_liked_by_current_user);
    assert_eq!(posts[0].like_count, 1);

    context.api().toggle_like(&mut posts[1]).await.unwrap();
    assert!(posts[1].is_liked_by_current_user);
    assert_eq!(posts[1].like_count, 1);
}

#[tokio::test]
async fn connections_join_both_lists() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    let connections = context.api().connections("bob").await.unwrap();

    assert_eq!(connections.followers.len(), 1);
    assert_eq!(connections.followers[0].username, "fan-of-bob");
    assert_eq!(connections.following.len(), 2);
}

#[tokio::test]
async fn follow_state_comes_from_search() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    assert!(context.api().is_following("bob").await.unwrap());
    assert!(!context.api().is_following("bobby").await.unwrap());

    assert!(context.api().toggle_follow("bobby", false).await.unwrap());
    assert!(!context.api().toggle_follow("bob", true).await.unwrap());
}

#[tokio::test]
async fn follow_status_reads_boolean_body() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    assert!(context.api().follow_status("bob").await.unwrap());
    assert!(!context.api().follow_status("carol").await.unwrap());
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    let err = context.api().user("ghost").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let profile = context.api().user("bob").await.unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Bob Builder"));
}

#[tokio::test]
async fn unreachable_server_is_network_unavailable() {
    let addr = common::closed_address().await;
    let client = RequestClient::new(Url::parse(&format!("http://{addr}/api/")).unwrap()).unwrap();

    let err = client
        .send(ApiRequest::get("posts/timeline"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NetworkUnavailable);
    assert_eq!(err.message(), "Network error - unable to connect to server");
}

#[tokio::test]
async fn bodiless_profile_update_applies_edits_locally() {
    let server = common::spawn().await;
    let context = signed_in(&server).await;

    let update = shared::models::ProfileUpdate {
        full_name: "Alice Liddell".into(),
        email: "alice@example.com".into(),
        biography: String::new(),
    };
    let profile = context.api().update_me(&update).await.unwrap();

    assert_eq!(profile.username, "alice");
    assert_eq!(profile.full_name.as_deref(), Some("Alice Liddell"));
    assert_eq!(profile.email.as_deref(), Some("alice@example.com"));
    assert_eq!(profile.biography, None);
    assert_eq!(profile.follower_count, Some(1));
}
