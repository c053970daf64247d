use super::*;
use crate::test_support::{details, memory_context, principal};
use shared::{domain::AttendeeStatus, error::ErrorCode};

#[tokio::test]
async fn create_requires_a_caller() {
    let ctx = memory_context().await;
    let err = create_event(&ctx, None, details("Launch"))
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Unauthenticated);
}

#[tokio::test]
async fn creator_is_organizer_and_sole_attendee() {
    let ctx = memory_context().await;
    let alice = principal("alice@x.com");
    let event = create_event(&ctx, Some(&alice), details("Launch"))
        .await
        .expect("create");

    assert_eq!(event.organizer, "alice@x.com");
    assert_eq!(event.attendees.len(), 1);
    assert_eq!(event.attendees[0].email, "alice@x.com");
    assert_eq!(event.attendees[0].status, AttendeeStatus::Organizer);

    let fetched = get_event(&ctx, Some(&alice), &event.id.to_string())
        .await
        .expect("get");
    assert_eq!(fetched.id, event.id);
    assert_eq!(fetched.title, "Launch");
    assert_eq!(fetched.attendees, event.attendees);
}

#[tokio::test]
async fn get_event_distinguishes_bad_id_missing_event_and_anonymous() {
    let ctx = memory_context().await;
    let alice = principal("alice@x.com");

    let err = get_event(&ctx, Some(&alice), "nope").await.expect_err("bad id");
    assert_eq!(err.code, ErrorCode::Validation);

    let err = get_event(&ctx, Some(&alice), &EventId::new().to_string())
        .await
        .expect_err("missing");
    assert_eq!(err.code, ErrorCode::NotFound);

    let event = create_event(&ctx, Some(&alice), details("Launch"))
        .await
        .expect("create");
    let err = get_event(&ctx, None, &event.id.to_string())
        .await
        .expect_err("anonymous");
    assert_eq!(err.code, ErrorCode::Unauthenticated);
}

#[tokio::test]
async fn only_the_organizer_can_delete() {
    let ctx = memory_context().await;
    let alice = principal("alice@x.com");
    let bob = principal("bob@x.com");
    let event = create_event(&ctx, Some(&alice), details("Launch"))
        .await
        .expect("create");
    let id = event.id.to_string();

    let err = delete_event(&ctx, Some(&bob), &id)
        .await
        .expect_err("bob cannot delete");
    assert_eq!(err.code, ErrorCode::Forbidden);

    delete_event(&ctx, Some(&alice), &id).await.expect("delete");
    let err = get_event(&ctx, Some(&alice), &id)
        .await
        .expect_err("gone");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_does_not_reveal_whether_an_event_exists() {
    let ctx = memory_context().await;
    let alice = principal("alice@x.com");

    let missing = delete_event(&ctx, Some(&alice), &EventId::new().to_string())
        .await
        .expect_err("missing");
    let malformed = delete_event(&ctx, Some(&alice), "garbage")
        .await
        .expect_err("malformed");
    assert_eq!(missing.code, ErrorCode::Forbidden);
    assert_eq!(malformed.code, ErrorCode::Forbidden);
    assert_eq!(missing.message, malformed.message);
}
