use server_api::{
    create_event, delete_event, get_event, invite, list_accepted, list_attendees,
    list_invited_pending, respond, search_events, ApiContext,
};
use shared::{
    domain::{AttendeeStatus, EventDetails, Principal},
    error::ErrorCode,
};
use storage::Storage;

fn principal(email: &str) -> Principal {
    Principal::from_email(email).expect("principal")
}

#[tokio::test]
async fn invitation_response_and_deletion_flow() {
    let ctx = ApiContext::new(Storage::new("sqlite::memory:").await.expect("db"));
    let a = principal("anna.lee@x.com");
    let b = principal("ben_park@x.com");

    let event = create_event(
        &ctx,
        Some(&a),
        EventDetails {
            title: "Quarterly offsite".into(),
            date: "2026-12-04".into(),
            time: "10:00".into(),
            location: "Lakeside lodge".into(),
            description: "Planning and a long lunch".into(),
        },
    )
    .await
    .expect("create");
    let id = event.id.to_string();
    assert_eq!(
        event.attendee("anna.lee@x.com").map(|x| x.status),
        Some(AttendeeStatus::Organizer)
    );

    invite(&ctx, Some(&a), &id, "ben_park@x.com")
        .await
        .expect("invite");
    let b_pending = list_invited_pending(&ctx, Some(&b)).await.expect("b pending");
    assert!(b_pending.iter().any(|e| e.id == event.id));
    let a_pending = list_invited_pending(&ctx, Some(&a)).await.expect("a pending");
    assert!(a_pending.iter().all(|e| e.id != event.id));

    respond(&ctx, Some(&b), &id, "accept").await.expect("accept");
    let b_accepted = list_accepted(&ctx, Some(&b)).await.expect("b accepted");
    assert!(b_accepted.iter().any(|e| e.id == event.id));
    let attendees = list_attendees(&ctx, Some(&a), &id).await.expect("attendees");
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0].email, "ben_park@x.com");
    assert_eq!(attendees[0].name, "Ben Park");

    respond(&ctx, Some(&b), &id, "decline").await.expect("decline");
    assert!(list_attendees(&ctx, Some(&a), &id)
        .await
        .expect("attendees")
        .is_empty());
    let b_search = search_events(&ctx, Some(&b), "", None).await.expect("b search");
    assert!(b_search.iter().all(|e| e.id != event.id));
    let a_search = search_events(&ctx, Some(&a), "", None).await.expect("a search");
    assert!(a_search.iter().any(|e| e.id == event.id));

    let err = delete_event(&ctx, Some(&b), &id)
        .await
        .expect_err("b cannot delete");
    assert_eq!(err.code, ErrorCode::Forbidden);
    delete_event(&ctx, Some(&a), &id).await.expect("a deletes");
    let err = get_event(&ctx, Some(&a), &id).await.expect_err("gone");
    assert_eq!(err.code, ErrorCode::NotFound);
}
