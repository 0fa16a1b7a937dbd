//! Subscriptions and feedback on published syllabi.

mod common;

use pretty_assertions::assert_eq;
use rstest::rstest;
use syl_core::entities::Syllabus;
use syl_workflow::{ErrorKind, WorkflowError};

use common::world;

#[tokio::test]
async fn only_published_syllabi_are_listed() {
    let w = world().await;
    w.draft().await;
    let published = w.published().await;

    let listed = w.engagement.list_published(None).await.unwrap();
    assert_eq!(listed, vec![published.syllabus.clone()]);
    let listed = w.engagement.list_published(Some("   ")).await.unwrap();
    assert_eq!(listed, vec![published.syllabus]);
}

#[tokio::test]
async fn published_listing_filters_by_query() {
    let w = world().await;
    let published = w.published().await;
    let subject = w.store.create_subject("PHY201", "Quantum Mechanics").await;
    let other = w
        .workflow
        .create_draft(subject.id, w.program_id, w.lecturer.user_id)
        .await
        .unwrap();
    let other_id = other.syllabus.id;
    w.workflow.submit_for_review(other_id, &w.lecturer).await.unwrap();
    w.workflow.hod_approve(other_id, &w.hod).await.unwrap();
    w.workflow.aa_approve(other_id, &w.aa).await.unwrap();
    w.workflow.publish(other_id, &w.admin).await.unwrap();

    let ids = |list: Vec<Syllabus>| list.into_iter().map(|s| s.id).collect::<Vec<_>>();

    let hits = w.engagement.list_published(Some("quantum")).await.unwrap();
    assert_eq!(ids(hits), vec![other_id]);
    let hits = w.engagement.list_published(Some(" phy2 ")).await.unwrap();
    assert_eq!(ids(hits), vec![other_id]);
    let hits = w
        .engagement
        .list_published(Some(&published.syllabus.id.to_string()))
        .await
        .unwrap();
    assert!(ids(hits).contains(&published.syllabus.id));
    let hits = w.engagement.list_published(Some("no such course")).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn get_published_hides_everything_else() {
    let w = world().await;
    let published = w.published().await;
    let draft = w.draft().await;

    let detail = w.engagement.get_published(published.syllabus.id).await.unwrap();
    assert_eq!(detail.syllabus, published.syllabus);
    assert_eq!(detail.version.id, published.version.id);

    let err = w.engagement.get_published(draft.syllabus.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = w.engagement.get_published(404).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    w.workflow
        .unpublish(published.syllabus.id, &w.admin)
        .await
        .unwrap();
    let err = w.engagement.get_published(published.syllabus.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn subscribe_once_to_a_published_syllabus() {
    let w = world().await;
    let id = w.published().await.syllabus.id;

    let subscription = w.engagement.subscribe(id, w.student.user_id).await.unwrap();
    assert_eq!(subscription.syllabus_id, id);
    assert_eq!(subscription.user_id, w.student.user_id);

    let err = w.engagement.subscribe(id, w.student.user_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn subscribing_to_unpublished_work_is_conflict() {
    let w = world().await;
    let id = w.draft().await.syllabus.id;

    let err = w.engagement.subscribe(id, w.student.user_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let err = w.engagement.subscribe(404, w.student.user_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = w.engagement.subscribe(id, 404).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn feedback_is_attached_to_the_current_version() {
    let w = world().await;
    let published = w.published().await;
    let id = published.syllabus.id;

    let feedback = w
        .engagement
        .submit_feedback(id, w.student.user_id, "  Clear learning outcomes. ", Some(5))
        .await
        .unwrap();
    assert_eq!(feedback.version_id, published.version.id);
    assert_eq!(feedback.content, "Clear learning outcomes.");
    assert_eq!(feedback.rating, Some(5));

    w.engagement
        .submit_feedback(id, w.other_lecturer.user_id, "Reading list is long.", None)
        .await
        .unwrap();

    let all = w.engagement.list_feedback(id).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], feedback);
    assert_eq!(all[1].rating, None);
}

#[rstest]
#[case("", None, "content")]
#[case("   ", Some(3), "content")]
#[case("ok", Some(0), "rating")]
#[case("ok", Some(6), "rating")]
#[tokio::test]
async fn invalid_feedback_is_rejected(
    #[case] content: &str,
    #[case] rating: Option<u8>,
    #[case] field: &str,
) {
    let w = world().await;
    let id = w.published().await.syllabus.id;

    let err = w
        .engagement
        .submit_feedback(id, w.student.user_id, content, rating)
        .await
        .unwrap_err();
    assert!(
        matches!(err, WorkflowError::Validation { field: f, .. } if f == field),
        "{err:?}"
    );
    assert!(w.engagement.list_feedback(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_feedback_is_rejected() {
    let w = world().await;
    let id = w.published().await.syllabus.id;

    let err = w
        .engagement
        .submit_feedback(id, w.student.user_id, &"a".repeat(5_001), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    w.engagement
        .submit_feedback(id, w.student.user_id, &"a".repeat(5_000), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn feedback_on_unpublished_syllabus_is_conflict() {
    let w = world().await;
    let id = w.published().await.syllabus.id;
    w.workflow.unpublish(id, &w.admin).await.unwrap();

    let err = w
        .engagement
        .submit_feedback(id, w.student.user_id, "Hello", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}
