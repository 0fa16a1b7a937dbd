//! File attachments: mutation and access policies, compensation, signed URLs.

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;
use syl_core::identity::Actor;
use syl_workflow::{ErrorKind, FileUpload, WorkflowError};

use common::{World, capture_logs, pdf, world};

async fn visible(w: &World, file_id: i64, actor: &Actor) -> bool {
    w.files.get_file_metadata(actor, file_id).await.is_ok()
}

#[tokio::test]
async fn owner_uploads_to_draft() {
    let w = world().await;
    let draft = w.draft().await;

    let file = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("Outline.pdf"))
        .await
        .unwrap();
    assert_eq!(file.syllabus_version_id, draft.version.id);
    assert_eq!(file.original_filename, "Outline.pdf");
    assert_eq!(file.display_name, "Outline.pdf");
    assert_eq!(file.bucket, "test-bucket");
    assert_eq!(file.size_bytes, 13);
    assert_eq!(file.uploaded_by, w.lecturer.user_id);
    assert!(w.blobs.contains(&file.object_path));
    assert!(
        file.object_path
            .starts_with(&format!("syllabi/{}/versions/{}/", draft.syllabus.id, draft.version.id))
    );

    let listed = w
        .files
        .list_files_by_version(&w.lecturer, draft.version.id)
        .await
        .unwrap();
    assert_eq!(listed, vec![file]);
}

#[tokio::test]
async fn non_owner_lecturer_upload_is_unauthorized() {
    let w = world().await;
    let draft = w.draft().await;

    let err = w
        .files
        .upload_file(&w.other_lecturer, draft.version.id, pdf("x.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized), "{err:?}");
    assert!(w.blobs.paths().is_empty());
    assert_eq!(w.store.file_count().await, 0);
}

#[tokio::test]
async fn owner_upload_after_submit_is_conflict() {
    let w = world().await;
    let draft = w.draft().await;
    w.workflow
        .submit_for_review(draft.syllabus.id, &w.lecturer)
        .await
        .unwrap();

    let err = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("late.pdf"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(w.blobs.paths().is_empty());
}

#[rstest]
#[case(Vec::new(), "a.pdf", "file")]
#[case(b"x".to_vec(), " ", "filename")]
#[tokio::test]
async fn invalid_upload_fails_before_touching_storage(
    #[case] bytes: Vec<u8>,
    #[case] filename: &str,
    #[case] field: &str,
) {
    let w = world().await;
    let draft = w.draft().await;
    let upload = FileUpload {
        bytes,
        filename: filename.to_string(),
        mime_type: "application/pdf".to_string(),
        display_name: None,
    };

    let err = w
        .files
        .upload_file(&w.lecturer, draft.version.id, upload)
        .await
        .unwrap_err();
    assert!(
        matches!(err, WorkflowError::Validation { field: f, .. } if f == field),
        "{err:?}"
    );
    assert!(w.blobs.paths().is_empty());
}

#[tokio::test]
async fn failed_metadata_write_deletes_the_blob() {
    let w = world().await;
    let draft = w.draft().await;

    w.store.fail_next_file_insert();
    let err = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("a.pdf"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);

    assert!(w.blobs.paths().is_empty());
    assert_eq!(w.blobs.delete_calls(), 1);
    assert_eq!(w.store.file_count().await, 0);
}

#[tokio::test]
async fn cleanup_retries_transient_delete_failures() {
    let w = world().await;
    let draft = w.draft().await;

    w.store.fail_next_file_insert();
    w.blobs.fail_deletes(2);
    w.files
        .upload_file(&w.lecturer, draft.version.id, pdf("a.pdf"))
        .await
        .unwrap_err();

    assert_eq!(w.blobs.delete_calls(), 3);
    assert!(w.blobs.paths().is_empty());
}

#[tokio::test]
async fn exhausted_cleanup_logs_orphan_and_keeps_original_error() {
    let w = world().await;
    let draft = w.draft().await;
    let (logs, _guard) = capture_logs();

    w.store.fail_next_file_insert();
    w.blobs.fail_deletes(u32::MAX);
    let err = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("a.pdf"))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Unavailable(ref msg) if msg.contains("file insert")), "{err:?}");
    assert_eq!(w.blobs.delete_calls(), 3);
    let orphan = w.blobs.paths().pop().unwrap();

    let output = logs.contents();
    assert!(output.contains("ERROR"), "{output}");
    assert!(output.contains("orphaned object"), "{output}");
    assert!(output.contains(&orphan), "{output}");
    assert_eq!(output.matches("compensating delete failed").count(), 3);
}

#[tokio::test]
async fn replace_keeps_id_and_drops_old_blob() {
    let w = world().await;
    let draft = w.draft().await;
    let original = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("v1.pdf"))
        .await
        .unwrap();

    let replacement = FileUpload {
        bytes: b"PK\x03\x04 docx".to_vec(),
        filename: "v2.docx".to_string(),
        mime_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            .to_string(),
        display_name: Some("Course outline".to_string()),
    };
    let replaced = w
        .files
        .replace_file(&w.lecturer, original.id, replacement)
        .await
        .unwrap();

    assert_eq!(replaced.id, original.id);
    assert_eq!(replaced.original_filename, "v2.docx");
    assert_eq!(replaced.display_name, "Course outline");
    assert_ne!(replaced.object_path, original.object_path);
    assert!(!w.blobs.contains(&original.object_path));
    assert_eq!(w.blobs.paths(), vec![replaced.object_path.clone()]);
}

#[tokio::test]
async fn upload_trims_the_display_name() {
    let w = world().await;
    let draft = w.draft().await;
    let upload = FileUpload {
        display_name: Some("  Week plan  ".to_string()),
        ..pdf("plan.pdf")
    };

    let file = w
        .files
        .upload_file(&w.lecturer, draft.version.id, upload)
        .await
        .unwrap();
    assert_eq!(file.display_name, "Week plan");
}

#[tokio::test]
async fn blob_left_after_delete_is_logged_as_orphan() {
    let w = world().await;
    let draft = w.draft().await;
    let file = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("gone.pdf"))
        .await
        .unwrap();
    let (logs, _guard) = capture_logs();

    w.blobs.fail_deletes(1);
    w.files.delete_file(&w.lecturer, file.id).await.unwrap();

    assert!(w.blobs.contains(&file.object_path));
    let output = logs.contents();
    assert!(output.contains("ERROR"), "{output}");
    assert!(output.contains("orphaned object"), "{output}");
    assert!(output.contains("delete_file"), "{output}");
    assert!(output.contains(&file.object_path), "{output}");
    assert!(!output.contains("replace_file"), "{output}");
}

#[tokio::test]
async fn blob_left_after_replace_is_logged_as_orphan() {
    let w = world().await;
    let draft = w.draft().await;
    let original = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("v1.pdf"))
        .await
        .unwrap();
    let (logs, _guard) = capture_logs();

    w.blobs.fail_deletes(1);
    let replaced = w
        .files
        .replace_file(&w.lecturer, original.id, pdf("v2.pdf"))
        .await
        .unwrap();

    assert_eq!(replaced.id, original.id);
    assert!(w.blobs.contains(&original.object_path));
    let output = logs.contents();
    assert!(output.contains("orphaned object"), "{output}");
    assert!(output.contains("replace_file"), "{output}");
    assert!(output.contains(&original.object_path), "{output}");
}

#[tokio::test]
async fn rename_and_delete_follow_the_mutation_policy() {
    let w = world().await;
    let draft = w.draft().await;
    let file = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("a.pdf"))
        .await
        .unwrap();

    let err = w.files.rename_file(&w.lecturer, file.id, "  ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = w.files.rename_file(&w.admin, file.id, "Plan").await.unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized));

    let renamed = w.files.rename_file(&w.lecturer, file.id, " Plan ").await.unwrap();
    assert_eq!(renamed.display_name, "Plan");

    let deleted = w.files.delete_file(&w.lecturer, file.id).await.unwrap();
    assert_eq!(deleted.id, file.id);
    assert!(w.blobs.paths().is_empty());
    let err = w.files.delete_file(&w.lecturer, file.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
}

#[tokio::test]
async fn files_freeze_once_submitted() {
    let w = world().await;
    let draft = w.draft().await;
    let file = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("a.pdf"))
        .await
        .unwrap();
    w.workflow
        .submit_for_review(draft.syllabus.id, &w.lecturer)
        .await
        .unwrap();

    let err = w.files.delete_file(&w.lecturer, file.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let err = w
        .files
        .replace_file(&w.lecturer, file.id, pdf("b.pdf"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(w.blobs.paths(), vec![file.object_path]);
}

#[tokio::test]
async fn visibility_widens_as_the_syllabus_advances() {
    let w = world().await;
    let draft = w.draft().await;
    let id = draft.syllabus.id;
    let file = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("a.pdf"))
        .await
        .unwrap();

    assert!(visible(&w, file.id, &w.lecturer).await);
    assert!(visible(&w, file.id, &w.admin).await);
    assert!(!visible(&w, file.id, &w.hod).await);
    assert!(!visible(&w, file.id, &w.student).await);

    w.workflow.submit_for_review(id, &w.lecturer).await.unwrap();
    assert!(visible(&w, file.id, &w.hod).await);
    assert!(!visible(&w, file.id, &w.aa).await);

    w.workflow.hod_approve(id, &w.hod).await.unwrap();
    w.workflow.aa_approve(id, &w.aa).await.unwrap();
    assert!(visible(&w, file.id, &w.aa).await);
    assert!(visible(&w, file.id, &w.principal).await);
    assert!(!visible(&w, file.id, &w.other_lecturer).await);

    w.workflow.publish(id, &w.admin).await.unwrap();
    assert!(visible(&w, file.id, &w.student).await);
    assert!(visible(&w, file.id, &w.other_lecturer).await);
}

#[tokio::test]
async fn hidden_file_reads_as_not_found() {
    let w = world().await;
    let draft = w.draft().await;
    let file = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("a.pdf"))
        .await
        .unwrap();

    let hidden = w.files.get_file_metadata(&w.student, file.id).await.unwrap_err();
    let missing = w.files.get_file_metadata(&w.student, 9_999).await.unwrap_err();
    assert_eq!(hidden.kind(), ErrorKind::NotFound);
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    let err = w
        .files
        .list_files_by_version(&w.student, draft.version.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = w
        .files
        .signed_url(&w.student, file.id, Duration::from_secs(60))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[rstest]
#[case(Duration::ZERO)]
#[case(Duration::from_millis(500))]
#[case(Duration::from_secs(604_801))]
#[tokio::test]
async fn signed_url_ttl_out_of_range_is_validation(#[case] ttl: Duration) {
    let w = world().await;
    let draft = w.draft().await;
    let file = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("a.pdf"))
        .await
        .unwrap();

    let err = w.files.signed_url(&w.lecturer, file.id, ttl).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation { field: "ttl", .. }), "{err:?}");
}

#[tokio::test]
async fn signed_url_for_published_file() {
    let w = world().await;
    let draft = w.draft().await;
    let file = w
        .files
        .upload_file(&w.lecturer, draft.version.id, pdf("a.pdf"))
        .await
        .unwrap();
    let id = draft.syllabus.id;
    w.workflow.submit_for_review(id, &w.lecturer).await.unwrap();
    w.workflow.hod_approve(id, &w.hod).await.unwrap();
    w.workflow.aa_approve(id, &w.aa).await.unwrap();
    w.workflow.publish(id, &w.admin).await.unwrap();

    let link = w
        .files
        .signed_url(&w.student, file.id, Duration::from_secs(900))
        .await
        .unwrap();
    assert_eq!(link.file_id, file.id);
    assert_eq!(link.expires_in_secs, 900);
    assert!(link.url.contains(&file.object_path));
    assert!(link.url.ends_with("ttl=900"));
}
