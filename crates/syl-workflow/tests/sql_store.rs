//! The engine over the libSQL store and the object_store blob backend.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use syl_core::enums::{Role, WorkflowActionType, WorkflowStatus};
use syl_db::SqlStore;
use syl_storage::ObjectBlobStore;
use syl_workflow::{
    ErrorKind, FileService, FileServiceConfig, FileUpload, SyllabusWorkflow, resolve_actor,
};

#[tokio::test]
async fn lifecycle_with_attachment_on_sql_store() {
    let store = Arc::new(SqlStore::open_local(":memory:").await.unwrap());
    let blobs = Arc::new(ObjectBlobStore::in_memory("syllabus-files"));
    let workflow = SyllabusWorkflow::new(Arc::clone(&store));
    let files = FileService::new(Arc::clone(&store), Arc::clone(&blobs), FileServiceConfig::default());

    let lecturer = store.create_user("l@uni.test", "Lecturer", &[Role::Lecturer]).await.unwrap();
    let hod = store.create_user("h@uni.test", "Head", &[Role::Hod]).await.unwrap();
    let aa = store.create_user("a@uni.test", "Affairs", &[Role::Aa]).await.unwrap();
    let admin = store.create_user("ad@uni.test", "Admin", &[Role::Admin]).await.unwrap();
    let student = store.create_user("s@uni.test", "Student", &[Role::Student]).await.unwrap();
    let subject = store.create_subject("CS101", "Programming I").await.unwrap();
    let program = store.create_program("BSC-CS", "BSc Computer Science").await.unwrap();

    let lecturer = resolve_actor(&*store, lecturer.id).await.unwrap();
    let hod = resolve_actor(&*store, hod.id).await.unwrap();
    let aa = resolve_actor(&*store, aa.id).await.unwrap();
    let admin = resolve_actor(&*store, admin.id).await.unwrap();
    let student = resolve_actor(&*store, student.id).await.unwrap();

    let draft = workflow
        .create_draft(subject.id, program.id, lecturer.user_id)
        .await
        .unwrap();
    let id = draft.syllabus.id;

    let upload = FileUpload {
        bytes: b"%PDF-1.7 outline".to_vec(),
        filename: "Outline.PDF".to_string(),
        mime_type: "application/pdf".to_string(),
        display_name: None,
    };
    let file = files
        .upload_file(&lecturer, draft.version.id, upload)
        .await
        .unwrap();
    assert!(file.object_path.ends_with(".pdf"), "{}", file.object_path);
    assert_eq!(blobs.read(&file.object_path).await.unwrap(), b"%PDF-1.7 outline");

    let err = files
        .signed_url(&student, file.id, Duration::from_secs(60))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    workflow.submit_for_review(id, &lecturer).await.unwrap();
    workflow.hod_approve(id, &hod).await.unwrap();
    workflow.aa_approve(id, &aa).await.unwrap();
    let published = workflow.publish(id, &admin).await.unwrap();
    assert_eq!(published.syllabus.lifecycle_status, WorkflowStatus::Published);
    assert!(published.version.published_at.is_some());

    assert_eq!(workflow.get_detail(id).await.unwrap(), published);
    let actions: Vec<_> = workflow
        .history(id)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.action_type)
        .collect();
    assert_eq!(
        actions,
        vec![
            WorkflowActionType::Submit,
            WorkflowActionType::HodApprove,
            WorkflowActionType::AaApprove,
            WorkflowActionType::Publish,
        ]
    );

    let link = files
        .signed_url(&student, file.id, Duration::from_secs(60))
        .await
        .unwrap();
    assert!(link.url.starts_with("memory://syllabus-files/"), "{}", link.url);
}

#[tokio::test]
async fn concurrent_submits_on_sql_store_admit_one() {
    let store = Arc::new(SqlStore::open_local(":memory:").await.unwrap());
    let workflow = SyllabusWorkflow::new(Arc::clone(&store));
    let user = store.create_user("l@uni.test", "Lecturer", &[Role::Lecturer]).await.unwrap();
    let subject = store.create_subject("CS101", "Programming I").await.unwrap();
    let program = store.create_program("BSC-CS", "BSc Computer Science").await.unwrap();
    let lecturer = resolve_actor(&*store, user.id).await.unwrap();
    let id = workflow
        .create_draft(subject.id, program.id, user.id)
        .await
        .unwrap()
        .syllabus
        .id;

    let (a, b) = tokio::join!(
        workflow.submit_for_review(id, &lecturer),
        workflow.submit_for_review(id, &lecturer),
    );
    assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    assert_eq!(workflow.history(id).await.unwrap().len(), 1);
}
