//! JSON shape and JsonSchema validation for the entities the CLI prints.

use chrono::{TimeZone, Utc};
use schemars::schema_for;
use syl_core::entities::{FileAsset, SyllabusDetail, Syllabus, SyllabusVersion, WorkflowAction};
use syl_core::enums::{WorkflowActionType, WorkflowStatus};

fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

fn sample_detail() -> SyllabusDetail {
    let created = Utc.with_ymd_and_hms(2026, 9, 1, 9, 30, 0).unwrap();
    SyllabusDetail {
        syllabus: Syllabus {
            id: 7,
            subject_id: 3,
            program_id: 2,
            owner_lecturer_id: 11,
            current_version_id: Some(9),
            lifecycle_status: WorkflowStatus::PendingReview,
            created_at: created,
        },
        version: SyllabusVersion {
            id: 9,
            syllabus_id: 7,
            academic_year: SyllabusVersion::academic_year_for(created),
            version_no: 1,
            workflow_status: WorkflowStatus::PendingReview,
            submitted_at: Some(created),
            approved_at: None,
            published_at: None,
            created_by: 11,
            created_at: created,
        },
    }
}

#[test]
fn detail_validates_and_uses_stored_status_form() {
    let detail = sample_detail();
    let schema = serde_json::to_value(schema_for!(SyllabusDetail)).unwrap();
    let instance = serde_json::to_value(&detail).unwrap();

    let errors = validate_against_schema(&schema, &instance);
    assert!(errors.is_empty(), "schema errors: {errors:?}");
    assert_eq!(instance["syllabus"]["lifecycle_status"], "PENDING_REVIEW");
    assert_eq!(instance["version"]["academic_year"], "2026-2027");
    assert!(instance["version"]["approved_at"].is_null());

    let recovered: SyllabusDetail = serde_json::from_value(instance).unwrap();
    pretty_assertions::assert_eq!(recovered, detail);
}

#[test]
fn workflow_action_carries_rejection_note() {
    let action = WorkflowAction {
        id: 1,
        version_id: 9,
        actor_user_id: 12,
        action_type: WorkflowActionType::HodReject,
        from_status: WorkflowStatus::PendingReview,
        to_status: WorkflowStatus::Draft,
        note: Some("Missing assessment weights".into()),
        acted_at: Utc.with_ymd_and_hms(2026, 9, 4, 10, 0, 0).unwrap(),
    };
    let schema = serde_json::to_value(schema_for!(WorkflowAction)).unwrap();
    let instance = serde_json::to_value(&action).unwrap();

    assert!(validate_against_schema(&schema, &instance).is_empty());
    assert_eq!(instance["action_type"], "HOD_REJECT");
    assert_eq!(instance["note"], "Missing assessment weights");
}

#[test]
fn schema_rejects_unknown_status() {
    let schema = serde_json::to_value(schema_for!(Syllabus)).unwrap();
    let mut instance = serde_json::to_value(&sample_detail().syllabus).unwrap();
    instance["lifecycle_status"] = "ARCHIVED".into();

    assert!(!validate_against_schema(&schema, &instance).is_empty());
    assert!(serde_json::from_value::<Syllabus>(instance).is_err());
}

#[test]
fn file_asset_schema_requires_object_path() {
    let schema = serde_json::to_value(schema_for!(FileAsset)).unwrap();
    let instance = serde_json::json!({
        "id": 1,
        "syllabus_version_id": 9,
        "original_filename": "course.pdf",
        "display_name": "Course outline",
        "bucket": "syllabus-files",
        "mime_type": "application/pdf",
        "size_bytes": 2048,
        "uploaded_by": 11,
        "created_at": "2026-09-01T09:30:00Z"
    });
    let errors = validate_against_schema(&schema, &instance);
    assert!(errors.iter().any(|e| e.contains("object_path")), "{errors:?}");
}
