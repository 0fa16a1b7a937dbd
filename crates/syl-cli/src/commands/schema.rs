use anyhow::bail;
use schemars::{Schema, schema_for};
use syl_core::entities::{
    Feedback, FileAsset, Subscription, Syllabus, SyllabusDetail, SyllabusVersion, User,
    WorkflowAction,
};
use syl_workflow::SignedUrl;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

fn schema_by_name(name: &str) -> Option<Schema> {
    let schema = match name {
        "syllabus" => schema_for!(Syllabus),
        "version" => schema_for!(SyllabusVersion),
        "detail" => schema_for!(SyllabusDetail),
        "action" => schema_for!(WorkflowAction),
        "file" => schema_for!(FileAsset),
        "feedback" => schema_for!(Feedback),
        "subscription" => schema_for!(Subscription),
        "user" => schema_for!(User),
        "signed-url" => schema_for!(SignedUrl),
        _ => return None,
    };
    Some(schema)
}

/// Handle `syl schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let Some(schema) = schema_by_name(&args.type_name) else {
        bail!("unknown schema type '{}'", args.type_name)
    };
    output(&schema, flags.format)
}
