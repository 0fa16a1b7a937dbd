//! Entity structs for all syllabus domain objects.
//!
//! Each entity maps to a table in the libSQL schema (`syl-db/migrations`).
//! `New*` structs carry the caller-supplied fields of an insert; the store
//! assigns ids.

mod directory;
mod engagement;
mod file_asset;
mod syllabus;
mod version;
mod workflow_action;

pub use directory::{Program, Subject, User};
pub use engagement::{Feedback, NewFeedback, Subscription};
pub use file_asset::{FileAsset, NewFileAsset};
pub use syllabus::{DraftUpdate, NewSyllabus, Syllabus, SyllabusDetail};
pub use version::SyllabusVersion;
pub use workflow_action::{NewWorkflowAction, WorkflowAction};
