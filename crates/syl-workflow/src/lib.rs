//! # syl-workflow
//!
//! The syllabus lifecycle engine and the services built around it.
//!
//! - [`SyllabusWorkflow`]: drafting, the review/approval/publish state
//!   machine, and reads of syllabi and their audit trail
//! - [`FileService`]: document attachments gated by the file access and
//!   mutation policies in [`policy`]
//! - [`Engagement`]: published listings, subscriptions, and feedback
//! - [`resolve_actor`]: per-request role lookup
//! - [`MemoryStore`]: an in-memory store for tests
//!
//! All services are generic over [`SyllabusStore`](syl_core::repository::SyllabusStore)
//! and share one store through an `Arc`.

pub mod engagement;
pub mod engine;
pub mod error;
pub mod files;
pub mod identity;
pub mod memory;
pub mod policy;
mod txn;

pub use engagement::Engagement;
pub use engine::SyllabusWorkflow;
pub use error::{ErrorKind, WorkflowError};
pub use files::{CleanupPolicy, FileService, FileServiceConfig, FileUpload, SignedUrl};
pub use identity::resolve_actor;
pub use memory::MemoryStore;
