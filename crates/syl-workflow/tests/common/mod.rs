//! Fixtures shared by the workflow integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use syl_core::blob::{BlobError, BlobStore};
use syl_core::entities::SyllabusDetail;
use syl_core::enums::Role;
use syl_core::identity::Actor;
use syl_workflow::{
    CleanupPolicy, Engagement, FileService, FileServiceConfig, FileUpload, MemoryStore,
    SyllabusWorkflow, resolve_actor,
};

/// Blob store fake that can be told to fail deletes.
#[derive(Clone, Default)]
pub struct FakeBlobs {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    failing_deletes: Arc<AtomicU32>,
    delete_calls: Arc<AtomicU32>,
    counter: Arc<AtomicU32>,
}

impl FakeBlobs {
    /// Fail the next `n` delete calls with `Unavailable`.
    pub fn fail_deletes(&self, n: u32) {
        self.failing_deletes.store(n, Ordering::SeqCst);
    }

    pub fn paths(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn delete_calls(&self) -> u32 {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

impl BlobStore for FakeBlobs {
    fn bucket(&self) -> &str {
        "test-bucket"
    }

    async fn upload(
        &self,
        bytes: Vec<u8>,
        path_hint: &str,
        _mime_type: &str,
    ) -> Result<String, BlobError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let path = format!("{path_hint}.{n}");
        self.objects.lock().unwrap().insert(path.clone(), bytes);
        Ok(path)
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, BlobError> {
        if !self.contains(path) {
            return Err(BlobError::NotFound(path.to_string()));
        }
        Ok(format!("https://blobs.test/{path}?ttl={}", ttl.as_secs()))
    }

    async fn delete(&self, path: &str) -> Result<bool, BlobError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_deletes.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_deletes.store(remaining - 1, Ordering::SeqCst);
            return Err(BlobError::Unavailable("injected delete failure".into()));
        }
        Ok(self.objects.lock().unwrap().remove(path).is_some())
    }
}

/// A store seeded with one user per role, a second lecturer, a subject,
/// and a program.
pub struct World {
    pub store: Arc<MemoryStore>,
    pub blobs: Arc<FakeBlobs>,
    pub workflow: SyllabusWorkflow<MemoryStore>,
    pub files: FileService<MemoryStore, FakeBlobs>,
    pub engagement: Engagement<MemoryStore>,
    pub admin: Actor,
    pub lecturer: Actor,
    pub other_lecturer: Actor,
    pub hod: Actor,
    pub aa: Actor,
    pub principal: Actor,
    pub student: Actor,
    pub subject_id: i64,
    pub program_id: i64,
}

async fn actor(store: &MemoryStore, email: &str, roles: &[Role]) -> Actor {
    let user = store.create_user(email, email, roles).await;
    resolve_actor(store, user.id).await.unwrap()
}

pub fn fast_config() -> FileServiceConfig {
    FileServiceConfig {
        cleanup: CleanupPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        },
        max_url_ttl: Duration::from_secs(604_800),
    }
}

pub async fn world() -> World {
    let store = Arc::new(MemoryStore::new());
    let blobs = Arc::new(FakeBlobs::default());

    let admin = actor(&store, "admin@uni.test", &[Role::Admin]).await;
    let lecturer = actor(&store, "lect@uni.test", &[Role::Lecturer]).await;
    let other_lecturer = actor(&store, "lect2@uni.test", &[Role::Lecturer]).await;
    let hod = actor(&store, "hod@uni.test", &[Role::Hod]).await;
    let aa = actor(&store, "aa@uni.test", &[Role::Aa]).await;
    let principal = actor(&store, "principal@uni.test", &[Role::Principal]).await;
    let student = actor(&store, "student@uni.test", &[Role::Student]).await;
    let subject_id = store.create_subject("CS101", "Programming I").await.id;
    let program_id = store.create_program("BSC-CS", "BSc Computer Science").await.id;

    World {
        workflow: SyllabusWorkflow::new(Arc::clone(&store)),
        files: FileService::new(Arc::clone(&store), Arc::clone(&blobs), fast_config()),
        engagement: Engagement::new(Arc::clone(&store)),
        store,
        blobs,
        admin,
        lecturer,
        other_lecturer,
        hod,
        aa,
        principal,
        student,
        subject_id,
        program_id,
    }
}

impl World {
    pub async fn draft(&self) -> SyllabusDetail {
        self.workflow
            .create_draft(self.subject_id, self.program_id, self.lecturer.user_id)
            .await
            .unwrap()
    }

    /// A syllabus walked all the way to `PUBLISHED`.
    pub async fn published(&self) -> SyllabusDetail {
        let id = self.draft().await.syllabus.id;
        self.workflow.submit_for_review(id, &self.lecturer).await.unwrap();
        self.workflow.hod_approve(id, &self.hod).await.unwrap();
        self.workflow.aa_approve(id, &self.aa).await.unwrap();
        self.workflow.publish(id, &self.admin).await.unwrap()
    }
}

pub fn pdf(name: &str) -> FileUpload {
    FileUpload {
        bytes: b"%PDF-1.7 test".to_vec(),
        filename: name.to_string(),
        mime_type: "application/pdf".to_string(),
        display_name: None,
    }
}

/// Captures formatted log output for assertions.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route this thread's logs into a buffer until the guard drops.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
