//! In-memory [`SyllabusStore`] for tests and embedding.
//!
//! Each transaction works on a private copy of the state and publishes it
//! on commit. Transactions are serialized by the same kind of write gate
//! as the SQL store, so concurrency behavior matches.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use syl_core::entities::{
    Feedback, FileAsset, NewFeedback, NewFileAsset, NewSyllabus, NewWorkflowAction, Program,
    Subject, Subscription, Syllabus, SyllabusVersion, User, WorkflowAction,
};
use syl_core::enums::{Role, WorkflowStatus};
use syl_core::repository::{
    DirectoryRepository, EngagementRepository, FileRepository, RepositoryError,
    StoreTransaction, SyllabusRepository, SyllabusStore,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    next_id: i64,
    users: BTreeMap<i64, User>,
    subjects: BTreeMap<i64, Subject>,
    programs: BTreeMap<i64, Program>,
    syllabi: BTreeMap<i64, Syllabus>,
    versions: BTreeMap<i64, SyllabusVersion>,
    actions: Vec<WorkflowAction>,
    files: BTreeMap<i64, FileAsset>,
    subscriptions: Vec<Subscription>,
    feedback: Vec<Feedback>,
}

impl MemoryState {
    const fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
struct Faults {
    file_insert: AtomicBool,
    commit: AtomicBool,
}

struct Shared {
    state: Mutex<MemoryState>,
    write_gate: Arc<Mutex<()>>,
    faults: Faults,
}

/// Cloneable handle; clones share state.
#[derive(Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(MemoryState::default()),
                write_gate: Arc::new(Mutex::new(())),
                faults: Faults::default(),
            }),
        }
    }

    /// Make the next `add_file` fail with `Unavailable`.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_next_file_insert(&self) {
        self.shared.faults.file_insert.store(true, Ordering::SeqCst);
    }

    /// Make the next `commit` fail with `Unavailable`, discarding the writes.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_next_commit(&self) {
        self.shared.faults.commit.store(true, Ordering::SeqCst);
    }

    // -----------------------------------------------------------------------
    // Seeding
    // -----------------------------------------------------------------------

    pub async fn create_user(&self, email: &str, full_name: &str, roles: &[Role]) -> User {
        let _gate = self.shared.write_gate.lock().await;
        let mut state = self.shared.state.lock().await;
        let mut roles = roles.to_vec();
        roles.sort();
        roles.dedup();
        let user = User {
            id: state.next_id(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            is_active: true,
            roles,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        user
    }

    /// Returns `false` for an unknown user.
    pub async fn deactivate_user(&self, user_id: i64) -> bool {
        let _gate = self.shared.write_gate.lock().await;
        let mut state = self.shared.state.lock().await;
        state
            .users
            .get_mut(&user_id)
            .map(|user| user.is_active = false)
            .is_some()
    }

    pub async fn create_subject(&self, code: &str, name: &str) -> Subject {
        let _gate = self.shared.write_gate.lock().await;
        let mut state = self.shared.state.lock().await;
        let subject = Subject {
            id: state.next_id(),
            code: code.to_string(),
            name: name.to_string(),
        };
        state.subjects.insert(subject.id, subject.clone());
        subject
    }

    pub async fn create_program(&self, code: &str, name: &str) -> Program {
        let _gate = self.shared.write_gate.lock().await;
        let mut state = self.shared.state.lock().await;
        let program = Program {
            id: state.next_id(),
            code: code.to_string(),
            name: name.to_string(),
        };
        state.programs.insert(program.id, program.clone());
        program
    }

    /// Committed file rows, for assertions.
    pub async fn file_count(&self) -> usize {
        self.shared.state.lock().await.files.len()
    }
}

/// A private working copy plus the held write gate.
pub struct MemoryTransaction {
    working: MemoryState,
    shared: Arc<Shared>,
    _gate: OwnedMutexGuard<()>,
}

impl SyllabusStore for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError> {
        let gate = Arc::clone(&self.shared.write_gate).lock_owned().await;
        let working = self.shared.state.lock().await.clone();
        Ok(MemoryTransaction {
            working,
            shared: Arc::clone(&self.shared),
            _gate: gate,
        })
    }
}

impl StoreTransaction for MemoryTransaction {
    async fn commit(self) -> Result<(), RepositoryError> {
        if self.shared.faults.commit.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("injected commit failure".into()));
        }
        *self.shared.state.lock().await = self.working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

impl DirectoryRepository for MemoryTransaction {
    async fn get_user(&mut self, user_id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(self.working.users.get(&user_id).cloned())
    }

    async fn user_roles(&mut self, user_id: i64) -> Result<Vec<Role>, RepositoryError> {
        Ok(self
            .working
            .users
            .get(&user_id)
            .map(|user| user.roles.clone())
            .unwrap_or_default())
    }

    async fn user_exists(&mut self, user_id: i64) -> Result<bool, RepositoryError> {
        Ok(self.working.users.contains_key(&user_id))
    }

    async fn subject_exists(&mut self, subject_id: i64) -> Result<bool, RepositoryError> {
        Ok(self.working.subjects.contains_key(&subject_id))
    }

    async fn program_exists(&mut self, program_id: i64) -> Result<bool, RepositoryError> {
        Ok(self.working.programs.contains_key(&program_id))
    }

    async fn get_subject(&mut self, subject_id: i64) -> Result<Option<Subject>, RepositoryError> {
        Ok(self.working.subjects.get(&subject_id).cloned())
    }

    async fn get_program(&mut self, program_id: i64) -> Result<Option<Program>, RepositoryError> {
        Ok(self.working.programs.get(&program_id).cloned())
    }
}

impl SyllabusRepository for MemoryTransaction {
    async fn get_syllabus(&mut self, id: i64) -> Result<Option<Syllabus>, RepositoryError> {
        Ok(self.working.syllabi.get(&id).cloned())
    }

    async fn add_syllabus(&mut self, new: NewSyllabus) -> Result<Syllabus, RepositoryError> {
        let syllabus = Syllabus {
            id: self.working.next_id(),
            subject_id: new.subject_id,
            program_id: new.program_id,
            owner_lecturer_id: new.owner_lecturer_id,
            current_version_id: None,
            lifecycle_status: WorkflowStatus::Draft,
            created_at: new.created_at,
        };
        self.working.syllabi.insert(syllabus.id, syllabus.clone());
        Ok(syllabus)
    }

    async fn update_syllabus(&mut self, syllabus: &Syllabus) -> Result<(), RepositoryError> {
        let stored = self
            .working
            .syllabi
            .get_mut(&syllabus.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("syllabus {}", syllabus.id)))?;
        stored.subject_id = syllabus.subject_id;
        stored.program_id = syllabus.program_id;
        stored.current_version_id = syllabus.current_version_id;
        Ok(())
    }

    async fn create_initial_version(
        &mut self,
        syllabus_id: i64,
        created_by: i64,
        created_at: DateTime<Utc>,
    ) -> Result<SyllabusVersion, RepositoryError> {
        let version = SyllabusVersion {
            id: self.working.next_id(),
            syllabus_id,
            academic_year: SyllabusVersion::academic_year_for(created_at),
            version_no: 1,
            workflow_status: WorkflowStatus::Draft,
            submitted_at: None,
            approved_at: None,
            published_at: None,
            created_by,
            created_at,
        };
        self.working.versions.insert(version.id, version.clone());
        Ok(version)
    }

    async fn get_version(&mut self, id: i64) -> Result<Option<SyllabusVersion>, RepositoryError> {
        Ok(self.working.versions.get(&id).cloned())
    }

    async fn update_version(&mut self, version: &SyllabusVersion) -> Result<(), RepositoryError> {
        let stored = self
            .working
            .versions
            .get_mut(&version.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("version {}", version.id)))?;
        stored.workflow_status = version.workflow_status;
        stored.submitted_at = version.submitted_at;
        stored.approved_at = version.approved_at;
        stored.published_at = version.published_at;
        Ok(())
    }

    async fn transition_status(
        &mut self,
        syllabus_id: i64,
        expected: WorkflowStatus,
        next: WorkflowStatus,
    ) -> Result<bool, RepositoryError> {
        match self.working.syllabi.get_mut(&syllabus_id) {
            Some(syllabus) if syllabus.lifecycle_status == expected => {
                syllabus.lifecycle_status = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_by_status(
        &mut self,
        status: WorkflowStatus,
    ) -> Result<Vec<Syllabus>, RepositoryError> {
        Ok(self
            .working
            .syllabi
            .values()
            .filter(|s| s.lifecycle_status == status)
            .cloned()
            .collect())
    }

    async fn list_by_owner(&mut self, owner_id: i64) -> Result<Vec<Syllabus>, RepositoryError> {
        Ok(self
            .working
            .syllabi
            .values()
            .filter(|s| s.owner_lecturer_id == owner_id)
            .cloned()
            .collect())
    }

    async fn append_action(
        &mut self,
        action: NewWorkflowAction,
    ) -> Result<WorkflowAction, RepositoryError> {
        let action = WorkflowAction {
            id: self.working.next_id(),
            version_id: action.version_id,
            actor_user_id: action.actor_user_id,
            action_type: action.action_type,
            from_status: action.from_status,
            to_status: action.to_status,
            note: action.note,
            acted_at: action.acted_at,
        };
        self.working.actions.push(action.clone());
        Ok(action)
    }

    async fn list_actions(
        &mut self,
        version_id: i64,
    ) -> Result<Vec<WorkflowAction>, RepositoryError> {
        Ok(self
            .working
            .actions
            .iter()
            .filter(|a| a.version_id == version_id)
            .cloned()
            .collect())
    }
}

impl FileRepository for MemoryTransaction {
    async fn add_file(&mut self, new: NewFileAsset) -> Result<FileAsset, RepositoryError> {
        if self.shared.faults.file_insert.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("injected file insert failure".into()));
        }
        let file = FileAsset {
            id: self.working.next_id(),
            syllabus_version_id: new.syllabus_version_id,
            original_filename: new.original_filename,
            display_name: new.display_name,
            bucket: new.bucket,
            object_path: new.object_path,
            mime_type: new.mime_type,
            size_bytes: new.size_bytes,
            uploaded_by: new.uploaded_by,
            created_at: new.created_at,
        };
        self.working.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn get_file(&mut self, id: i64) -> Result<Option<FileAsset>, RepositoryError> {
        Ok(self.working.files.get(&id).cloned())
    }

    async fn list_files(&mut self, version_id: i64) -> Result<Vec<FileAsset>, RepositoryError> {
        Ok(self
            .working
            .files
            .values()
            .filter(|f| f.syllabus_version_id == version_id)
            .cloned()
            .collect())
    }

    async fn update_file(&mut self, file: &FileAsset) -> Result<(), RepositoryError> {
        let stored = self
            .working
            .files
            .get_mut(&file.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("file {}", file.id)))?;
        stored.original_filename.clone_from(&file.original_filename);
        stored.display_name.clone_from(&file.display_name);
        stored.object_path.clone_from(&file.object_path);
        stored.mime_type.clone_from(&file.mime_type);
        stored.size_bytes = file.size_bytes;
        Ok(())
    }

    async fn delete_file(&mut self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.working.files.remove(&id).is_some())
    }
}

impl EngagementRepository for MemoryTransaction {
    async fn find_subscription(
        &mut self,
        user_id: i64,
        syllabus_id: i64,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Ok(self
            .working
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id && s.syllabus_id == syllabus_id)
            .cloned())
    }

    async fn add_subscription(
        &mut self,
        user_id: i64,
        syllabus_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Subscription, RepositoryError> {
        if self.find_subscription(user_id, syllabus_id).await?.is_some() {
            return Err(RepositoryError::Other(anyhow::anyhow!(
                "duplicate subscription ({user_id}, {syllabus_id})"
            )));
        }
        let subscription = Subscription {
            id: self.working.next_id(),
            user_id,
            syllabus_id,
            created_at,
        };
        self.working.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn add_feedback(&mut self, new: NewFeedback) -> Result<Feedback, RepositoryError> {
        let feedback = Feedback {
            id: self.working.next_id(),
            syllabus_id: new.syllabus_id,
            version_id: new.version_id,
            author_user_id: new.author_user_id,
            rating: new.rating,
            content: new.content,
            created_at: new.created_at,
        };
        self.working.feedback.push(feedback.clone());
        Ok(feedback)
    }

    async fn list_feedback(&mut self, syllabus_id: i64) -> Result<Vec<Feedback>, RepositoryError> {
        Ok(self
            .working
            .feedback
            .iter()
            .filter(|f| f.syllabus_id == syllabus_id)
            .cloned()
            .collect())
    }
}
