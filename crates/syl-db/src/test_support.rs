//! Shared test utilities for syl-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use syl_core::entities::{Program, Subject, User};
    use syl_core::enums::Role;

    use crate::SqlStore;

    /// Ids seeded by [`seeded_store`].
    pub struct Seed {
        pub lecturer: User,
        pub subject: Subject,
        pub program: Program,
    }

    pub async fn test_store() -> SqlStore {
        SqlStore::open_local(":memory:").await.unwrap()
    }

    /// In-memory store with one lecturer, a subject, and a program.
    pub async fn seeded_store() -> (SqlStore, Seed) {
        let store = test_store().await;
        let lecturer = store
            .create_user("lect@uni.test", "Lena Lecturer", &[Role::Lecturer])
            .await
            .unwrap();
        let subject = store.create_subject("CS101", "Programming I").await.unwrap();
        let program = store.create_program("BSC-CS", "BSc Computer Science").await.unwrap();
        (
            store,
            Seed {
                lecturer,
                subject,
                program,
            },
        )
    }
}
