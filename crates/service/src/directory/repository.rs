use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{
    DoctorRecord, DoctorRow, Identity, ListQuery, NewIdentity, PatientRecord, PatientRow, UserRow,
};
use super::errors::DirectoryError;

/// Capabilities the provisioning flows consume from the hosted backend:
/// identity administration plus row storage for the profile tables.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn create_identity(&self, identity: NewIdentity) -> Result<Identity, DirectoryError>;
    async fn delete_identity(&self, user_id: Uuid) -> Result<(), DirectoryError>;

    async fn insert_user(&self, row: UserRow) -> Result<(), DirectoryError>;
    async fn delete_user(&self, user_id: Uuid) -> Result<(), DirectoryError>;

    async fn insert_patient(&self, row: PatientRow) -> Result<(), DirectoryError>;
    async fn insert_doctor(&self, row: DoctorRow) -> Result<(), DirectoryError>;

    async fn list_patients(&self, query: ListQuery) -> Result<Vec<PatientRecord>, DirectoryError>;
    async fn list_doctors(&self, query: ListQuery) -> Result<Vec<DoctorRecord>, DirectoryError>;
}

/// In-memory mock backend for tests and doc examples, with per-operation
/// failure switches and call counters for asserting rollback behavior.
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::directory::domain::JoinedUser;

    #[derive(Default)]
    struct MockState {
        identities: HashMap<Uuid, NewIdentity>,
        users: HashMap<Uuid, UserRow>,
        patients: HashMap<Uuid, PatientRow>,
        doctors: HashMap<Uuid, DoctorRow>,
    }

    #[derive(Default)]
    pub struct MockDirectory {
        state: Mutex<MockState>,
        pub fail_create_identity: AtomicBool,
        pub fail_delete_identity: AtomicBool,
        pub fail_insert_user: AtomicBool,
        pub fail_delete_user: AtomicBool,
        pub fail_insert_patient: AtomicBool,
        pub fail_insert_doctor: AtomicBool,
        pub delete_identity_calls: AtomicUsize,
        pub delete_user_calls: AtomicUsize,
    }

    impl MockDirectory {
        fn backend_down(op: &str) -> DirectoryError {
            DirectoryError::Api { status: 500, message: format!("{op} unavailable") }
        }

        pub fn identity_exists(&self, user_id: Uuid) -> bool {
            self.state.lock().unwrap().identities.contains_key(&user_id)
        }

        pub fn user_row_exists(&self, user_id: Uuid) -> bool {
            self.state.lock().unwrap().users.contains_key(&user_id)
        }

        pub fn identity_count(&self) -> usize {
            self.state.lock().unwrap().identities.len()
        }

        fn joined_user(row: &UserRow) -> JoinedUser {
            let now = Utc::now();
            JoinedUser {
                id: row.id,
                full_name: row.full_name.clone(),
                email: row.email.clone(),
                phone: row.phone.clone(),
                birth_date: row.birth_date.clone(),
                picture_url: row.picture_url.clone(),
                created_at: now,
                updated_at: now,
            }
        }
    }

    #[async_trait]
    impl Directory for MockDirectory {
        async fn create_identity(&self, identity: NewIdentity) -> Result<Identity, DirectoryError> {
            if self.fail_create_identity.load(Ordering::SeqCst) {
                return Err(Self::backend_down("identity service"));
            }
            let mut state = self.state.lock().unwrap();
            if state.identities.values().any(|i| i.email == identity.email) {
                return Err(DirectoryError::Api {
                    status: 422,
                    message: "User already registered".into(),
                });
            }
            let id = Uuid::new_v4();
            state.identities.insert(id, identity);
            Ok(Identity { id })
        }

        async fn delete_identity(&self, user_id: Uuid) -> Result<(), DirectoryError> {
            self.delete_identity_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete_identity.load(Ordering::SeqCst) {
                return Err(Self::backend_down("identity delete"));
            }
            self.state.lock().unwrap().identities.remove(&user_id);
            Ok(())
        }

        async fn insert_user(&self, row: UserRow) -> Result<(), DirectoryError> {
            if self.fail_insert_user.load(Ordering::SeqCst) {
                return Err(Self::backend_down("users insert"));
            }
            self.state.lock().unwrap().users.insert(row.id, row);
            Ok(())
        }

        async fn delete_user(&self, user_id: Uuid) -> Result<(), DirectoryError> {
            self.delete_user_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete_user.load(Ordering::SeqCst) {
                return Err(Self::backend_down("users delete"));
            }
            self.state.lock().unwrap().users.remove(&user_id);
            Ok(())
        }

        async fn insert_patient(&self, row: PatientRow) -> Result<(), DirectoryError> {
            if self.fail_insert_patient.load(Ordering::SeqCst) {
                return Err(Self::backend_down("patients insert"));
            }
            self.state.lock().unwrap().patients.insert(row.id, row);
            Ok(())
        }

        async fn insert_doctor(&self, row: DoctorRow) -> Result<(), DirectoryError> {
            if self.fail_insert_doctor.load(Ordering::SeqCst) {
                return Err(Self::backend_down("doctors insert"));
            }
            let mut state = self.state.lock().unwrap();
            if state.doctors.values().any(|d| d.cmp == row.cmp) {
                return Err(DirectoryError::Api {
                    status: 409,
                    message: r#"duplicate key value violates unique constraint "doctors_cmp_key""#
                        .into(),
                });
            }
            state.doctors.insert(row.id, row);
            Ok(())
        }

        async fn list_patients(
            &self,
            query: ListQuery,
        ) -> Result<Vec<PatientRecord>, DirectoryError> {
            let state = self.state.lock().unwrap();
            let mut out = Vec::new();
            for (id, patient) in &state.patients {
                if query.id.is_some_and(|want| want != *id) {
                    continue;
                }
                // Rows whose users join is missing are skipped, like the
                // embedded-resource read does.
                if let Some(user) = state.users.get(id) {
                    out.push(PatientRecord {
                        user: Self::joined_user(user),
                        dni: patient.dni.clone(),
                        clinical_profile_json: patient.clinical_profile_json.clone(),
                    });
                }
            }
            out.truncate(query.limit);
            Ok(out)
        }

        async fn list_doctors(&self, query: ListQuery) -> Result<Vec<DoctorRecord>, DirectoryError> {
            let state = self.state.lock().unwrap();
            let mut out = Vec::new();
            for (id, doctor) in &state.doctors {
                if query.id.is_some_and(|want| want != *id) {
                    continue;
                }
                if let Some(user) = state.users.get(id) {
                    out.push(DoctorRecord {
                        user: Self::joined_user(user),
                        cmp: doctor.cmp.clone(),
                        specialty: doctor.specialty.clone(),
                        dni: doctor.dni.clone(),
                    });
                }
            }
            out.truncate(query.limit);
            Ok(out)
        }
    }
}
