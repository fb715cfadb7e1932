use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use models::user::Role;

/// Request to mint a new identity record. The account is created
/// pre-confirmed so the user can sign in with the temporary credential
/// without an email round-trip.
#[derive(Debug, Clone, Serialize)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub email_confirm: bool,
    pub user_metadata: IdentityMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentityMetadata {
    pub role: Role,
    pub full_name: String,
}

/// Identity as assigned by the identity subsystem. The id is owned by that
/// subsystem from this point on.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub id: Uuid,
}

/// Row for the shared `users` profile table. Optional fields serialize as
/// explicit nulls so the stored row always carries every column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub picture_url: Option<String>,
}

/// Row for the `patients` role table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRow {
    pub id: Uuid,
    pub dni: String,
    pub clinical_profile_json: Option<Value>,
}

/// Row for the `doctors` role table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRow {
    pub id: Uuid,
    pub cmp: String,
    pub specialty: String,
    pub dni: Option<String>,
}

/// Filter for joined reads: either one record by id or the latest `limit`.
#[derive(Debug, Clone, Copy)]
pub struct ListQuery {
    pub id: Option<Uuid>,
    pub limit: usize,
}

/// The `users` half of a joined role-table read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinedUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub user: JoinedUser,
    pub dni: String,
    pub clinical_profile_json: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub user: JoinedUser,
    pub cmp: String,
    pub specialty: String,
    pub dni: Option<String>,
}
