use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use common::pagination::clamp_limit;
use models::doctor::DoctorMetadata;
use models::patient::PatientMetadata;
use models::user::{Role, UserProfile};
use service::directory::domain::{
    DoctorRecord, DoctorRow, JoinedUser, ListQuery, PatientRecord, PatientRow,
};
use service::directory::repository::Directory;
use service::provisioning::errors::ProvisionError;
use service::provisioning::service::ProvisioningService;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct ServerState {
    pub directory: Arc<dyn Directory>,
}

impl ServerState {
    fn provisioning(&self) -> ProvisioningService<dyn Directory> {
        ProvisioningService::new(self.directory.clone())
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CredentialsBody {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePatientBody {
    pub profile: UserProfile,
    pub metadata: PatientMetadata,
    #[serde(default)]
    pub credentials: Option<CredentialsBody>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDoctorBody {
    pub profile: UserProfile,
    pub metadata: DoctorMetadata,
    #[serde(default)]
    pub credentials: Option<CredentialsBody>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub id: Option<Uuid>,
    // Kept as a raw string so garbage falls back to the default instead of
    // turning into a 400 on extraction.
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileOut {
    full_name: String,
    email: String,
    phone: Option<String>,
    birth_date: Option<String>,
    picture_url: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<JoinedUser> for ProfileOut {
    fn from(u: JoinedUser) -> Self {
        Self {
            full_name: u.full_name,
            email: u.email,
            phone: u.phone,
            birth_date: u.birth_date,
            picture_url: u.picture_url,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

fn patient_json(record: PatientRecord) -> Value {
    let id = record.user.id;
    json!({
        "id": id,
        "type": "patient",
        "profile": ProfileOut::from(record.user),
        "metadata": {
            "dni": record.dni,
            "clinicalProfile": record.clinical_profile_json,
        },
    })
}

fn doctor_json(record: DoctorRecord) -> Value {
    let id = record.user.id;
    json!({
        "id": id,
        "type": "doctor",
        "profile": ProfileOut::from(record.user),
        "metadata": {
            "dni": record.dni,
            "cmp": record.cmp,
            "specialty": record.specialty,
        },
    })
}

fn created_json(id: Uuid, email: &str, temporary_password: &str) -> Value {
    json!({
        "data": {
            "id": id,
            "email": email,
            "temporaryPassword": temporary_password,
        }
    })
}

fn list_json(entity: &str, items: Vec<Value>, limit: usize) -> Value {
    let count = items.len();
    json!({
        "data": items,
        "meta": {
            "entity": entity,
            "count": count,
            "limit": limit,
        }
    })
}

fn map_provision_error(err: ProvisionError) -> ApiError {
    if err.is_conflict() {
        return ApiError::conflict("Email is already registered on the platform.");
    }
    error!(code = err.code(), error = %err, "provisioning failed");
    ApiError::internal(err.to_string())
}

#[utoipa::path(post, path = "/api/users/patients", tag = "users",
    request_body = crate::openapi::CreatePatientRequest,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn create_patient(
    State(state): State<ServerState>,
    Json(body): Json<CreatePatientBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let profile = body.profile.normalized().map_err(|e| ApiError::bad_request(e.to_string()))?;
    let metadata = body.metadata.normalized().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let password = body.credentials.unwrap_or_default().password;
    let svc = state.provisioning();
    let account = svc
        .provision(&profile, Role::Patient, password.as_deref())
        .await
        .map_err(map_provision_error)?;

    let row = PatientRow {
        id: account.user_id,
        dni: metadata.dni,
        clinical_profile_json: metadata.clinical_profile,
    };
    if let Err(e) = state.directory.insert_patient(row).await {
        // The account is half-created at this point; undo it before failing.
        svc.teardown(account.user_id).await;
        error!(user_id = %account.user_id, error = %e, "failed to insert patient row");
        if e.is_conflict() {
            return Err(ApiError::conflict("A patient with this DNI already exists."));
        }
        return Err(ApiError::internal("Could not create patient record."));
    }

    Ok((
        StatusCode::CREATED,
        Json(created_json(account.user_id, &profile.email, &account.temporary_password)),
    ))
}

#[utoipa::path(post, path = "/api/users/doctors", tag = "users",
    request_body = crate::openapi::CreateDoctorRequest,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn create_doctor(
    State(state): State<ServerState>,
    Json(body): Json<CreateDoctorBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let profile = body.profile.normalized().map_err(|e| ApiError::bad_request(e.to_string()))?;
    let metadata = body.metadata.normalized().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let password = body.credentials.unwrap_or_default().password;
    let svc = state.provisioning();
    let account = svc
        .provision(&profile, Role::Doctor, password.as_deref())
        .await
        .map_err(map_provision_error)?;

    let row = DoctorRow {
        id: account.user_id,
        cmp: metadata.cmp,
        specialty: metadata.specialty,
        dni: metadata.dni,
    };
    if let Err(e) = state.directory.insert_doctor(row).await {
        svc.teardown(account.user_id).await;
        error!(user_id = %account.user_id, error = %e, "failed to insert doctor row");
        if e.is_conflict() {
            return Err(ApiError::conflict("A doctor with this CMP is already registered."));
        }
        return Err(ApiError::internal("Could not create doctor record."));
    }

    Ok((
        StatusCode::CREATED,
        Json(created_json(account.user_id, &profile.email, &account.temporary_password)),
    ))
}

#[utoipa::path(get, path = "/api/users/patients", tag = "users",
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn list_patients(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let limit = clamp_limit(params.limit.as_deref());
    let mut records = state
        .directory
        .list_patients(ListQuery { id: params.id, limit })
        .await
        .map_err(|e| {
            error!(error = %e, "failed to fetch patients");
            ApiError::internal("Unexpected error fetching patients.")
        })?;

    if params.id.is_some() && records.is_empty() {
        return Err(ApiError::not_found("Patient not found."));
    }

    records.sort_by(|a, b| b.user.created_at.cmp(&a.user.created_at));
    let items: Vec<Value> = records.into_iter().map(patient_json).collect();
    Ok(Json(list_json("patient", items, limit)))
}

#[utoipa::path(get, path = "/api/users/doctors", tag = "users",
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn list_doctors(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let limit = clamp_limit(params.limit.as_deref());
    let mut records = state
        .directory
        .list_doctors(ListQuery { id: params.id, limit })
        .await
        .map_err(|e| {
            error!(error = %e, "failed to fetch doctors");
            ApiError::internal("Unexpected error fetching doctors.")
        })?;

    if params.id.is_some() && records.is_empty() {
        return Err(ApiError::not_found("Doctor not found."));
    }

    records.sort_by(|a, b| b.user.created_at.cmp(&a.user.created_at));
    let items: Vec<Value> = records.into_iter().map(doctor_json).collect();
    Ok(Json(list_json("doctor", items, limit)))
}
