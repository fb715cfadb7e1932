use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use uuid::Uuid;

use configs::DirectoryConfig;

use crate::directory::domain::{
    DoctorRecord, DoctorRow, Identity, JoinedUser, ListQuery, NewIdentity, PatientRecord,
    PatientRow, UserRow,
};
use crate::directory::errors::DirectoryError;
use crate::directory::repository::Directory;
use crate::provisioning::errors::ProvisionError;

const PATIENT_SELECT: &str =
    "id,dni,clinical_profile_json,users:users(id,full_name,email,phone,birth_date,picture_url,created_at,updated_at)";
const DOCTOR_SELECT: &str =
    "id,dni,cmp,specialty,users:users(id,full_name,email,phone,birth_date,picture_url,created_at,updated_at)";

/// Administrative client for the hosted backend: GoTrue admin API for
/// identities, PostgREST for the profile tables. Authenticated with the
/// service-role key, so it must never be handed to request-scoped user
/// contexts.
pub struct SupabaseDirectory {
    http: reqwest::Client,
    base_url: String,
}

impl SupabaseDirectory {
    pub fn new(cfg: &DirectoryConfig) -> Result<Self, ProvisionError> {
        cfg.validate().map_err(|e| ProvisionError::Configuration(e.to_string()))?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(cfg.service_role_key.trim())
            .map_err(|_| ProvisionError::Configuration("service role key is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", cfg.service_role_key.trim()))
            .map_err(|_| ProvisionError::Configuration("service role key is not a valid header value".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| ProvisionError::Configuration(e.to_string()))?;

        Ok(Self { http, base_url: cfg.url.trim_end_matches('/').to_string() })
    }

    fn admin_users_url(&self) -> String {
        format!("{}/auth/v1/admin/users", self.base_url)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Map a non-success response into `DirectoryError::Api`, pulling the
    /// human-readable message out of the usual GoTrue/PostgREST shapes.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, DirectoryError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                ["msg", "message", "error_description", "error"]
                    .iter()
                    .find_map(|k| v.get(k).and_then(Value::as_str).map(str::to_string))
            })
            .unwrap_or(body);
        Err(DirectoryError::Api { status: status.as_u16(), message })
    }

    async fn insert_row<T: serde::Serialize + Sync>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<(), DirectoryError> {
        let resp = self
            .http
            .post(self.rest_url(table))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete_row(&self, table: &str, id: Uuid) -> Result<(), DirectoryError> {
        let resp = self
            .http
            .delete(self.rest_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn select_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        query: ListQuery,
    ) -> Result<Vec<T>, DirectoryError> {
        let mut params = vec![
            ("select".to_string(), select.to_string()),
            ("limit".to_string(), query.limit.to_string()),
        ];
        if let Some(id) = query.id {
            params.push(("id".to_string(), format!("eq.{id}")));
        }
        let resp = self
            .http
            .get(self.rest_url(table))
            .query(&params)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;
        let resp = Self::check(resp).await?;
        resp.json::<Vec<T>>().await.map_err(|e| DirectoryError::Decode(e.to_string()))
    }
}

#[derive(serde::Deserialize)]
struct PatientRowWire {
    dni: String,
    clinical_profile_json: Option<Value>,
    // The embedded users resource can be null when the profile row is
    // missing; such rows are dropped rather than surfaced half-formed.
    users: Option<JoinedUser>,
}

#[derive(serde::Deserialize)]
struct DoctorRowWire {
    dni: Option<String>,
    cmp: String,
    specialty: String,
    users: Option<JoinedUser>,
}

#[async_trait]
impl Directory for SupabaseDirectory {
    async fn create_identity(&self, identity: NewIdentity) -> Result<Identity, DirectoryError> {
        let resp = self
            .http
            .post(self.admin_users_url())
            .json(&identity)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;
        let resp = Self::check(resp).await?;
        resp.json::<Identity>().await.map_err(|e| DirectoryError::Decode(e.to_string()))
    }

    async fn delete_identity(&self, user_id: Uuid) -> Result<(), DirectoryError> {
        let resp = self
            .http
            .delete(format!("{}/{}", self.admin_users_url(), user_id))
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn insert_user(&self, row: UserRow) -> Result<(), DirectoryError> {
        self.insert_row("users", &row).await
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), DirectoryError> {
        self.delete_row("users", user_id).await
    }

    async fn insert_patient(&self, row: PatientRow) -> Result<(), DirectoryError> {
        self.insert_row("patients", &row).await
    }

    async fn insert_doctor(&self, row: DoctorRow) -> Result<(), DirectoryError> {
        self.insert_row("doctors", &row).await
    }

    async fn list_patients(&self, query: ListQuery) -> Result<Vec<PatientRecord>, DirectoryError> {
        let rows: Vec<PatientRowWire> =
            self.select_rows("patients", PATIENT_SELECT, query).await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| {
                r.users.map(|user| PatientRecord {
                    user,
                    dni: r.dni,
                    clinical_profile_json: r.clinical_profile_json,
                })
            })
            .collect())
    }

    async fn list_doctors(&self, query: ListQuery) -> Result<Vec<DoctorRecord>, DirectoryError> {
        let rows: Vec<DoctorRowWire> = self.select_rows("doctors", DOCTOR_SELECT, query).await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| {
                r.users.map(|user| DoctorRecord {
                    user,
                    cmp: r.cmp,
                    specialty: r.specialty,
                    dni: r.dni,
                })
            })
            .collect())
    }
}

static SHARED: OnceCell<Arc<SupabaseDirectory>> = OnceCell::new();

/// Process-wide administrative client, lazily constructed on first use.
/// Construction failure (missing endpoint or key) propagates to the first
/// caller; once a client is cached the configuration is not re-read.
pub fn shared_directory() -> Result<Arc<SupabaseDirectory>, ProvisionError> {
    SHARED
        .get_or_try_init(|| {
            let _ = dotenvy::dotenv();
            let cfg = match configs::load_default() {
                Ok(mut app) => {
                    app.directory.normalize_from_env();
                    app.directory
                }
                Err(_) => DirectoryConfig::from_env()
                    .map_err(|e| ProvisionError::Configuration(e.to_string()))?,
            };
            SupabaseDirectory::new(&cfg).map(Arc::new)
        })
        .cloned()
}
