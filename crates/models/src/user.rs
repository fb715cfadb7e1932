use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// Profile fields collected when provisioning a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub picture_url: Option<String>,
}

/// Platform role recorded on the identity. Wire values match what the
/// existing clients send (`paciente` / `doctor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "paciente")]
    Patient,
    #[serde(rename = "doctor")]
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "paciente",
            Role::Doctor => "doctor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful provisioning call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionedUser {
    pub user_id: Uuid,
    pub temporary_password: String,
}

/// Syntactic plausibility only; the identity subsystem stays authoritative.
pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    let plausible = !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);
    if plausible {
        Ok(())
    } else {
        Err(ModelError::Validation("valid email is required".into()))
    }
}

pub fn validate_full_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("full name is required".into()));
    }
    Ok(())
}

fn validate_birth_date(date: &str) -> Result<(), ModelError> {
    let shape_ok = date.len() == 10
        && chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok();
    if shape_ok {
        Ok(())
    } else {
        Err(ModelError::Validation("birthDate must follow YYYY-MM-DD format".into()))
    }
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl UserProfile {
    /// Trim everything, lowercase the email, drop blank optionals, and
    /// reject structurally invalid input.
    pub fn normalized(self) -> Result<UserProfile, ModelError> {
        validate_full_name(&self.full_name)?;
        validate_email(&self.email)?;

        let birth_date = none_if_blank(self.birth_date);
        if let Some(date) = &birth_date {
            validate_birth_date(date)?;
        }

        Ok(UserProfile {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: none_if_blank(self.phone),
            birth_date,
            picture_url: none_if_blank(self.picture_url),
        })
    }
}
