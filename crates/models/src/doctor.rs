use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Doctor-specific fields stored in the `doctors` role table. CMP is the
/// medical-college registration number and must be unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorMetadata {
    pub cmp: String,
    pub specialty: String,
    #[serde(default)]
    pub dni: Option<String>,
}

impl DoctorMetadata {
    pub fn normalized(self) -> Result<DoctorMetadata, ModelError> {
        let cmp = self.cmp.trim().to_string();
        if cmp.is_empty() {
            return Err(ModelError::Validation("CMP is required".into()));
        }
        let specialty = self.specialty.trim().to_string();
        if specialty.is_empty() {
            return Err(ModelError::Validation("specialty is required".into()));
        }
        Ok(DoctorMetadata {
            cmp,
            specialty,
            dni: self.dni.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
        })
    }
}
