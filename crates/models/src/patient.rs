use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ModelError;

/// Patient-specific fields stored in the `patients` role table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientMetadata {
    pub dni: String,
    #[serde(default)]
    pub clinical_profile: Option<Value>,
}

impl PatientMetadata {
    pub fn normalized(self) -> Result<PatientMetadata, ModelError> {
        let dni = self.dni.trim().to_string();
        if dni.is_empty() {
            return Err(ModelError::Validation("DNI is required".into()));
        }
        Ok(PatientMetadata {
            dni,
            clinical_profile: normalize_clinical_profile(self.clinical_profile)?,
        })
    }
}

/// Clinical profiles arrive either as a JSON object or as a JSON-encoded
/// string (legacy clients). Strings must parse to an object; anything else
/// collapses to `None`.
pub fn normalize_clinical_profile(value: Option<Value>) -> Result<Option<Value>, ModelError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => {
            let parsed: Value = serde_json::from_str(&raw)
                .map_err(|_| ModelError::Validation("clinicalProfile must be valid JSON".into()))?;
            match parsed {
                Value::Object(_) => Ok(Some(parsed)),
                _ => Ok(None),
            }
        }
        Some(other) => Ok(Some(other)),
    }
}
