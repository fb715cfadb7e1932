use thiserror::Error;
use uuid::Uuid;

use crate::directory::errors::DirectoryError;

/// Business errors for the provisioning workflow.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Directory client could not be constructed (missing endpoint or key).
    #[error("directory configuration error: {0}")]
    Configuration(String),

    /// The identity subsystem rejected or failed the create; nothing was
    /// written, nothing to roll back.
    #[error("identity creation failed: {0}")]
    IdentityCreation(#[source] DirectoryError),

    /// The profile-row write failed after the identity existed. The
    /// compensating identity delete has already been attempted; this carries
    /// the original insert failure.
    #[error("profile write failed for user {user_id}: {source}")]
    ProfileWrite {
        user_id: Uuid,
        #[source]
        source: DirectoryError,
    },
}

impl ProvisionError {
    /// Stable numeric code for external mapping/logging.
    pub fn code(&self) -> u16 {
        match self {
            ProvisionError::Configuration(_) => 2001,
            ProvisionError::IdentityCreation(_) => 2002,
            ProvisionError::ProfileWrite { .. } => 2003,
        }
    }

    /// Whether the underlying directory failure was a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        match self {
            ProvisionError::Configuration(_) => false,
            ProvisionError::IdentityCreation(e) => e.is_conflict(),
            ProvisionError::ProfileWrite { source, .. } => source.is_conflict(),
        }
    }
}
