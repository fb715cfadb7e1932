use thiserror::Error;

/// Failures talking to the hosted identity/row-storage backend.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("directory rejected request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl DirectoryError {
    /// Whether the backend reported a uniqueness conflict (duplicate email
    /// on the identity side, duplicate key on the row side).
    pub fn is_conflict(&self) -> bool {
        match self {
            DirectoryError::Api { status, message } => {
                *status == 409
                    || message.contains("already registered")
                    || message.contains("already been registered")
                    || message.contains("23505")
                    || message.contains("duplicate key")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_detection() {
        let dup = DirectoryError::Api { status: 422, message: "User already registered".into() };
        assert!(dup.is_conflict());

        let unique = DirectoryError::Api {
            status: 400,
            message: r#"duplicate key value violates unique constraint "doctors_cmp_key" (23505)"#
                .into(),
        };
        assert!(unique.is_conflict());

        let plain = DirectoryError::Api { status: 500, message: "boom".into() };
        assert!(!plain.is_conflict());
        assert!(!DirectoryError::Transport("timeout".into()).is_conflict());
    }
}
