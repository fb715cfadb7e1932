use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use models::user::{ProvisionedUser, Role, UserProfile};

use super::credentials;
use super::errors::ProvisionError;
use crate::directory::domain::{IdentityMetadata, NewIdentity, UserRow};
use crate::directory::repository::Directory;

/// Creates and destroys combined identity+profile records against the
/// hosted directory. Request-scoped and stateless; the directory handle is
/// the only thing it holds.
pub struct ProvisioningService<D: Directory + ?Sized> {
    dir: Arc<D>,
}

impl<D: Directory + ?Sized> ProvisioningService<D> {
    pub fn new(dir: Arc<D>) -> Self {
        Self { dir }
    }

    /// Provision a new account: resolve the credential, create the identity,
    /// then write the `users` profile row. If the row write fails the
    /// identity is deleted again before the original failure is surfaced, so
    /// the two records only ever exist as a unit.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::user::{Role, UserProfile};
    /// use service::directory::repository::mock::MockDirectory;
    /// use service::provisioning::service::ProvisioningService;
    /// let svc = ProvisioningService::new(Arc::new(MockDirectory::default()));
    /// let profile = UserProfile {
    ///     full_name: "Ana Ruiz".into(),
    ///     email: "ana@example.com".into(),
    ///     phone: None,
    ///     birth_date: None,
    ///     picture_url: None,
    /// };
    /// let account = tokio_test::block_on(svc.provision(&profile, Role::Patient, None)).unwrap();
    /// assert!(account.temporary_password.starts_with("Pausiva-"));
    /// ```
    #[instrument(skip(self, profile, explicit_password), fields(email = %profile.email, role = %role))]
    pub async fn provision(
        &self,
        profile: &UserProfile,
        role: Role,
        explicit_password: Option<&str>,
    ) -> Result<ProvisionedUser, ProvisionError> {
        let password = credentials::resolve_credential(explicit_password);

        let identity = self
            .dir
            .create_identity(NewIdentity {
                email: profile.email.clone(),
                password: password.clone(),
                email_confirm: true,
                user_metadata: IdentityMetadata { role, full_name: profile.full_name.clone() },
            })
            .await
            .map_err(ProvisionError::IdentityCreation)?;
        let user_id = identity.id;

        let row = UserRow {
            id: user_id,
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            birth_date: profile.birth_date.clone(),
            picture_url: profile.picture_url.clone(),
        };
        if let Err(insert_err) = self.dir.insert_user(row).await {
            // Compensate: the identity must not outlive its profile row. The
            // delete is not retried; if it fails too the inconsistency is
            // visible here only, and the insert failure is what propagates.
            if let Err(rollback_err) = self.dir.delete_identity(user_id).await {
                error!(%user_id, error = %rollback_err, "compensating identity delete failed, identity may be orphaned");
            }
            return Err(ProvisionError::ProfileWrite { user_id, source: insert_err });
        }

        info!(%user_id, role = %role, "user_provisioned");
        Ok(ProvisionedUser { user_id, temporary_password: password })
    }

    /// Best-effort removal of a provisioned account. Each sub-delete is
    /// attempted exactly once; failures are logged and never surfaced, so
    /// administrative cleanup is never blocked by partial state.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::directory::repository::mock::MockDirectory;
    /// use service::provisioning::service::ProvisioningService;
    /// let svc = ProvisioningService::new(Arc::new(MockDirectory::default()));
    /// tokio_test::block_on(svc.teardown(uuid::Uuid::new_v4()));
    /// ```
    #[instrument(skip(self))]
    pub async fn teardown(&self, user_id: Uuid) {
        if let Err(e) = self.dir.delete_user(user_id).await {
            warn!(%user_id, error = %e, "failed to delete user profile row");
        }
        if let Err(e) = self.dir.delete_identity(user_id).await {
            warn!(%user_id, error = %e, "failed to delete identity record");
        }
    }
}
