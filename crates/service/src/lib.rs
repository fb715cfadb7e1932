//! Service layer for account provisioning on top of the hosted directory.
//! - `directory` abstracts the identity + row-storage backend behind a trait.
//! - `provisioning` implements the two-step create with compensating rollback.

pub mod directory;
pub mod provisioning;
