//! Target store API client - shared by every editing screen.
//!
//! This crate is the single place that speaks HTTP to the target store:
//! token storage, matrix load, bulk upsert, and the mapping from status
//! codes to typed errors. No retries, no backoff: a failed save is
//! resubmitted explicitly by the operator, never silently by the client.

mod auth;
mod client;

pub use auth::{auth_file_path, delete_auth, load_auth, save_auth, AuthCredentials};
pub use client::{StoreClient, StoreError};
