//! Core session-management library for the studyhall client.
//!
//! This crate owns the client's view of "who is signed in": it persists an
//! opaque credential, resolves it to a user identity against the remote
//! identity service, and publishes a single source-of-truth session snapshot
//! to any number of consumers.
//!
//! The entry point is [`auth::SessionManager`]: construct one at process
//! startup with a [`auth::CredentialStore`] and an [`api::IdentityService`],
//! call `initialize()` once, then share it (behind an `Arc`) with every
//! consumer that needs the current session or the signup/signin/signout
//! operations.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
