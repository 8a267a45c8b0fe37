//! Authentication module: credential persistence and session management.
//!
//! This module provides:
//! - `CredentialStore`: durable storage for the opaque bearer credential,
//!   with keyring-backed and in-memory implementations
//! - `SessionManager`: the owner of the current session and the
//!   signup/signin/signout/refresh operations

pub mod credentials;
pub mod session;

pub use credentials::{Credential, CredentialStore, KeyringStore, MemoryStore};
pub use session::{SessionError, SessionManager, SessionState};
