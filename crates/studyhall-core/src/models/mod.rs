//! Domain models shared across the crate.

pub mod user;

pub use user::UserIdentity;
