//! Identity service interface and HTTP implementation.

pub mod client;
pub mod error;

pub use client::{AuthGrant, IdentityClient, IdentityService};
pub use error::IdentityError;
