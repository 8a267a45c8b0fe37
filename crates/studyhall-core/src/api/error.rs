use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Account already exists: {0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Credential has expired")]
    ExpiredCredential,

    #[error("Credential is not valid")]
    InvalidCredential,

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        IdentityError::Network(err.to_string())
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Machine-readable error payload the identity service attaches to
/// non-success responses. Both fields are optional; older deployments
/// return plain-text bodies.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl IdentityError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            // Back off to a char boundary so multi-byte bodies don't split
            // mid-character.
            let mut cut = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..cut],
                body.len()
            )
        }
    }

    /// Prefer the service's own message over the raw body when present.
    fn detail(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                message: Some(message),
                ..
            }) => message,
            _ => Self::truncate_body(body),
        }
    }

    /// Map a failed account-creation response to an error kind.
    pub fn from_signup_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 | 422 => IdentityError::Validation(Self::detail(body)),
            409 => IdentityError::Conflict(Self::detail(body)),
            _ => IdentityError::Network(format!("Status {}: {}", status, Self::truncate_body(body))),
        }
    }

    /// Map a failed authentication response to an error kind.
    pub fn from_signin_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 | 422 => IdentityError::Validation(Self::detail(body)),
            401 | 403 => IdentityError::InvalidCredentials,
            _ => IdentityError::Network(format!("Status {}: {}", status, Self::truncate_body(body))),
        }
    }

    /// Map a failed credential-resolve response to an error kind.
    ///
    /// A 401 is expired or invalid depending on the service's error code;
    /// when the code is missing or unrecognized the credential is treated
    /// as invalid, which callers handle identically (discard and re-auth).
    pub fn from_resolve_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => {
                let expired = serde_json::from_str::<ErrorBody>(body)
                    .ok()
                    .and_then(|b| b.code)
                    .is_some_and(|code| code.contains("expired"));
                if expired {
                    IdentityError::ExpiredCredential
                } else {
                    IdentityError::InvalidCredential
                }
            }
            _ => IdentityError::Network(format!("Status {}: {}", status, Self::truncate_body(body))),
        }
    }
}
