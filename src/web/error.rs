use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    auth::{CryptError, DenyReason},
    error::log_error,
    model::{DatabaseError, ResourceType},
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("ValidationFailed: {message}")]
    ValidationFailed { message: String },

    #[error("MalformedRequest: {reason}")]
    MalformedRequest {
        message: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationTokenMissing")]
    AuthenticationTokenMissing,

    #[error("AuthenticationTokenInvalid. Error: {reason}")]
    AuthenticationTokenInvalid { reason: String },

    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,

    #[error("AuthenticationAccountDisabled")]
    AuthenticationAccountDisabled,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceInvalidId: {resource_type:?}. Error: {reason}")]
    ResourceInvalidId {
        resource_type: ResourceType,
        reason: String,
    },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceConflict: {resource_type:?}. Error: {error}")]
    ResourceConflict {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceRoleLookupFailed")]
    ResourceRoleLookupFailed,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] crate::auth::CryptError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn client_display(&self) -> String {
        String::from("Internal server error")
    }
}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ValidationFailed { message } => message.clone(),
            Self::MalformedRequest { message, .. } => String::from(*message),
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationTokenMissing => StatusCode::UNAUTHORIZED,
            Self::AuthenticationTokenInvalid { .. } => StatusCode::UNAUTHORIZED,
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::AuthenticationInvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationAccountDisabled => StatusCode::FORBIDDEN,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationTokenMissing => String::from("Unauthorized - No token provided"),
            Self::AuthenticationTokenInvalid { .. } => String::from("Unauthorized - Invalid token"),
            Self::AuthenticationRequired => {
                String::from("Unauthorized - Authentication required")
            }
            Self::AuthenticationInvalidCredentials => String::from("Invalid login credentials"),
            Self::AuthenticationAccountDisabled => String::from("Account is deactivated"),
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } | Self::ResourceInvalidId { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceConflict { error, .. } => match error {
                DatabaseError::VersionMismatch { .. } => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::ResourceRoleLookupFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { resource_type }
            | Self::ResourceInvalidId { resource_type, .. } => match resource_type {
                ResourceType::Consultation => {
                    String::from("Consultation not found or not authorized")
                }
                other => format!("{} not found", other.label()),
            },
            Self::ResourceForbidden { .. } => String::from("Forbidden - Admin access required"),
            Self::ResourceFetchError { .. } => String::from("Internal server error"),
            Self::ResourceConflict { error, .. } => match error {
                DatabaseError::EmailTaken => String::from("User already registered"),
                DatabaseError::AlreadyEnrolled => {
                    String::from("User already enrolled in this course")
                }
                DatabaseError::SlotUnavailable => {
                    String::from("This slot is no longer available")
                }
                DatabaseError::NotScheduled => {
                    String::from("Only scheduled consultations can be cancelled")
                }
                DatabaseError::VersionMismatch { .. } => String::from(
                    "Enrollment was modified by another request, reload and try again",
                ),
                _ => String::from("Request conflicts with the current state"),
            },
            Self::ResourceRoleLookupFailed => String::from("Failed to verify user role"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ValidationError - {0}")]
    ValidationError(#[from] ValidationError),
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::ValidationError(ValidationError::ValidationFailed {
            message: message.into(),
        })
    }

    /// Presence failures win over format failures, then fields go by name so
    /// the reply is stable across runs.
    pub fn from_validation(errors: ValidationErrors) -> Self {
        let mut messages: Vec<(bool, String, String)> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().filter_map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| (e.code != "required", field.to_string(), m.to_string()))
                })
            })
            .collect();
        messages.sort();

        match messages.into_iter().next() {
            Some((_, _, message)) => Self::validation(message),
            None => Self::validation("Invalid request"),
        }
    }

    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_invalid_id<S: Into<String>>(r#type: ResourceType, reason: S) -> Self {
        Self::ResourceError(ResourceError::ResourceInvalidId {
            resource_type: r#type,
            reason: reason.into(),
        })
    }

    /// A caller that is not the owner gets the same answer as for a missing
    /// resource, so ownership checks do not reveal what exists.
    pub fn from_denial(r#type: ResourceType, reason: DenyReason) -> Self {
        match reason {
            DenyReason::AdminRequired => Self::ResourceError(ResourceError::ResourceForbidden {
                resource_type: r#type,
            }),
            DenyReason::NotOwner => Self::resource_not_found(r#type),
        }
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn role_lookup_failed() -> Self {
        Self::ResourceError(ResourceError::ResourceRoleLookupFailed)
    }

    /// Maps store outcomes onto the HTTP taxonomy.
    pub fn from_database(r#type: ResourceType, error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(resource_type) => Self::resource_not_found(resource_type),
            DatabaseError::EmailTaken
            | DatabaseError::AlreadyEnrolled
            | DatabaseError::SlotUnavailable
            | DatabaseError::NotScheduled
            | DatabaseError::VersionMismatch { .. } => {
                Self::ResourceError(ResourceError::ResourceConflict {
                    resource_type: r#type,
                    error,
                })
            }
            other => Self::resource_fetch_error(r#type, other),
        }
    }

    pub fn auth_token_missing() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenMissing)
    }

    pub fn auth_token_invalid<S: Into<String>>(reason: S) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenInvalid {
            reason: reason.into(),
        })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn auth_account_disabled() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationAccountDisabled)
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ValidationError(e) => e.status_code(),
            Self::ResourceError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ValidationError(e) => e.client_display(),
            Self::ResourceError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::MissingJsonContentType(_) => "Request body must be JSON",
            JsonRejection::JsonSyntaxError(_) => "Malformed JSON body",
            _ => "Invalid request body",
        };
        Self::ValidationError(ValidationError::MalformedRequest {
            message,
            reason: rejection.body_text(),
        })
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        Self::ValidationError(ValidationError::MalformedRequest {
            message: "Invalid query parameters",
            reason: rejection.body_text(),
        })
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub error: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let body = ErrorResponse {
            error: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}
