use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use bazaar_engine::{AccessError, DisputeApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The request conflicts with existing data. {0}")]
    Conflict(String),
    #[error("Could not establish a WebSocket connection. {0}")]
    WebSocketError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::CouldNotIssueToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::WebSocketError(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Could not issue access token. {0}")]
    CouldNotIssueToken(String),
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        ServerError::AuthenticationError(self.clone()).status_code()
    }

    fn error_response(&self) -> HttpResponse {
        ServerError::AuthenticationError(self.clone()).error_response()
    }
}

/// Failures of a single WebSocket transport. These only ever tear down the connection they occurred on.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("The connection is closed")]
    Closed,
    #[error("WebSocket protocol error. {0}")]
    Protocol(String),
}

impl From<AccessError> for ServerError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::DisputeNotFound(_) | AccessError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            AccessError::Unrelated | AccessError::Resolved(_) => Self::InsufficientPermissions(e.to_string()),
            AccessError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<DisputeApiError> for ServerError {
    fn from(e: DisputeApiError) -> Self {
        match e {
            DisputeApiError::AccessDenied(e) => e.into(),
            DisputeApiError::DisputeNotFound(_) | DisputeApiError::NoDisputeForOrder(_) => {
                Self::NoRecordFound(e.to_string())
            },
            DisputeApiError::DisputeAlreadyExists(_) => Self::Conflict(e.to_string()),
            DisputeApiError::DisputeClosed(_) => Self::InsufficientPermissions(e.to_string()),
            DisputeApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
