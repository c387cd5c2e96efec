use api_types::Envelope;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use server::{ServerState, app, run_with_listener};

mod categories;
mod extract;
mod server;
mod transactions;
mod user;

pub mod types {
    pub use api_types::Envelope;

    pub mod user {
        pub use api_types::user::{UserRegister, UserUpdate, UserView};
    }

    pub mod category {
        pub use api_types::category::{CategoryCreate, CategoryUpdate, CategoryView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            DateGroupView, TransactionListQuery, TransactionListResponse, TransactionNew,
            TransactionUpdate, TransactionView,
        };
    }
}

pub enum ServerError {
    /// An engine call failed. `failure` replaces the message of internal
    /// errors so store details never reach the client.
    Engine {
        failure: &'static str,
        source: EngineError,
    },
    Generic(String),
    NotFound(&'static str),
    Unauthorized,
}

impl ServerError {
    /// Adapter for `map_err` naming the operation that failed.
    pub(crate) fn failed(failure: &'static str) -> impl FnOnce(EngineError) -> ServerError {
        move |source| ServerError::Engine { failure, source }
    }
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::InUse(_) => StatusCode::CONFLICT,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::Database(_) | EngineError::Password(_) | EngineError::PasswordTask(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::CategoryNotFound(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidKind(_)
        | EngineError::InvalidPassword(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(failure: &'static str, err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            failure.to_string()
        }
        EngineError::Password(hash_err) => {
            tracing::error!("password hashing error: {hash_err}");
            failure.to_string()
        }
        EngineError::PasswordTask(join_err) => {
            tracing::error!("password task error: {join_err}");
            failure.to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ServerError::Engine { failure, source } => (
                status_for_engine_error(&source),
                message_for_engine_error(failure, source),
            ),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        };

        (status, Json(Envelope::<()>::failure(message))).into_response()
    }
}

/// Prefix of every message for a request axum could not decode.
const VALIDATION_FAILED: &str = "Validation failed";

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("rejected request body: {}", rejection.body_text());
        Self::Generic(format!("{VALIDATION_FAILED}: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("rejected path: {}", rejection.body_text());
        Self::Generic(format!("{VALIDATION_FAILED}: {}", rejection.body_text()))
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine {
            failure: "internal server error",
            source: value,
        }
    }
}
