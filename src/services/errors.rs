use thiserror::Error;
use time::PrimitiveDateTime;

/// Failure kinds surfaced by the session, question, answer and result services.
///
/// Callers render countdowns and messages from the variant, so the kinds are
/// never folded into one another.
#[derive(Debug, Error)]
pub(crate) enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    AuthenticationFailure(String),
    #[error("too many failed attempts, blocked until {blocked_until}")]
    RateLimited { blocked_until: PrimitiveDateTime },
    #[error("{0}")]
    Expired(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub(crate) type ServiceResult<T> = Result<T, ServiceError>;
