use rand::rngs::OsRng;
use rand::Rng;
use sqlx::PgPool;
use time::{Duration, PrimitiveDateTime};

use crate::core::config::SessionSettings;
use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::TestSession;
use crate::db::types::SessionStatus;
use crate::repositories;
use crate::services::errors::{ServiceError, ServiceResult};

pub(crate) const OTP_LENGTH: usize = 6;
pub(crate) const MAX_OTP_ATTEMPTS: i32 = 3;
pub(crate) const LOCKOUT_SECONDS: i64 = 15;
pub(crate) const DEFAULT_OTP_EXPIRY_MINUTES: i64 = 180;

/// Timing rules for issuing and verifying OTP-gated sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionPolicy {
    pub(crate) otp_validity: Duration,
    pub(crate) lockout: Duration,
    pub(crate) max_attempts: i32,
}

impl SessionPolicy {
    pub(crate) fn from_settings(settings: &SessionSettings) -> Self {
        Self { otp_validity: Duration::minutes(settings.otp_expiry_minutes), ..Self::default() }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            otp_validity: Duration::minutes(DEFAULT_OTP_EXPIRY_MINUTES),
            lockout: Duration::seconds(LOCKOUT_SECONDS),
            max_attempts: MAX_OTP_ATTEMPTS,
        }
    }
}

/// Outcome of a single OTP submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OtpVerdict {
    Accepted,
    Mismatch { attempts_remaining: i32 },
    Blocked { blocked_until: PrimitiveDateTime },
    Expired,
    /// The session already finished; OTPs are no longer checked.
    Closed,
}

impl OtpVerdict {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Mismatch { .. } => "mismatch",
            Self::Blocked { .. } => "blocked",
            Self::Expired => "expired",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) verdict: OtpVerdict,
    /// Whether the session row must be written back.
    pub(crate) dirty: bool,
}

pub(crate) fn generate_otp() -> String {
    generate_otp_with(&mut OsRng)
}

pub(crate) fn generate_otp_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..OTP_LENGTH).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

/// Runs the expiry/lockout state machine for one submission against `session`.
pub(crate) fn apply_verification(
    session: &mut TestSession,
    submitted: &str,
    now: PrimitiveDateTime,
    policy: &SessionPolicy,
) -> Transition {
    match session.status {
        SessionStatus::Completed => {
            return Transition { verdict: OtpVerdict::Closed, dirty: false };
        }
        SessionStatus::Expired => {
            return Transition { verdict: OtpVerdict::Expired, dirty: false };
        }
        SessionStatus::Active | SessionStatus::Blocked => {}
    }

    if now > session.expires_at {
        session.status = SessionStatus::Expired;
        return Transition { verdict: OtpVerdict::Expired, dirty: true };
    }

    if session.status == SessionStatus::Blocked {
        match session.blocked_until {
            Some(blocked_until) if now < blocked_until => {
                return Transition { verdict: OtpVerdict::Blocked { blocked_until }, dirty: false };
            }
            _ => {
                session.status = SessionStatus::Active;
                session.otp_attempts = 0;
            }
        }
    }

    if session.otp != submitted {
        session.otp_attempts += 1;

        if session.otp_attempts >= policy.max_attempts {
            let blocked_until = now + policy.lockout;
            session.status = SessionStatus::Blocked;
            session.blocked_until = Some(blocked_until);
            return Transition { verdict: OtpVerdict::Blocked { blocked_until }, dirty: true };
        }

        let attempts_remaining = policy.max_attempts - session.otp_attempts;
        return Transition { verdict: OtpVerdict::Mismatch { attempts_remaining }, dirty: true };
    }

    if session.started_at.is_none() {
        session.started_at = Some(now);
    }

    // Always dirty here: an unblock above may have reset status and attempts.
    Transition { verdict: OtpVerdict::Accepted, dirty: true }
}

pub(crate) fn is_session_usable(session: &TestSession, now: PrimitiveDateTime) -> bool {
    session.status == SessionStatus::Active
        && now <= session.expires_at
        && session.started_at.is_some()
}

/// Explains why `session` cannot serve questions or accept answers.
pub(crate) fn usability_error(session: &TestSession, now: PrimitiveDateTime) -> Option<ServiceError> {
    if is_session_usable(session, now) {
        return None;
    }

    let error = match session.status {
        SessionStatus::Completed => ServiceError::validation("Session is already completed"),
        SessionStatus::Expired => ServiceError::Expired("Session has expired".to_string()),
        _ if now > session.expires_at => ServiceError::Expired("Session has expired".to_string()),
        SessionStatus::Blocked => match session.blocked_until {
            Some(blocked_until) if now < blocked_until => {
                ServiceError::RateLimited { blocked_until }
            }
            _ => ServiceError::AuthenticationFailure(
                "OTP must be verified again after lockout".to_string(),
            ),
        },
        SessionStatus::Active => ServiceError::AuthenticationFailure(
            "OTP has not been verified for this session".to_string(),
        ),
    };

    Some(error)
}

pub(crate) async fn create_session(
    pool: &PgPool,
    policy: &SessionPolicy,
    student_id: i64,
    test_id: i64,
) -> ServiceResult<TestSession> {
    create_session_at(pool, policy, student_id, test_id, primitive_now_utc()).await
}

pub(crate) async fn create_session_at(
    pool: &PgPool,
    policy: &SessionPolicy,
    student_id: i64,
    test_id: i64,
    now: PrimitiveDateTime,
) -> ServiceResult<TestSession> {
    let mut tx = pool.begin().await?;

    repositories::students::find_by_id(&mut *tx, student_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Student", student_id))?;

    let test = repositories::test_catalog::find_by_id(&mut *tx, test_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Test", test_id))?;

    if !test.is_active {
        return Err(ServiceError::validation(format!("Test {test_id} is not active")));
    }

    repositories::sessions::acquire_pair_lock(&mut *tx, student_id, test_id).await?;

    let expired = repositories::sessions::expire_live_for_pair(&mut *tx, student_id, test_id).await?;
    if expired > 0 {
        tracing::info!(student_id, test_id, expired, "Superseded live sessions marked expired");
    }

    let otp = generate_otp();
    let session = repositories::sessions::create(
        &mut *tx,
        repositories::sessions::CreateSession {
            student_id,
            test_id,
            otp: &otp,
            created_at: now,
            expires_at: now + policy.otp_validity,
        },
    )
    .await?;

    tx.commit().await?;

    metrics::record_session_created();
    tracing::info!(
        session_id = session.id,
        student_id,
        test_id,
        expires_at = %session.expires_at,
        "Test session issued"
    );

    Ok(session)
}

pub(crate) async fn get_session(pool: &PgPool, session_id: i64) -> ServiceResult<TestSession> {
    repositories::sessions::find_by_id(pool, session_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Session", session_id))
}

pub(crate) async fn verify_otp(
    pool: &PgPool,
    policy: &SessionPolicy,
    session_id: i64,
    submitted: &str,
) -> ServiceResult<(OtpVerdict, TestSession)> {
    verify_otp_at(pool, policy, session_id, submitted, primitive_now_utc()).await
}

pub(crate) async fn verify_otp_at(
    pool: &PgPool,
    policy: &SessionPolicy,
    session_id: i64,
    submitted: &str,
    now: PrimitiveDateTime,
) -> ServiceResult<(OtpVerdict, TestSession)> {
    let mut tx = pool.begin().await?;

    let mut session = repositories::sessions::find_by_id_for_update(&mut *tx, session_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Session", session_id))?;

    let transition = apply_verification(&mut session, submitted, now, policy);
    if transition.dirty {
        repositories::sessions::save_verification_state(&mut *tx, &session).await?;
    }

    tx.commit().await?;

    metrics::record_otp_verification(transition.verdict.label());
    match transition.verdict {
        OtpVerdict::Accepted => {
            tracing::info!(session_id, "OTP accepted, session started");
        }
        OtpVerdict::Mismatch { attempts_remaining } => {
            tracing::warn!(
                session_id,
                attempts = session.otp_attempts,
                attempts_remaining,
                "OTP mismatch"
            );
        }
        OtpVerdict::Blocked { blocked_until } => {
            tracing::warn!(session_id, blocked_until = %blocked_until, "Session locked out");
        }
        OtpVerdict::Expired => {
            tracing::warn!(session_id, "OTP submitted for expired session");
        }
        OtpVerdict::Closed => {
            tracing::warn!(session_id, "OTP submitted for completed session");
        }
    }

    Ok((transition.verdict, session))
}

pub(crate) async fn require_usable_session(
    pool: &PgPool,
    session_id: i64,
    now: PrimitiveDateTime,
) -> ServiceResult<TestSession> {
    let session = get_session(pool, session_id).await?;

    match usability_error(&session, now) {
        Some(error) => {
            tracing::debug!(session_id, status = session.status.as_str(), "Session not usable");
            Err(error)
        }
        None => Ok(session),
    }
}
