//! Sign-up throttling and access logging.

use crate::error::{AppError, ErrorCode};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc, time::Instant};
use tracing::{info, warn};

/// Message sent back once the sign-up budget is spent.
pub const THROTTLED_MESSAGE: &str = "Too many sign-up attempts, please try again later";

/// Budget used when the configured one is zero.
const FALLBACK_SIGNUPS_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(60) {
    Some(n) => n,
    None => unreachable!(),
};

type SignupLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Process-wide budget of sign-up attempts. Health checks do not draw on it.
#[derive(Clone)]
pub struct SignupThrottle {
    limiter: Arc<SignupLimiter>,
    per_minute: NonZeroU32,
}

impl SignupThrottle {
    pub fn per_minute(signups: u32) -> Self {
        let per_minute = NonZeroU32::new(signups).unwrap_or(FALLBACK_SIGNUPS_PER_MINUTE);
        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            per_minute,
        }
    }

    /// A budget no test run will exhaust.
    pub fn relaxed() -> Self {
        Self::per_minute(10_000)
    }

    /// Take one attempt from the budget.
    pub fn admit(&self) -> Result<(), AppError> {
        self.limiter
            .check()
            .map_err(|_| AppError::throttled(THROTTLED_MESSAGE))
    }
}

/// Refuse sign-up attempts beyond the budget with a 429 `AppError`.
pub async fn throttle_signups(
    State(throttle): State<SignupThrottle>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(e) = throttle.admit() {
        warn!(per_minute = throttle.per_minute.get(), "Sign-up budget spent");
        return Err(e);
    }
    Ok(next.run(request).await)
}

/// One log line per request. Refused requests carry their [`ErrorCode`].
pub async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match response.extensions().get::<ErrorCode>() {
        Some(code) => warn!(%method, %path, status, %code, elapsed_ms, "Request refused"),
        None => info!(%method, %path, status, elapsed_ms, "Request served"),
    }

    response
}
