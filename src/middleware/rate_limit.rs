use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, ResponseError};
use futures::future::{ready, Ready};

use crate::config::RateLimitConfig;
use crate::error::AppError;

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests from this IP, please try again later.";

const LIMITED_PREFIX: &str = "/api";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
struct Windows {
    by_client: HashMap<String, Window>,
    last_pruned: Instant,
}

/// Fixed-window request counter per client address, shared by all workers
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        RateLimiter {
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_seconds),
            windows: Mutex::new(Windows {
                by_client: HashMap::new(),
                last_pruned: Instant::now(),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_requests > 0 && !self.window.is_zero()
    }

    /// Counts one request for `client`. `Err` carries the time left in the window.
    pub fn check(&self, client: &str, now: Instant) -> Result<(), Duration> {
        if !self.is_enabled() {
            return Ok(());
        }

        // counts stay valid if another worker panicked while holding the lock
        let mut windows = self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if now.saturating_duration_since(windows.last_pruned) >= self.window {
            let window = self.window;
            windows
                .by_client
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
            windows.last_pruned = now;
        }

        let entry = windows
            .by_client
            .entry(client.to_string())
            .or_insert(Window { started: now, count: 0 });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window { started: now, count: 0 };
        }

        if entry.count >= self.max_requests {
            return Err(self.window.saturating_sub(now.saturating_duration_since(entry.started)));
        }
        entry.count += 1;
        Ok(())
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .map(|w| w.by_client.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().by_client.len())
    }
}

/// Applies a [`RateLimiter`] to every request under `/api`
pub struct RateLimit {
    limiter: Arc<RateLimiter>,
}

impl RateLimit {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        RateLimit { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    limiter: Arc<RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let limiter = self.limiter.clone();

        Box::pin(async move {
            if req.path().starts_with(LIMITED_PREFIX) {
                let client = req
                    .connection_info()
                    .realip_remote_addr()
                    .unwrap_or("unknown")
                    .to_string();

                if let Err(retry_after) = limiter.check(&client, Instant::now()) {
                    tracing::warn!(client = %client, path = %req.path(), "rate limit exceeded");
                    let mut response = AppError::TooManyRequests(RATE_LIMITED_MESSAGE.to_string()).error_response();
                    response
                        .headers_mut()
                        .insert(header::RETRY_AFTER, header::HeaderValue::from(retry_after.as_secs().max(1)));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            }

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}
