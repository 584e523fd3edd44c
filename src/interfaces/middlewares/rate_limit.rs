use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    web, Error, ResponseError,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{errors::AppError, utils::get_client_ip::get_client_ip, AppState};

/// Per-client request budget for the public API. Reads the shared limiter
/// from `AppState`; requests pass through untouched when it is disabled.
pub struct RateLimit;

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimitService {
            service: Rc::new(service),
        })
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let decision = req
                .app_data::<web::Data<AppState>>()
                .and_then(|state| {
                    let limiter = state.rate_limiter.as_ref()?;
                    let client = get_client_ip(req.request(), state.trust_x_forwarded_for);
                    Some((client.clone(), limiter.check(&client)))
                });

            let Some((client, decision)) = decision else {
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            };

            if !decision.allowed {
                let retry_after = decision.retry_after.unwrap_or(1);
                tracing::warn!(client = %client, path = %req.path(), retry_after, "Rate limit exceeded");

                let mut response = AppError::TooManyRequests { retry_after }.error_response();
                set_limit_headers(response.headers_mut(), decision.limit, 0);
                return Ok(req.into_response(response).map_into_right_body());
            }

            let mut res = service.call(req).await?;
            set_limit_headers(res.headers_mut(), decision.limit, decision.remaining);
            Ok(res.map_into_left_body())
        })
    }
}

fn set_limit_headers(headers: &mut actix_web::http::header::HeaderMap, limit: u64, remaining: u64) {
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from(limit),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(remaining),
    );
}
