use actix_web::{dev::Payload, http::header, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::error::AppError;
use crate::models::dto::SubmitterInfo;

/// Peer address (or the forwarded one) and user agent of the submitter
impl FromRequest for SubmitterInfo {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let ip_address = req.connection_info().realip_remote_addr().map(str::to_string);
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        ready(Ok(SubmitterInfo { ip_address, user_agent }))
    }
}
