//! Caller identity extractor.
//!
//! The gateway in front of this service authenticates the caller and
//! asserts their identity in the `X-User-Id` header. This service trusts
//! that header as-is and never verifies it; the extractor only requires it
//! to be present and non-empty.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use std::future::{Ready, ready};

use posts_shared::ErrorResponse;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Trusted caller identity, taken verbatim from the gateway header.
///
/// Use this in handlers that need a caller:
/// ```ignore
/// async fn create(identity: Identity, ...) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
}

/// Error type for identity extraction failures.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Missing X-User-Id header")]
    Missing,

    #[error("Invalid X-User-Id header")]
    Invalid,
}

impl actix_web::ResponseError for IdentityError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = ErrorResponse::unauthorized().with_detail(self.to_string());
        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

impl FromRequest for Identity {
    type Error = IdentityError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = match req.headers().get(USER_ID_HEADER) {
            Some(value) => value,
            None => return ready(Err(IdentityError::Missing)),
        };

        // The identity is compared byte-for-byte against post owners, so it
        // is passed through without trimming or case folding.
        match header.to_str() {
            Ok(user_id) if !user_id.is_empty() => ready(Ok(Identity {
                user_id: user_id.to_string(),
            })),
            Ok(_) => ready(Err(IdentityError::Missing)),
            Err(_) => ready(Err(IdentityError::Invalid)),
        }
    }
}
