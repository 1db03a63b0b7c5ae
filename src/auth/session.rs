use actix_web::{FromRequest, HttpRequest, dev::Payload, http::StatusCode};
use futures::future::{Ready, ready};

use crate::error::message_error;

pub const SESSION_HEADER: &str = "X-Session-Id";

/// Opaque id of the browser session driving a clock-out flow.
///
/// The client picks it (any non-blank string up to 128 bytes) and sends it on
/// every attendance request; pending clock-out states are scoped to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl FromRequest for SessionId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let id = match req
            .headers()
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
        {
            Some(id) if !id.is_empty() && id.len() <= 128 => id,
            _ => {
                return ready(Err(message_error(
                    StatusCode::BAD_REQUEST,
                    "Missing or invalid X-Session-Id header",
                )));
            }
        };

        ready(Ok(SessionId(id.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn reads_the_header() {
        let req = TestRequest::default()
            .insert_header((SESSION_HEADER, " tab-1 "))
            .to_http_request();
        let id = SessionId::extract(&req).await.unwrap();
        assert_eq!(id, SessionId("tab-1".into()));
    }

    #[actix_web::test]
    async fn blank_header_is_rejected() {
        let req = TestRequest::default()
            .insert_header((SESSION_HEADER, "  "))
            .to_http_request();
        assert!(SessionId::extract(&req).await.is_err());
        assert!(SessionId::extract(&TestRequest::default().to_http_request()).await.is_err());
    }
}
