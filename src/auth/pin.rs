use actix_web::middleware::Next;
use actix_web::{
    Error,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web::Data,
};
use tracing::warn;

use crate::error::message_response;

pub const PIN_HEADER: &str = "X-Admin-Pin";

/// Shared-secret check in front of the admin views.
#[derive(Clone)]
pub struct PinGate {
    pin: String,
}

impl PinGate {
    pub fn new(pin: impl Into<String>) -> Self {
        Self { pin: pin.into() }
    }

    pub fn admits(&self, candidate: &str) -> bool {
        candidate.trim() == self.pin
    }
}

pub async fn pin_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let gate = req
        .app_data::<Data<PinGate>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("PIN gate missing"))?;

    let candidate = match req.headers().get(PIN_HEADER) {
        Some(h) => h.to_str().unwrap_or_default(),
        None => {
            let resp = message_response(StatusCode::UNAUTHORIZED, "Missing admin PIN");
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    if !gate.admits(candidate) {
        warn!(path = %req.path(), "Rejected admin PIN");
        let resp = message_response(StatusCode::UNAUTHORIZED, "Incorrect PIN");
        return Ok(req.into_response(resp.map_into_boxed_body()));
    }

    next.call(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_only_the_pin() {
        let gate = PinGate::new("4321");
        assert!(gate.admits("4321"));
        assert!(gate.admits(" 4321\n"));
        assert!(!gate.admits("1234"));
        assert!(!gate.admits(""));
    }
}
