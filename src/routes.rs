use crate::{
    api::{admin, attendance, employee},
    auth::pin::pin_middleware,
    config::Config,
    error::message_error,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{http::StatusCode, middleware::from_fn, web};
use anyhow::anyhow;
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct RateLimits {
    employee: Limiter,
    admin: Limiter,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            employee: Arc::new(build_limiter(config.rate_employee_per_min)?),
            admin: Arc::new(build_limiter(config.rate_admin_per_min)?),
        })
    }
}

fn build_limiter(
    requests_per_min: u32,
) -> anyhow::Result<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} per minute"))?;
    Ok(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limits: &RateLimits) {
    // malformed bodies and queries answer with the usual {"message"} body
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| message_error(StatusCode::BAD_REQUEST, err)),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| message_error(StatusCode::BAD_REQUEST, err)),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            // /admin, behind the PIN
            .service(
                web::scope("/admin")
                    .wrap(from_fn(pin_middleware))
                    .wrap(limits.admin.clone())
                    // /admin/attendance
                    .service(
                        web::resource("/attendance")
                            .route(web::get().to(admin::dashboard))
                            .route(web::put().to(admin::upsert_record))
                            .route(web::delete().to(admin::delete_record)),
                    )
                    // /admin/attendance/export
                    .service(
                        web::resource("/attendance/export").route(web::get().to(admin::export)),
                    )
                    // /admin/employees
                    .service(
                        web::resource("/employees")
                            .route(web::get().to(employee::list_all))
                            .route(web::post().to(employee::add_employee)),
                    )
                    // /admin/employees/{employee_id}
                    .service(
                        web::resource("/employees/{employee_id}")
                            .route(web::delete().to(employee::remove_employee)),
                    ),
            )
            .service(
                web::scope("")
                    .wrap(limits.employee.clone())
                    // /employees
                    .service(web::resource("/employees").route(web::get().to(employee::list_active)))
                    .service(
                        web::scope("/attendance/{employee_id}")
                            .service(web::resource("/today").route(web::get().to(attendance::today)))
                            .service(web::resource("/state").route(web::get().to(attendance::state)))
                            .service(
                                web::resource("/clock-in").route(web::post().to(attendance::clock_in)),
                            )
                            .service(
                                web::resource("/clock-out")
                                    .route(web::post().to(attendance::clock_out)),
                            )
                            .service(
                                web::resource("/clock-out/log")
                                    .route(web::post().to(attendance::submit_log)),
                            )
                            .service(
                                web::resource("/manual-entry")
                                    .route(web::post().to(attendance::manual_entry)),
                            ),
                    ),
            ),
    );
}
